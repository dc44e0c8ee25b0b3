// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact groups: who is alerted when a check fails.

use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::codec::{optional_set, optional_string, required_string, ResourceCodec, Snapshot};
use crate::error::FieldError;
use crate::schema::validation::{is_email_address, is_url_with_http_or_https, string_is_numerical};

/// Wire shape of a contact group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactGroupPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_numbers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_url: Option<String>,
}

/// Codec for `contact_group`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactGroup;

impl ResourceCodec for ContactGroup {
    type Payload = ContactGroupPayload;

    const KIND: ResourceKind = ResourceKind::ContactGroup;
    const PATH: &'static str = "/contact-groups";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "email_addresses",
        "integrations",
        "mobile_numbers",
        "ping_url",
    ];
    const IMMUTABLE: &'static [&'static str] = &[];

    fn expand(snapshot: &Snapshot) -> Result<Self::Payload, FieldError> {
        let email_addresses = optional_set(snapshot, "email_addresses")?;
        for address in email_addresses.iter().flatten() {
            is_email_address("email_addresses", address)?;
        }

        let integrations = optional_set(snapshot, "integrations")?;
        for integration in integrations.iter().flatten() {
            string_is_numerical("integrations", integration)?;
        }

        let ping_url = optional_string(snapshot, "ping_url")?;
        if let Some(url) = &ping_url {
            is_url_with_http_or_https("ping_url", url)?;
        }

        Ok(ContactGroupPayload {
            name: Some(required_string(snapshot, "name")?),
            email_addresses,
            integrations,
            mobile_numbers: optional_set(snapshot, "mobile_numbers")?,
            ping_url,
        })
    }

    fn flatten(payload: Self::Payload) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_opt("name", payload.name);
        snapshot.insert_set("email_addresses", payload.email_addresses);
        snapshot.insert_set("integrations", payload.integrations);
        snapshot.insert_set("mobile_numbers", payload.mobile_numbers);
        snapshot.insert_opt("ping_url", payload.ping_url.filter(|url| !url.is_empty()));
        snapshot
    }
}
