// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page-speed checks.

use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::codec::{
    check_known, optional_block, optional_bool, optional_int, optional_set, required_int,
    required_string, within, ResourceCodec, Snapshot, Value,
};
use crate::error::FieldError;
use crate::schema::validation::{
    int_at_least, int_in_slice, is_url_with_http_or_https, string_in_slice, string_is_numerical,
};
use crate::schema::MonitoringLocation;

/// Allowed `check_interval` values, in seconds.
pub const CHECK_INTERVALS: &[i64] = &[60, 300, 900, 1800, 3600, 86400];

/// Allowed `location_iso` values.
pub const LOCATION_ISO: &[&str] = &["AU", "CA", "DE", "IN", "NL", "SG", "UK", "US", "PRIVATE"];

const ALERT_FIELDS: &[&str] = &["alert_bigger", "alert_slower", "alert_smaller"];

/// Wire shape of a page-speed check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagespeedCheckPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    /// Page size in kb above which to alert. 0 disables the alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_bigger: Option<i64>,
    /// Load time in ms above which to alert. 0 disables the alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_slower: Option<i64>,
    /// Page size in kb below which to alert. 0 disables the alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_smaller: Option<i64>,
    /// Location assigned by the API. Read-only.
    #[serde(default, skip_serializing)]
    pub location: Option<MonitoringLocation>,
}

/// Codec for `pagespeed_check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PagespeedCheck;

impl ResourceCodec for PagespeedCheck {
    type Payload = PagespeedCheckPayload;

    const KIND: ResourceKind = ResourceKind::PagespeedCheck;
    const PATH: &'static str = "/pagespeed";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "website_url",
        "check_interval",
        "location_iso",
        "contact_groups",
        "paused",
        "alert_config",
    ];
    const IMMUTABLE: &'static [&'static str] = &["website_url"];

    fn expand(snapshot: &Snapshot) -> Result<Self::Payload, FieldError> {
        let website_url = required_string(snapshot, "website_url")?;
        is_url_with_http_or_https("website_url", &website_url)?;

        let check_interval = required_int(snapshot, "check_interval")?;
        int_in_slice("check_interval", check_interval, CHECK_INTERVALS)?;

        let location_iso = required_string(snapshot, "location_iso")?;
        string_in_slice("location_iso", &location_iso, LOCATION_ISO)?;

        let contact_groups = optional_set(snapshot, "contact_groups")?;
        for group in contact_groups.iter().flatten() {
            string_is_numerical("contact_groups", group)?;
        }

        let mut payload = PagespeedCheckPayload {
            name: Some(required_string(snapshot, "name")?),
            website_url: Some(website_url),
            check_rate: Some(check_interval),
            location_iso: Some(location_iso),
            contact_groups,
            paused: optional_bool(snapshot, "paused")?,
            ..Default::default()
        };

        if let Some(alerts) = optional_block(snapshot, "alert_config")? {
            within("alert_config", alerts, |block| {
                check_known(block, ALERT_FIELDS)?;
                let threshold = |field: &str| -> Result<Option<i64>, FieldError> {
                    let value = optional_int(block, field)?;
                    if let Some(v) = value {
                        int_at_least(field, v, 0)?;
                    }
                    Ok(value)
                };
                payload.alert_bigger = threshold("alert_bigger")?;
                payload.alert_slower = threshold("alert_slower")?;
                payload.alert_smaller = threshold("alert_smaller")?;
                Ok(())
            })?;
        }

        Ok(payload)
    }

    fn flatten(payload: Self::Payload) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_opt("name", payload.name);
        snapshot.insert_opt("website_url", payload.website_url);
        snapshot.insert_opt("check_interval", payload.check_rate);
        snapshot.insert_opt("location_iso", payload.location_iso);
        snapshot.insert_set("contact_groups", payload.contact_groups);
        snapshot.insert_opt("paused", payload.paused);

        let mut alerts = Snapshot::new();
        alerts.insert_opt("alert_bigger", payload.alert_bigger);
        alerts.insert_opt("alert_slower", payload.alert_slower);
        alerts.insert_opt("alert_smaller", payload.alert_smaller);
        snapshot.insert_block("alert_config", alerts);

        if let Some(location) = payload.location {
            snapshot.insert("location", Value::block(location.to_snapshot()));
        }

        snapshot
    }

    fn strip_immutable(payload: &mut Self::Payload) {
        payload.website_url = None;
    }
}
