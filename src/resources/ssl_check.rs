// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSL certificate checks.
//!
//! `alert_config` is a configuration-only block; its settings travel as
//! top-level `alert_*` fields on the wire.

use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::codec::{
    check_known, optional_block, optional_bool, optional_int_set, optional_set, optional_string,
    required_int, required_string, within, ResourceCodec, Snapshot,
};
use crate::error::FieldError;
use crate::schema::validation::{int_in_slice, is_url_with_https, string_is_numerical};

/// Allowed `check_interval` values, in seconds.
pub const CHECK_INTERVALS: &[i64] = &[300, 600, 1800, 3600, 86400, 2073600];

const ALERT_FIELDS: &[&str] = &["alert_at", "on_reminder", "on_expiry", "on_broken", "on_mixed"];

/// Wire shape of an SSL check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslCheckPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_groups: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_redirects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Days before expiry at which to alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_at: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_reminder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_expiry: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_broken: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_mixed: Option<bool>,
}

/// Codec for `ssl_check`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SslCheck;

impl ResourceCodec for SslCheck {
    type Payload = SslCheckPayload;

    const KIND: ResourceKind = ResourceKind::SslCheck;
    const PATH: &'static str = "/ssl";
    const FIELDS: &'static [&'static str] = &[
        "website_url",
        "check_interval",
        "contact_groups",
        "follow_redirects",
        "hostname",
        "paused",
        "user_agent",
        "alert_config",
    ];
    const IMMUTABLE: &'static [&'static str] = &["website_url"];

    fn expand(snapshot: &Snapshot) -> Result<Self::Payload, FieldError> {
        let website_url = required_string(snapshot, "website_url")?;
        is_url_with_https("website_url", &website_url)?;

        let check_interval = required_int(snapshot, "check_interval")?;
        int_in_slice("check_interval", check_interval, CHECK_INTERVALS)?;

        let contact_groups = optional_set(snapshot, "contact_groups")?;
        for group in contact_groups.iter().flatten() {
            string_is_numerical("contact_groups", group)?;
        }

        let mut payload = SslCheckPayload {
            website_url: Some(website_url),
            check_rate: Some(check_interval),
            contact_groups,
            follow_redirects: optional_bool(snapshot, "follow_redirects")?,
            hostname: optional_string(snapshot, "hostname")?,
            paused: optional_bool(snapshot, "paused")?,
            user_agent: optional_string(snapshot, "user_agent")?,
            ..Default::default()
        };

        if let Some(alerts) = optional_block(snapshot, "alert_config")? {
            within("alert_config", alerts, |block| {
                check_known(block, ALERT_FIELDS)?;
                let alert_at = optional_int_set(block, "alert_at")?.unwrap_or_default();
                if alert_at.len() != 3 {
                    return Err(FieldError::new(
                        "alert_at",
                        format!("expected exactly 3 distinct day counts, got {}", alert_at.len()),
                    ));
                }
                if let Some(day) = alert_at.iter().find(|day| **day <= 0) {
                    return Err(FieldError::new(
                        "alert_at",
                        format!("expected positive day counts, got {day}"),
                    ));
                }
                payload.alert_at = Some(alert_at);
                payload.alert_reminder = optional_bool(block, "on_reminder")?;
                payload.alert_expiry = optional_bool(block, "on_expiry")?;
                payload.alert_broken = optional_bool(block, "on_broken")?;
                payload.alert_mixed = optional_bool(block, "on_mixed")?;
                Ok(())
            })?;
        }

        Ok(payload)
    }

    fn flatten(payload: Self::Payload) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_opt("website_url", payload.website_url);
        snapshot.insert_opt("check_interval", payload.check_rate);
        snapshot.insert_set("contact_groups", payload.contact_groups);
        snapshot.insert_opt("follow_redirects", payload.follow_redirects);
        snapshot.insert_opt("hostname", payload.hostname.filter(|h| !h.is_empty()));
        snapshot.insert_opt("paused", payload.paused);
        snapshot.insert_opt("user_agent", payload.user_agent.filter(|u| !u.is_empty()));

        let mut alerts = Snapshot::new();
        alerts.insert_set("alert_at", payload.alert_at);
        alerts.insert_opt("on_reminder", payload.alert_reminder);
        alerts.insert_opt("on_expiry", payload.alert_expiry);
        alerts.insert_opt("on_broken", payload.alert_broken);
        alerts.insert_opt("on_mixed", payload.alert_mixed);
        snapshot.insert_block("alert_config", alerts);

        snapshot
    }

    fn strip_immutable(payload: &mut Self::Payload) {
        payload.website_url = None;
    }
}
