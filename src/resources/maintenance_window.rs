// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maintenance windows: periods during which alerts are suppressed.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::ResourceKind;
use crate::codec::{optional_set, optional_string, required_string, ResourceCodec, Snapshot};
use crate::error::FieldError;
use crate::schema::validation::{string_in_slice, string_is_numerical};

/// Allowed `repeat_interval` values.
pub const REPEAT_INTERVALS: &[&str] = &["never", "1d", "1w", "2w", "1m"];

/// Wire shape of a maintenance window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindowPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<String>,
    /// Uptime check identities covered by the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Codec for `maintenance_window`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceWindow;

fn timestamp(field: &str, value: &str) -> Result<DateTime<FixedOffset>, FieldError> {
    DateTime::parse_from_rfc3339(value).map_err(|e| {
        FieldError::new(
            field,
            format!("expected {field} to be an RFC 3339 timestamp, got {value}: {e}"),
        )
    })
}

impl ResourceCodec for MaintenanceWindow {
    type Payload = MaintenanceWindowPayload;

    const KIND: ResourceKind = ResourceKind::MaintenanceWindow;
    const PATH: &'static str = "/maintenance-windows";
    const FIELDS: &'static [&'static str] = &[
        "name",
        "start_at",
        "end_at",
        "timezone",
        "repeat_interval",
        "tests",
        "tags",
    ];
    const IMMUTABLE: &'static [&'static str] = &[];

    fn expand(snapshot: &Snapshot) -> Result<Self::Payload, FieldError> {
        let name = required_string(snapshot, "name")?;

        let start_at = required_string(snapshot, "start_at")?;
        let end_at = required_string(snapshot, "end_at")?;
        if timestamp("end_at", &end_at)? <= timestamp("start_at", &start_at)? {
            return Err(FieldError::new(
                "end_at",
                format!("expected end_at to be after start_at ({start_at}), got {end_at}"),
            ));
        }

        let repeat_interval = optional_string(snapshot, "repeat_interval")?;
        if let Some(interval) = &repeat_interval {
            string_in_slice("repeat_interval", interval, REPEAT_INTERVALS)?;
        }

        let tests = optional_set(snapshot, "tests")?;
        for test in tests.iter().flatten() {
            string_is_numerical("tests", test)?;
        }

        Ok(MaintenanceWindowPayload {
            name: Some(name),
            start_at: Some(start_at),
            end_at: Some(end_at),
            timezone: Some(required_string(snapshot, "timezone")?),
            repeat_interval,
            tests,
            tags: optional_set(snapshot, "tags")?,
        })
    }

    fn flatten(payload: Self::Payload) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_opt("name", payload.name);
        snapshot.insert_opt("start_at", payload.start_at);
        snapshot.insert_opt("end_at", payload.end_at);
        snapshot.insert_opt("timezone", payload.timezone);
        snapshot.insert_opt("repeat_interval", payload.repeat_interval);
        snapshot.insert_set("tests", payload.tests);
        snapshot.insert_set("tags", payload.tags);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, Value};
    use crate::error::StatusCakeError;

    fn weekly() -> Snapshot {
        Snapshot::new()
            .with("name", "patch tuesday")
            .with("start_at", "2026-11-03T22:00:00Z")
            .with("end_at", "2026-11-04T01:00:00+01:00")
            .with("timezone", "Europe/London")
            .with("repeat_interval", "1w")
            .with("tests", Value::set(["101", "102"]))
            .with("tags", Value::set(["patching"]))
    }

    fn invalid_field(snapshot: &Snapshot) -> String {
        match codec::expand::<MaintenanceWindow>(snapshot) {
            Err(StatusCakeError::Validation { source, .. }) => source.field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip() {
        let snapshot = weekly();
        let payload = codec::expand::<MaintenanceWindow>(&snapshot).unwrap();
        assert_eq!(MaintenanceWindow::flatten(payload), snapshot);
    }

    #[test]
    fn test_end_must_follow_start() {
        let snapshot = weekly().with("end_at", "2026-11-03T22:30:00+01:00");
        assert_eq!(invalid_field(&snapshot), "end_at");
    }

    #[test]
    fn test_timestamps_must_be_rfc3339() {
        let snapshot = weekly().with("start_at", "3 Nov 2026 22:00");
        assert_eq!(invalid_field(&snapshot), "start_at");
    }

    #[test]
    fn test_repeat_interval_allowed_values() {
        let snapshot = weekly().with("repeat_interval", "daily");
        assert_eq!(invalid_field(&snapshot), "repeat_interval");
    }

    #[test]
    fn test_tests_are_numeric_ids() {
        let snapshot = weekly().with("tests", Value::set(["homepage"]));
        assert_eq!(invalid_field(&snapshot), "tests");
    }
}
