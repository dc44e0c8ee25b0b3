// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monitoring location shape, shared by uptime checks, page-speed checks and
//! the location listings.

use serde::{Deserialize, Serialize};

use crate::codec::{Snapshot, Value};

/// A server StatusCake runs checks from. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringLocation {
    pub description: String,
    pub region: String,
    pub region_code: String,
    /// `up` or `down`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
}

impl MonitoringLocation {
    /// Render as a configuration block. Missing addresses are omitted.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        let mut block = Snapshot::new()
            .with("description", self.description.as_str())
            .with("region", self.region.as_str())
            .with("region_code", self.region_code.as_str())
            .with("status", self.status.as_str());
        block.insert_opt("ipv4", self.ipv4.clone());
        block.insert_opt("ipv6", self.ipv6.clone());
        block
    }
}

/// Render a list of locations as a block list.
#[must_use]
pub fn location_blocks(locations: &[MonitoringLocation]) -> Value {
    Value::Blocks(locations.iter().map(MonitoringLocation::to_snapshot).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_tolerates_missing_addresses() {
        let location: MonitoringLocation = serde_json::from_str(
            r#"{"description":"Sydney 1","region":"Australia","region_code":"sydney","status":"up","ipv6":"2400::1"}"#,
        )
        .unwrap();

        let block = location.to_snapshot();
        assert!(!block.contains("ipv4"));
        assert_eq!(block.get("ipv6"), Some(&Value::from("2400::1")));
        assert_eq!(block.get("region_code"), Some(&Value::from("sydney")));
    }

    #[test]
    fn test_location_blocks_keep_order() {
        let a = MonitoringLocation {
            description: "a".to_string(),
            ..Default::default()
        };
        let b = MonitoringLocation {
            description: "b".to_string(),
            ..Default::default()
        };

        match location_blocks(&[b, a]) {
            Value::Blocks(blocks) => {
                assert_eq!(blocks[0].get("description"), Some(&Value::from("b")));
                assert_eq!(blocks[1].get("description"), Some(&Value::from("a")));
            }
            other => panic!("expected blocks, got {other:?}"),
        }
    }
}
