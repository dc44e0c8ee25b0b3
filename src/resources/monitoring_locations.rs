// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only listings of the servers checks run from.

use sha2::{Digest, Sha256};
use tracing::debug;

use super::ResourceKind;
use crate::client::StatusCakeClient;
use crate::codec::Snapshot;
use crate::error::Result;
use crate::schema::{location_blocks, MonitoringLocation};

/// A snapshot of one location listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationListing {
    /// Digest of the listed IPv4 addresses; stable while the listing is.
    pub id: String,
    pub locations: Vec<MonitoringLocation>,
}

impl LocationListing {
    #[must_use]
    pub fn new(locations: Vec<MonitoringLocation>) -> Self {
        let joined = locations
            .iter()
            .filter_map(|location| location.ipv4.as_deref())
            .collect::<Vec<_>>()
            .join("|");
        let id = format!("{:x}", Sha256::digest(joined.as_bytes()));
        Self { id, locations }
    }

    /// Render as `{ id, locations: [...] }`.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::new()
            .with("id", self.id.as_str())
            .with("locations", location_blocks(&self.locations))
    }
}

/// Lists uptime and page-speed monitoring locations.
#[derive(Debug, Clone)]
pub struct MonitoringLocations {
    client: StatusCakeClient,
}

impl MonitoringLocations {
    #[must_use]
    pub fn new(client: StatusCakeClient) -> Self {
        Self { client }
    }

    /// Locations uptime checks run from.
    ///
    /// # Errors
    ///
    /// Returns any client error, tagged with the listing kind
    pub async fn uptime(&self) -> Result<LocationListing> {
        self.list(ResourceKind::UptimeLocations, "/uptime-locations").await
    }

    /// Locations page-speed checks run from.
    ///
    /// # Errors
    ///
    /// Returns any client error, tagged with the listing kind
    pub async fn pagespeed(&self) -> Result<LocationListing> {
        self.list(ResourceKind::PagespeedLocations, "/pagespeed-locations")
            .await
    }

    async fn list(&self, kind: ResourceKind, path: &str) -> Result<LocationListing> {
        let locations: Vec<MonitoringLocation> = self
            .client
            .list(path)
            .await
            .map_err(|e| e.in_resource(kind, None))?;
        debug!(kind = %kind, count = locations.len(), "listed monitoring locations");
        Ok(LocationListing::new(locations))
    }
}
