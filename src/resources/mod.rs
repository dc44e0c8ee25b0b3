// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconcilers for every managed StatusCake resource kind.
//!
//! Each kind supplies a [`ResourceCodec`](crate::codec::ResourceCodec); the
//! shared [`ResourceReconciler`] drives create, read, update, delete and
//! import for it through one [`StatusCakeClient`].
//!
//! # Example
//!
//! ```no_run
//! use statuscake_sync::codec::{Snapshot, Value};
//! use statuscake_sync::config::ProviderConfig;
//! use statuscake_sync::resources::{ContactGroups, Reconciler};
//! use statuscake_sync::StatusCakeClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = StatusCakeClient::new(ProviderConfig::load_with_env()?)?;
//! let groups = ContactGroups::new(client);
//!
//! let created = groups
//!     .create(
//!         &Snapshot::new()
//!             .with("name", "Ops")
//!             .with("email_addresses", Value::set(["ops@example.com"])),
//!     )
//!     .await?;
//! groups.delete(&created.id).await?;
//! # Ok(())
//! # }
//! ```

mod contact_group;
mod maintenance_window;
mod monitoring_locations;
mod pagespeed_check;
mod reconciler;
mod ssl_check;
mod uptime_check;

use std::fmt;
use std::str::FromStr;

use crate::client::StatusCakeClient;
use crate::error::StatusCakeError;

pub use contact_group::{ContactGroup, ContactGroupPayload};
pub use maintenance_window::{MaintenanceWindow, MaintenanceWindowPayload, REPEAT_INTERVALS};
pub use monitoring_locations::{LocationListing, MonitoringLocations};
pub use pagespeed_check::{PagespeedCheck, PagespeedCheckPayload, LOCATION_ISO};
pub use reconciler::{Reconciler, ResourceReconciler, ResourceState};
pub use ssl_check::{SslCheck, SslCheckPayload};
pub use uptime_check::{CheckType, UptimeCheck, UptimeCheckPayload, CHECK_RATES};

pub type ContactGroups = ResourceReconciler<ContactGroup>;
pub type UptimeChecks = ResourceReconciler<UptimeCheck>;
pub type SslChecks = ResourceReconciler<SslCheck>;
pub type PagespeedChecks = ResourceReconciler<PagespeedCheck>;
pub type MaintenanceWindows = ResourceReconciler<MaintenanceWindow>;

/// Every kind of object this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ContactGroup,
    UptimeCheck,
    SslCheck,
    PagespeedCheck,
    MaintenanceWindow,
    UptimeLocations,
    PagespeedLocations,
}

impl ResourceKind {
    /// Kinds with a full create/read/update/delete lifecycle.
    pub const MANAGED: [ResourceKind; 5] = [
        ResourceKind::ContactGroup,
        ResourceKind::UptimeCheck,
        ResourceKind::SslCheck,
        ResourceKind::PagespeedCheck,
        ResourceKind::MaintenanceWindow,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::ContactGroup => "contact_group",
            ResourceKind::UptimeCheck => "uptime_check",
            ResourceKind::SslCheck => "ssl_check",
            ResourceKind::PagespeedCheck => "pagespeed_check",
            ResourceKind::MaintenanceWindow => "maintenance_window",
            ResourceKind::UptimeLocations => "uptime_locations",
            ResourceKind::PagespeedLocations => "pagespeed_locations",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = StatusCakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            ResourceKind::ContactGroup,
            ResourceKind::UptimeCheck,
            ResourceKind::SslCheck,
            ResourceKind::PagespeedCheck,
            ResourceKind::MaintenanceWindow,
            ResourceKind::UptimeLocations,
            ResourceKind::PagespeedLocations,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == s)
        .ok_or_else(|| StatusCakeError::Config(format!("unknown resource kind: {s}")))
    }
}

/// Build the reconciler for a managed kind.
///
/// Returns `None` for the read-only location listings; use
/// [`MonitoringLocations`] for those.
#[must_use]
pub fn reconciler_for(kind: ResourceKind, client: StatusCakeClient) -> Option<Box<dyn Reconciler>> {
    let reconciler: Box<dyn Reconciler> = match kind {
        ResourceKind::ContactGroup => Box::new(ContactGroups::new(client)),
        ResourceKind::UptimeCheck => Box::new(UptimeChecks::new(client)),
        ResourceKind::SslCheck => Box::new(SslChecks::new(client)),
        ResourceKind::PagespeedCheck => Box::new(PagespeedChecks::new(client)),
        ResourceKind::MaintenanceWindow => Box::new(MaintenanceWindows::new(client)),
        ResourceKind::UptimeLocations | ResourceKind::PagespeedLocations => return None,
    };
    Some(reconciler)
}
