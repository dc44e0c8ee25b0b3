// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared sub-schemas and field validators.
//!
//! The same location and authentication shapes appear in several resource
//! kinds; defining them once keeps validation and flattening identical
//! wherever they are used.

pub mod authentication;
mod location;
pub mod validation;

pub use authentication::BasicAuth;
pub use location::{location_blocks, MonitoringLocation};
