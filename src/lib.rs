// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative reconciliation of StatusCake monitoring resources.
//!
//! Operators describe contact groups, uptime/SSL/page-speed checks and
//! maintenance windows as [`Snapshot`]s. Reconcilers expand them into API
//! payloads, apply them through a rate-limited retrying [`StatusCakeClient`],
//! and flatten the API's view back into snapshots.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod resources;
pub mod runtime;
pub mod schema;
pub mod testkit;

pub use client::{ApiRequest, ApiResponse, StatusCakeClient};
pub use codec::{Scalar, Snapshot, Value};
pub use config::ProviderConfig;
pub use error::{FieldError, Result, StatusCakeError};
pub use resources::{reconciler_for, Reconciler, ResourceKind, ResourceState};
