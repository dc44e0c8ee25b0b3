// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field codec: conversion between configuration snapshots and API payloads.
//!
//! *Expand* turns a [`Snapshot`] into the typed wire payload of a resource
//! kind, validating every field before anything is sent. *Flatten* turns a
//! payload returned by the API back into a snapshot, omitting absent fields
//! and re-nesting wire fields that configuration models as blocks.

mod fields;
mod value;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use fields::{
    check_known, optional_block, optional_bool, optional_int, optional_int_set, optional_set,
    optional_string, render_set, required_block, required_int, required_string, to_i32, within,
};
pub use value::{Scalar, Snapshot, Value};

use crate::error::{FieldError, StatusCakeError};
use crate::resources::ResourceKind;

/// Expand/flatten contract for one resource kind.
pub trait ResourceCodec: Send + Sync + 'static {
    /// Typed wire payload. Absent optional fields are `None` and never sent.
    type Payload: Serialize + DeserializeOwned + Send + Sync;

    const KIND: ResourceKind;

    /// Collection path relative to the API base URL, e.g. `/ssl`.
    const PATH: &'static str;

    /// Top-level fields an operator may declare.
    const FIELDS: &'static [&'static str];

    /// Fields whose change requires destroying and recreating the resource.
    const IMMUTABLE: &'static [&'static str];

    /// Validate a snapshot and build the wire payload.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] naming the first invalid field
    fn expand(snapshot: &Snapshot) -> Result<Self::Payload, FieldError>;

    /// Build a snapshot from an API payload.
    fn flatten(payload: Self::Payload) -> Snapshot;

    /// Remove fields that must not be sent on update.
    fn strip_immutable(_payload: &mut Self::Payload) {}

    /// Immutable fields that differ between the prior and desired snapshots.
    fn replacement_fields(prior: &Snapshot, desired: &Snapshot) -> Vec<String> {
        changed_fields(prior, desired, Self::IMMUTABLE)
    }
}

/// Fields among `fields` whose normalized values differ.
#[must_use]
pub fn changed_fields(prior: &Snapshot, desired: &Snapshot, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| {
            prior.project(&[**field]).normalized() != desired.project(&[**field]).normalized()
        })
        .map(|field| (*field).to_string())
        .collect()
}

/// Expand a snapshot, tagging validation failures with the resource kind.
///
/// # Errors
///
/// Returns `StatusCakeError::Validation` for unknown or invalid fields
pub fn expand<C: ResourceCodec>(snapshot: &Snapshot) -> Result<C::Payload, StatusCakeError> {
    check_known(snapshot, C::FIELDS)
        .and_then(|()| C::expand(snapshot))
        .map_err(|source| StatusCakeError::Validation {
            kind: C::KIND,
            source,
        })
}
