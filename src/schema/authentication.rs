// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic authentication block used by HTTP and TCP uptime checks.
//!
//! On the wire the credentials are the flat `basic_username` and
//! `basic_password` fields. The password is write-only: the API never returns
//! it, so a flattened block carries the username alone.

use crate::codec::{check_known, required_string, Snapshot};
use crate::error::FieldError;

pub const FIELDS: &[&str] = &["username", "password"];

/// Credentials sent with a check request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl BasicAuth {
    /// Expand an `authentication` block.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] if either credential is missing
    pub fn expand(block: &Snapshot) -> Result<Self, FieldError> {
        check_known(block, FIELDS)?;
        Ok(Self {
            username: required_string(block, "username")?,
            password: required_string(block, "password")?,
        })
    }
}

/// Flatten the echoed username into an `authentication` block.
#[must_use]
pub fn flatten(username: Option<String>) -> Snapshot {
    let mut block = Snapshot::new();
    block.insert_opt("username", username.filter(|u| !u.is_empty()));
    block
}
