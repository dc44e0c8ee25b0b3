// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::resources::ResourceKind;

/// A single configuration field that failed validation.
///
/// `field` is a dotted path into the snapshot, e.g. `alert_config.alert_at`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for `{field}`: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path with the enclosing block name.
    #[must_use]
    pub fn nested(mut self, parent: &str) -> Self {
        self.field = format!("{parent}.{}", self.field);
        self
    }
}

/// Resource kind and identity an API error relates to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub kind: Option<ResourceKind>,
    pub id: Option<String>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.id) {
            (Some(kind), Some(id)) => write!(f, "{kind} {id}: "),
            (Some(kind), None) => write!(f, "{kind}: "),
            (None, Some(id)) => write!(f, "{id}: "),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum StatusCakeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind}: {source}")]
    Validation {
        kind: ResourceKind,
        #[source]
        source: FieldError,
    },

    #[error("{context}resource not found")]
    NotFound { context: ErrorContext },

    #[error("{context}API request failed after {attempts} attempt(s) in {elapsed:?}: {message}")]
    Transient {
        context: ErrorContext,
        status: Option<u16>,
        message: String,
        attempts: u32,
        elapsed: Duration,
        retry_after: Option<Duration>,
    },

    #[error("{context}API request rejected with HTTP {status}: {body}")]
    Permanent {
        context: ErrorContext,
        status: u16,
        body: String,
    },

    #[error("{context}outcome of the request is unknown, read the resource before retrying: {message}")]
    UnknownState {
        context: ErrorContext,
        message: String,
    },

    #[error("{context}fields require replacement: {}", .fields.join(", "))]
    ReplacementRequired {
        context: ErrorContext,
        fields: Vec<String>,
    },

    #[error("{context}deadline exceeded after {attempts} attempt(s) in {elapsed:?}")]
    Timeout {
        context: ErrorContext,
        /// Attempts that reached the API before the deadline; zero when the
        /// rate limiter could not admit the first one in time.
        attempts: u32,
        elapsed: Duration,
    },

    #[error("{context}malformed API payload: {message}")]
    Decode {
        context: ErrorContext,
        message: String,
    },
}

impl StatusCakeError {
    /// Returns `true` for failures the client may retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StatusCakeError::Transient { .. })
    }

    /// Returns `true` if the remote resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StatusCakeError::NotFound { .. })
    }

    /// HTTP status attached to the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            StatusCakeError::Transient { status, .. } => *status,
            StatusCakeError::Permanent { status, .. } => Some(*status),
            StatusCakeError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Server-requested delay before the next attempt.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            StatusCakeError::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Record how many attempts a retried failure took.
    #[must_use]
    pub(crate) fn with_attempts(mut self, total: u32, spent: Duration) -> Self {
        if let StatusCakeError::Transient {
            attempts, elapsed, ..
        } = &mut self
        {
            *attempts = total;
            *elapsed = spent;
        }
        self
    }

    /// Attach the resource kind and identity to an API-level error.
    ///
    /// Errors that already carry a kind keep it.
    #[must_use]
    pub fn in_resource(mut self, kind: ResourceKind, id: Option<&str>) -> Self {
        if let Some(context) = self.context_mut() {
            if context.kind.is_none() {
                context.kind = Some(kind);
            }
            if context.id.is_none() {
                context.id = id.map(str::to_string);
            }
        }
        self
    }

    /// Identity of the remote resource the error relates to, when known.
    ///
    /// An `UnknownState` from `create` carries the identity of a resource that
    /// exists remotely but could not be read back.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.context().and_then(|context| context.id.as_deref())
    }

    /// Kind and identity attached to an API-level error.
    #[must_use]
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            StatusCakeError::NotFound { context }
            | StatusCakeError::Transient { context, .. }
            | StatusCakeError::Permanent { context, .. }
            | StatusCakeError::UnknownState { context, .. }
            | StatusCakeError::ReplacementRequired { context, .. }
            | StatusCakeError::Timeout { context, .. }
            | StatusCakeError::Decode { context, .. } => Some(context),
            StatusCakeError::Config(_) | StatusCakeError::Validation { .. } => None,
        }
    }

    fn context_mut(&mut self) -> Option<&mut ErrorContext> {
        match self {
            StatusCakeError::NotFound { context }
            | StatusCakeError::Transient { context, .. }
            | StatusCakeError::Permanent { context, .. }
            | StatusCakeError::UnknownState { context, .. }
            | StatusCakeError::ReplacementRequired { context, .. }
            | StatusCakeError::Timeout { context, .. }
            | StatusCakeError::Decode { context, .. } => Some(context),
            StatusCakeError::Config(_) | StatusCakeError::Validation { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatusCakeError>;
