// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging of StatusCake API calls.
//!
//! Every HTTP attempt is logged with method, path, status and timing. Header
//! values named in [`LoggingConfig::sensitive_headers`] are redacted.
//!
//! # Example
//!
//! ```
//! use statuscake_sync::runtime::{LoggingConfig, LogLevel, RequestLogger};
//!
//! let logger = RequestLogger::with_config(
//!     LoggingConfig::new().with_success_level(LogLevel::Debug),
//! );
//! let span = logger.start("GET", "/contact-groups/1", 0);
//! logger.finish_success(span, 200);
//! assert_eq!(logger.metrics().successful_requests(), 1);
//! ```

use http::HeaderMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::error::StatusCakeError;

const TARGET: &str = "statuscake_sync::http";

/// Log level for API call logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Trace level - most verbose.
    Trace,
    /// Debug level.
    #[default]
    Debug,
    /// Info level.
    Info,
    /// Warn level.
    Warn,
    /// Error level - only errors.
    Error,
    /// Disabled - no logging.
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            LogLevel::Trace => trace!(target: TARGET, $($arg)+),
            LogLevel::Debug => debug!(target: TARGET, $($arg)+),
            LogLevel::Info => info!(target: TARGET, $($arg)+),
            LogLevel::Warn => warn!(target: TARGET, $($arg)+),
            LogLevel::Error => error!(target: TARGET, $($arg)+),
            LogLevel::Off => {}
        }
    };
}

/// Configuration for API call logging.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for successful requests.
    pub success_level: LogLevel,
    /// Log level for failures that will be retried.
    pub retry_level: LogLevel,
    /// Log level for failed requests.
    pub error_level: LogLevel,
    /// Whether to log request headers.
    pub log_headers: bool,
    /// List of sensitive header names to redact.
    pub sensitive_headers: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            success_level: LogLevel::Debug,
            retry_level: LogLevel::Warn,
            error_level: LogLevel::Error,
            log_headers: false,
            sensitive_headers: vec!["authorization".to_string(), "x-api-key".to_string()],
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the success log level.
    #[must_use]
    pub fn with_success_level(mut self, level: LogLevel) -> Self {
        self.success_level = level;
        self
    }

    /// Set the log level for retryable failures.
    #[must_use]
    pub fn with_retry_level(mut self, level: LogLevel) -> Self {
        self.retry_level = level;
        self
    }

    /// Set the error log level.
    #[must_use]
    pub fn with_error_level(mut self, level: LogLevel) -> Self {
        self.error_level = level;
        self
    }

    /// Enable or disable header logging.
    #[must_use]
    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.log_headers = enabled;
        self
    }

    /// Add a sensitive header to redact.
    #[must_use]
    pub fn with_sensitive_header(mut self, header: impl Into<String>) -> Self {
        self.sensitive_headers.push(header.into());
        self
    }

    /// Create a quiet configuration for production.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            success_level: LogLevel::Off,
            retry_level: LogLevel::Off,
            error_level: LogLevel::Warn,
            ..Self::default()
        }
    }

    fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(name))
    }
}

/// Counters for API calls made through a client.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
}

impl RequestMetrics {
    /// Create a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful request.
    pub fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed request.
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of requests.
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get the number of successful requests.
    #[must_use]
    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
    }

    /// Get the number of failed requests.
    #[must_use]
    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }
}

/// A request logger that tracks timing and logs responses.
#[derive(Debug, Default)]
pub struct RequestLogger {
    config: LoggingConfig,
    metrics: RequestMetrics,
}

impl RequestLogger {
    /// Create a request logger with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request logger with custom configuration.
    #[must_use]
    pub fn with_config(config: LoggingConfig) -> Self {
        Self {
            config,
            metrics: RequestMetrics::new(),
        }
    }

    /// Get the metrics.
    #[must_use]
    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Start tracking a request attempt.
    #[must_use]
    pub fn start(&self, method: &str, path: &str, attempt: u32) -> RequestSpan {
        RequestSpan {
            method: method.to_string(),
            path: path.to_string(),
            attempt,
            start: Instant::now(),
        }
    }

    /// Log outgoing headers, redacting sensitive values.
    pub fn log_headers(&self, span: &RequestSpan, headers: &HeaderMap) {
        if !self.config.log_headers {
            return;
        }
        let rendered = self.render_headers(headers);
        log_at!(
            self.config.success_level,
            method = %span.method,
            path = %span.path,
            headers = %rendered,
            "StatusCake request headers"
        );
    }

    /// Finish tracking a request (success).
    pub fn finish_success(&self, span: RequestSpan, status: u16) {
        self.metrics.record_success();
        log_at!(
            self.config.success_level,
            method = %span.method,
            path = %span.path,
            status,
            attempt = span.attempt + 1,
            elapsed_ms = span.elapsed().as_millis() as u64,
            "StatusCake request completed"
        );
    }

    /// Finish tracking a request (failure).
    ///
    /// Missing resources log at the success level and retryable failures at
    /// the retry level; everything else logs at the error level.
    pub fn finish_error(&self, span: RequestSpan, status: Option<u16>, error: &StatusCakeError) {
        self.metrics.record_failure();
        log_at!(
            self.failure_level(error),
            method = %span.method,
            path = %span.path,
            status = status.unwrap_or_default(),
            attempt = span.attempt + 1,
            elapsed_ms = span.elapsed().as_millis() as u64,
            error = %error,
            "StatusCake request failed"
        );
    }

    fn failure_level(&self, error: &StatusCakeError) -> LogLevel {
        if error.is_not_found() {
            self.config.success_level
        } else if error.is_retryable() {
            self.config.retry_level
        } else {
            self.config.error_level
        }
    }

    fn render_headers(&self, headers: &HeaderMap) -> String {
        headers
            .iter()
            .map(|(name, value)| {
                if self.config.is_sensitive(name.as_str()) {
                    format!("{}=[REDACTED]", name)
                } else {
                    format!("{}={:?}", name, value)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A span representing an in-flight request attempt.
#[derive(Debug)]
pub struct RequestSpan {
    method: String,
    path: String,
    attempt: u32,
    start: Instant,
}

impl RequestSpan {
    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorContext;
    use http::HeaderValue;
    use std::time::Duration;

    fn unavailable() -> StatusCakeError {
        StatusCakeError::Transient {
            context: ErrorContext::default(),
            status: Some(503),
            message: "service unavailable".to_string(),
            attempts: 1,
            elapsed: Duration::ZERO,
            retry_after: None,
        }
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "TRACE");
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
        assert_eq!(LogLevel::Off.to_string(), "OFF");
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_success_level(LogLevel::Info)
            .with_error_level(LogLevel::Warn)
            .with_headers(true)
            .with_sensitive_header("x-custom-auth");

        assert_eq!(config.success_level, LogLevel::Info);
        assert_eq!(config.error_level, LogLevel::Warn);
        assert!(config.log_headers);
        assert!(config.is_sensitive("X-Custom-Auth"));
        assert!(config.is_sensitive("Authorization"));
    }

    #[test]
    fn test_logging_config_quiet() {
        let config = LoggingConfig::quiet();
        assert_eq!(config.success_level, LogLevel::Off);
        assert_eq!(config.retry_level, LogLevel::Off);
        assert_eq!(config.error_level, LogLevel::Warn);
    }

    #[test]
    fn test_only_terminal_failures_log_at_error() {
        let logger = RequestLogger::new();

        assert_eq!(logger.failure_level(&unavailable()), LogLevel::Warn);
        assert_eq!(
            logger.failure_level(&StatusCakeError::NotFound {
                context: ErrorContext::default(),
            }),
            LogLevel::Debug
        );
        assert_eq!(
            logger.failure_level(&StatusCakeError::Permanent {
                context: ErrorContext::default(),
                status: 400,
                body: String::new(),
            }),
            LogLevel::Error
        );
        assert_eq!(
            logger.failure_level(&StatusCakeError::UnknownState {
                context: ErrorContext::default(),
                message: "timed out".to_string(),
            }),
            LogLevel::Error
        );
    }

    #[test]
    fn test_authorization_is_redacted() {
        let logger = RequestLogger::new();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let rendered = logger.render_headers(&headers);
        assert!(rendered.contains("authorization=[REDACTED]"));
        assert!(rendered.contains("application/json"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_request_logger_counts() {
        let logger = RequestLogger::new();

        let span = logger.start("GET", "/ssl/1", 0);
        assert_eq!(span.method(), "GET");
        assert_eq!(span.path(), "/ssl/1");
        logger.finish_success(span, 200);

        let span = logger.start("GET", "/ssl/1", 1);
        logger.finish_error(span, Some(503), &unavailable());

        assert_eq!(logger.metrics().total_requests(), 2);
        assert_eq!(logger.metrics().successful_requests(), 1);
        assert_eq!(logger.metrics().failed_requests(), 1);
    }
}
