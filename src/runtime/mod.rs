// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime utilities for resilience and observability.
//!
//! This module provides the token-bucket rate limiter, retry policies and
//! request logging that every StatusCake API call goes through.

mod logging;
mod rate_limit;
mod retry;

pub use logging::{LogLevel, LoggingConfig, RequestLogger, RequestMetrics, RequestSpan};
pub use rate_limit::RateLimiter;
pub use retry::{
    BackoffStrategy, DefaultRetryPolicy, ExponentialBackoff, RetryConfig, RetryConfigBuilder,
    RetryPolicy,
};
