// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry policies and backoff strategies for resilient API calls.
//!
//! This module provides configurable retry behavior for handling transient
//! failures (network errors, HTTP 5xx and 429) when talking to StatusCake.
//!
//! # Example
//!
//! ```
//! use statuscake_sync::runtime::{RetryConfig, ExponentialBackoff};
//! use std::time::Duration;
//!
//! let retry = RetryConfig::builder()
//!     .max_retries(3)
//!     .backoff(ExponentialBackoff::new(Duration::from_secs(1)))
//!     .build();
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use crate::error::{ErrorContext, Result, StatusCakeError};

/// Defines a backoff strategy for retry delays.
pub trait BackoffStrategy: Clone + Send + Sync + 'static {
    /// Calculate the delay before the next retry attempt.
    ///
    /// # Arguments
    /// * `attempt` - The current attempt number (0-indexed)
    fn delay(&self, attempt: u32) -> Duration;

    /// Upper bound for any delay, including server-requested ones.
    fn max_delay(&self) -> Duration {
        Duration::MAX
    }
}

// =============================================================================
// Exponential Backoff
// =============================================================================

/// Exponential backoff - delay doubles with each attempt.
///
/// Jitter adds up to 25% on top of the capped delay and never shortens it.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff strategy.
    #[must_use]
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }

    /// Set the maximum delay cap.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay for `attempt` before jitter is applied.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * 2f64.powi(attempt.min(64) as i32);
        let capped = base.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let capped = self.base_delay(attempt);
        if !self.jitter {
            return capped;
        }
        stretch(capped, 1.0 + 0.25 * rand::random::<f64>())
    }

    fn max_delay(&self) -> Duration {
        if self.jitter {
            stretch(self.max_delay, 1.25)
        } else {
            self.max_delay
        }
    }
}

fn stretch(delay: Duration, factor: f64) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Determines whether a failed call should be retried.
pub trait RetryPolicy: Clone + Send + Sync + 'static {
    /// Returns `true` if the operation should be retried for this error.
    fn should_retry(&self, error: &StatusCakeError) -> bool;
}

/// Default retry policy - retries transient API failures only.
///
/// `NotFound`, permanent 4xx rejections, decode failures and unknown-state
/// mutations are surfaced immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn should_retry(&self, error: &StatusCakeError) -> bool {
        error.is_retryable()
    }
}

// =============================================================================
// Retry Configuration
// =============================================================================

/// Complete retry configuration combining policy and backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig<P: RetryPolicy = DefaultRetryPolicy, B: BackoffStrategy = ExponentialBackoff>
{
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Policy determining which errors to retry.
    pub policy: P,
    /// Backoff strategy for calculating delays.
    pub backoff: B,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            policy: DefaultRetryPolicy,
            backoff: ExponentialBackoff::default(),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> RetryConfigBuilder<DefaultRetryPolicy, ExponentialBackoff> {
        RetryConfigBuilder::new()
    }

    /// Build the policy described by the provider settings.
    #[must_use]
    pub fn from_provider(config: &crate::config::ProviderConfig) -> Self {
        Self::builder()
            .max_retries(config.retries)
            .backoff(
                ExponentialBackoff::new(config.min_backoff).with_max_delay(config.max_backoff),
            )
            .build()
    }
}

impl<P: RetryPolicy, B: BackoffStrategy> RetryConfig<P, B> {
    /// Execute an async operation with retry logic.
    ///
    /// The operation receives the 0-indexed attempt number. The deadline is
    /// checked between attempts only; an attempt already in flight is never
    /// interrupted.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, the last transient error with
    /// attempt count and elapsed time once retries are exhausted, or
    /// `StatusCakeError::Timeout` when the next attempt could not start before
    /// the deadline.
    pub async fn execute<T, F, Fut>(&self, deadline: Option<Instant>, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let mut attempt = 0;

        loop {
            match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    let attempts = attempt + 1;

                    if !self.policy.should_retry(&e) {
                        return Err(e);
                    }

                    if attempt >= self.max_retries {
                        return Err(e.with_attempts(attempts, start.elapsed()));
                    }

                    let mut delay = self.backoff.delay(attempt);
                    if let Some(requested) = e.retry_after() {
                        delay = delay.max(requested).min(self.backoff.max_delay());
                    }

                    if let Some(deadline) = deadline {
                        let resumes = Instant::now().checked_add(delay);
                        if resumes.is_none_or(|resumes| resumes >= deadline) {
                            return Err(StatusCakeError::Timeout {
                                context: ErrorContext::default(),
                                attempts,
                                elapsed: start.elapsed(),
                            });
                        }
                    }

                    warn!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying StatusCake API call"
                    );
                    tokio::time::sleep(delay).await;

                    attempt += 1;
                }
            }
        }
    }
}

/// Builder for `RetryConfig`.
#[derive(Debug, Clone)]
pub struct RetryConfigBuilder<P: RetryPolicy, B: BackoffStrategy> {
    max_retries: u32,
    policy: P,
    backoff: B,
}

impl RetryConfigBuilder<DefaultRetryPolicy, ExponentialBackoff> {
    /// Create a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            policy: DefaultRetryPolicy,
            backoff: ExponentialBackoff::default(),
        }
    }
}

impl Default for RetryConfigBuilder<DefaultRetryPolicy, ExponentialBackoff> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: RetryPolicy, B: BackoffStrategy> RetryConfigBuilder<P, B> {
    /// Set maximum retry attempts.
    #[must_use]
    pub fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set the backoff strategy.
    #[must_use]
    pub fn backoff<B2: BackoffStrategy>(self, backoff: B2) -> RetryConfigBuilder<P, B2> {
        RetryConfigBuilder {
            max_retries: self.max_retries,
            policy: self.policy,
            backoff,
        }
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> RetryConfig<P, B> {
        RetryConfig {
            max_retries: self.max_retries,
            policy: self.policy,
            backoff: self.backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

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
    fn test_exponential_backoff() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30))
            .with_jitter(false);

        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn test_exponential_backoff_cap() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30))
            .with_jitter(false);

        assert_eq!(backoff.delay(5), Duration::from_secs(30));
        assert_eq!(backoff.delay(40), Duration::from_secs(30));
    }

    #[test]
    fn test_huge_max_delay_saturates() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1)).with_max_delay(Duration::MAX);
        assert_eq!(backoff.max_delay(), Duration::MAX);
        assert!(backoff.delay(200) >= Duration::from_secs(1));
    }

    #[test]
    fn test_jitter_only_adds() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(100));
        for attempt in 0..6 {
            let base = backoff.base_delay(attempt);
            let delay = backoff.delay(attempt);
            assert!(delay >= base);
            assert!(delay <= base.mul_f64(1.25));
        }
    }

    #[test]
    fn test_default_retry_policy() {
        let policy = DefaultRetryPolicy;

        assert!(policy.should_retry(&unavailable()));
        assert!(!policy.should_retry(&StatusCakeError::NotFound {
            context: ErrorContext::default()
        }));
        assert!(!policy.should_retry(&StatusCakeError::Permanent {
            context: ErrorContext::default(),
            status: 400,
            body: String::new(),
        }));
    }

    #[test]
    fn test_retry_config_from_provider() {
        let provider = crate::config::ProviderConfig::builder("abcdefghij0123456789")
            .retries(7)
            .min_backoff(Duration::from_secs(2))
            .max_backoff(Duration::from_secs(8))
            .build();
        let config = RetryConfig::from_provider(&provider);

        assert_eq!(config.max_retries, 7);
        assert_eq!(config.backoff.base_delay(0), Duration::from_secs(2));
        assert_eq!(config.backoff.base_delay(5), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn test_retry_execute_success() {
        let config = RetryConfig::default();

        let result = config.execute(None, |_| async { Ok(42) }).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_execute_transient_failure() {
        let config = RetryConfig::builder()
            .max_retries(3)
            .backoff(ExponentialBackoff::new(Duration::ZERO))
            .build();

        let call_count = Arc::new(AtomicU32::new(0));
        let call_count_clone = call_count.clone();

        let result = config
            .execute(None, |_| {
                let count = call_count_clone.clone();
                async move {
                    let n = count.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(unavailable())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_execute_exhausted_reports_attempts() {
        let config = RetryConfig::builder()
            .max_retries(2)
            .backoff(ExponentialBackoff::new(Duration::ZERO))
            .build();

        let result: Result<()> = config.execute(None, |_| async { Err(unavailable()) }).await;

        match result {
            Err(StatusCakeError::Transient { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected transient error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retry_execute_permanent_failure() {
        let config = RetryConfig::builder()
            .max_retries(3)
            .backoff(ExponentialBackoff::new(Duration::ZERO))
            .build();

        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<()> = config
            .execute(None, |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(StatusCakeError::Permanent {
                        context: ErrorContext::default(),
                        status: 422,
                        body: "invalid".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(result.unwrap_err().status(), Some(422));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_execute_backs_off_exponentially() {
        let config = RetryConfig::builder()
            .max_retries(3)
            .backoff(ExponentialBackoff::new(Duration::from_secs(1)).with_jitter(false))
            .build();
        let start = Instant::now();

        let result: Result<()> = config.execute(None, |_| async { Err(unavailable()) }).await;

        assert!(result.is_err());
        // 1s + 2s + 4s between the four attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_execute_honours_retry_after() {
        let config = RetryConfig::builder()
            .max_retries(1)
            .backoff(
                ExponentialBackoff::new(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(30))
                    .with_jitter(false),
            )
            .build();
        let start = Instant::now();

        let _ = config
            .execute(None, |attempt| async move {
                if attempt == 0 {
                    Err(StatusCakeError::Transient {
                        context: ErrorContext::default(),
                        status: Some(429),
                        message: "too many requests".to_string(),
                        attempts: 1,
                        elapsed: Duration::ZERO,
                        retry_after: Some(Duration::from_secs(5)),
                    })
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_execute_deadline_is_distinct_timeout() {
        let config = RetryConfig::builder()
            .max_retries(10)
            .backoff(ExponentialBackoff::new(Duration::from_secs(1)).with_jitter(false))
            .build();
        let deadline = Instant::now() + Duration::from_secs(2);

        let result: Result<()> = config
            .execute(Some(deadline), |_| async { Err(unavailable()) })
            .await;

        match result {
            Err(StatusCakeError::Timeout { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
