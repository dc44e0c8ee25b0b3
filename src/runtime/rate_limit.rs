// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-bucket rate limiter shared by every request a client issues.
//!
//! The bucket refills continuously at the configured rate. A caller that finds
//! the bucket empty reserves the next token anyway (the balance goes negative)
//! and sleeps until that token has been earned, so waiters are served in the
//! order they arrived and nobody starves.
//!
//! # Example
//!
//! ```
//! use statuscake_sync::runtime::RateLimiter;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(4.0);
//! limiter.acquire().await;
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Smoothing token-bucket limiter.
#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
    acquired: AtomicU64,
    delayed: AtomicU64,
}

impl RateLimiter {
    /// Slowest supported rate: one request every 100 seconds.
    pub const MIN_RATE: f64 = 0.01;

    /// Create a limiter admitting `rate` requests per second with a burst of one.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        Self::with_burst(rate, 1.0)
    }

    /// Create a limiter with an explicit burst size.
    ///
    /// Rates below [`RateLimiter::MIN_RATE`], and non-finite rates, are
    /// clamped to `MIN_RATE`.
    #[must_use]
    pub fn with_burst(rate: f64, burst: f64) -> Self {
        let rate = if rate.is_finite() {
            rate.max(Self::MIN_RATE)
        } else {
            Self::MIN_RATE
        };
        let burst = burst.max(1.0);
        Self {
            rate,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
            acquired: AtomicU64::new(0),
            delayed: AtomicU64::new(0),
        }
    }

    /// Configured requests per second.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Wait for a token and return how long the caller was held back.
    pub async fn acquire(&self) -> Duration {
        let wait = self.reserve(None).unwrap_or_default();
        self.sleep(wait).await
    }

    /// Wait for a token unless that would take the caller past `deadline`.
    ///
    /// Returns `None` without consuming a token when the deadline cannot be met.
    pub async fn acquire_until(&self, deadline: Instant) -> Option<Duration> {
        let wait = self.reserve(Some(deadline))?;
        Some(self.sleep(wait).await)
    }

    /// Total tokens handed out.
    #[must_use]
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    /// Number of acquisitions that had to wait.
    #[must_use]
    pub fn delayed(&self) -> u64 {
        self.delayed.load(Ordering::Relaxed)
    }

    fn reserve(&self, deadline: Option<Instant>) -> Option<Duration> {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let earned = now.duration_since(bucket.last_refill).as_secs_f64() * self.rate;
        bucket.tokens = (bucket.tokens + earned).min(self.burst);
        bucket.last_refill = now;

        let wait = if bucket.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64((1.0 - bucket.tokens) / self.rate).unwrap_or(Duration::MAX)
        };

        if let Some(deadline) = deadline {
            match now.checked_add(wait) {
                Some(ready) if ready <= deadline => {}
                _ => return None,
            }
        }

        bucket.tokens -= 1.0;
        self.acquired.fetch_add(1, Ordering::Relaxed);
        if !wait.is_zero() {
            self.delayed.fetch_add(1, Ordering::Relaxed);
        }
        Some(wait)
    }

    async fn sleep(&self, wait: Duration) -> Duration {
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        wait
    }
}
