// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider configuration file and environment parser
//!
//! # Example
//!
//! ```
//! use statuscake_sync::config::ProviderConfig;
//! use std::time::Duration;
//!
//! let config = ProviderConfig::builder("abcdefghij0123456789")
//!     .rps(2.0)
//!     .retries(5)
//!     .min_backoff(Duration::from_millis(500))
//!     .build();
//!
//! assert!(config.validate().is_ok());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{Result, StatusCakeError};
use crate::runtime::RateLimiter;

pub const ENV_CONFIG: &str = "STATUSCAKE_CONFIG";
pub const ENV_API_TOKEN: &str = "STATUSCAKE_API_TOKEN";
pub const ENV_RPS: &str = "STATUSCAKE_RPS";
pub const ENV_RETRIES: &str = "STATUSCAKE_RETRIES";
pub const ENV_MIN_BACKOFF: &str = "STATUSCAKE_MIN_BACKOFF";
pub const ENV_MAX_BACKOFF: &str = "STATUSCAKE_MAX_BACKOFF";
pub const ENV_BASE_URL: &str = "STATUSCAKE_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.statuscake.com/v1";

static API_TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]{20,30}$").expect("valid token pattern"));

/// Credentials and client tuning shared by every reconciler.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// API token sent as a bearer credential
    pub api_token: String,

    /// Base endpoint of the StatusCake API
    pub base_url: String,

    /// Requests-per-second ceiling applied by the token bucket
    pub rps: f64,

    /// Maximum number of retries after the first attempt
    pub retries: u32,

    /// Backoff before the first retry
    #[serde(with = "duration_secs")]
    pub min_backoff: Duration,

    /// Cap applied to every backoff delay
    #[serde(with = "duration_secs")]
    pub max_backoff: Duration,

    /// Per-request transport timeout
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            rps: 4.0,
            retries: 3,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("rps", &self.rps)
            .field("retries", &self.retries)
            .field("min_backoff", &self.min_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a builder seeded with the given API token.
    #[must_use]
    pub fn builder(api_token: impl Into<String>) -> ProviderConfigBuilder {
        ProviderConfigBuilder::new(api_token)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed YAML
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            StatusCakeError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| StatusCakeError::Config(format!("Failed to parse config YAML: {}", e)))
    }

    /// Get the default config file path (`<config dir>/statuscake/config.yaml`)
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            StatusCakeError::Config("Could not determine config directory".to_string())
        })?;

        Ok(dir.join("statuscake").join("config.yaml"))
    }

    /// Load the config file (if present) and apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used and the token is
    /// expected to come from `STATUSCAKE_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file is unreadable or an override is malformed
    pub fn load_with_env() -> Result<Self> {
        let path = match std::env::var(ENV_CONFIG) {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::default_path()?,
        };

        let mut config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric override does not parse
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.api_token = token;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(rps) = lookup(ENV_RPS) {
            self.rps = parse_override(ENV_RPS, &rps)?;
        }
        if let Some(retries) = lookup(ENV_RETRIES) {
            self.retries = parse_override(ENV_RETRIES, &retries)?;
        }
        if let Some(secs) = lookup(ENV_MIN_BACKOFF) {
            self.min_backoff = Duration::from_secs(parse_override(ENV_MIN_BACKOFF, &secs)?);
        }
        if let Some(secs) = lookup(ENV_MAX_BACKOFF) {
            self.max_backoff = Duration::from_secs(parse_override(ENV_MAX_BACKOFF, &secs)?);
        }
        Ok(())
    }

    /// Check the credential format and tuning values.
    ///
    /// # Errors
    ///
    /// Returns `StatusCakeError::Config` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if !API_TOKEN_PATTERN.is_match(&self.api_token) {
            return Err(StatusCakeError::Config(
                "API token must be 20-30 characters of 0-9, a-z, A-Z and underscores".to_string(),
            ));
        }
        if !self.rps.is_finite() || self.rps < RateLimiter::MIN_RATE {
            return Err(StatusCakeError::Config(format!(
                "rps must be a number of at least {}, got {}",
                RateLimiter::MIN_RATE,
                self.rps
            )));
        }
        if self.min_backoff > self.max_backoff {
            return Err(StatusCakeError::Config(format!(
                "min_backoff ({:?}) must not exceed max_backoff ({:?})",
                self.min_backoff, self.max_backoff
            )));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| StatusCakeError::Config(format!("Invalid base URL: {e}")))?;
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        StatusCakeError::Config(format!(
            "{key} must be a non-negative number, got {value:?}"
        ))
    })
}

/// Builder for `ProviderConfig`.
#[derive(Debug, Clone)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    /// Create a builder with defaults and the given token.
    #[must_use]
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig {
                api_token: api_token.into(),
                ..ProviderConfig::default()
            },
        }
    }

    /// Set the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the requests-per-second ceiling.
    #[must_use]
    pub fn rps(mut self, rps: f64) -> Self {
        self.config.rps = rps;
        self
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set the minimum backoff.
    #[must_use]
    pub fn min_backoff(mut self, backoff: Duration) -> Self {
        self.config.min_backoff = backoff;
        self
    }

    /// Set the maximum backoff.
    #[must_use]
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.config.max_backoff = backoff;
        self
    }

    /// Set the per-request transport timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ProviderConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
