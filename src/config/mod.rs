// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration management for StatusCake clients
//!
//! This module holds the provider configuration: the API credential and the
//! tuning knobs of the rate-limited retrying client.
//!
//! # Environment Variables
//!
//! The following environment variables are supported:
//!
//! - `STATUSCAKE_CONFIG` - Path to a YAML config file (default: `<config dir>/statuscake/config.yaml`)
//! - `STATUSCAKE_API_TOKEN` - API token
//! - `STATUSCAKE_RPS` - Requests per second ceiling
//! - `STATUSCAKE_RETRIES` - Maximum retries per request
//! - `STATUSCAKE_MIN_BACKOFF` - Minimum backoff in seconds
//! - `STATUSCAKE_MAX_BACKOFF` - Maximum backoff in seconds
//! - `STATUSCAKE_BASE_URL` - Override the API endpoint
//!
//! # Example
//!
//! ```no_run
//! use statuscake_sync::config::ProviderConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProviderConfig::load_with_env()?;
//! config.validate()?;
//! println!("Throttling at {} rps", config.rps);
//! # Ok(())
//! # }
//! ```

mod provider;

pub use provider::{
    ProviderConfig, ProviderConfigBuilder, DEFAULT_BASE_URL, ENV_API_TOKEN, ENV_BASE_URL,
    ENV_CONFIG, ENV_MAX_BACKOFF, ENV_MIN_BACKOFF, ENV_RETRIES, ENV_RPS,
};
