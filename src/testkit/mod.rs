// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for acceptance tests against a real StatusCake account.

use std::env;

use crate::client::StatusCakeClient;
use crate::config::ProviderConfig;

pub const ENV_DEV_TESTS: &str = "STATUSCAKE_DEV_TESTS";

pub struct StatusCakeAccount {
    pub config: ProviderConfig,
    /// Unique prefix for resource names created by this run.
    pub prefix: String,
}

impl StatusCakeAccount {
    /// Connect to the account configured in the environment.
    /// SKIPS if `STATUSCAKE_DEV_TESTS` is not set.
    pub fn from_env(test: &str) -> Option<Self> {
        if env::var(ENV_DEV_TESTS).is_err() {
            println!("Skipping acceptance test: {ENV_DEV_TESTS} not set");
            return None;
        }

        let config = match ProviderConfig::load_with_env() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("\n\n!!! ERROR: StatusCake credentials are not usable !!!");
                eprintln!("Set STATUSCAKE_API_TOKEN or write a config file to:");
                if let Ok(path) = ProviderConfig::default_path() {
                    eprintln!("  {}", path.display());
                }
                eprintln!("\nFull error: {e}\n");
                panic!("Failed to load StatusCake configuration");
            }
        };

        println!("Running acceptance test '{test}' against {}", config.base_url);

        Some(Self {
            config,
            prefix: format!("statuscake-sync-{test}-{}", chrono::Utc::now().timestamp()),
        })
    }

    pub fn client(&self) -> StatusCakeClient {
        StatusCakeClient::new(self.config.clone()).expect("Failed to build StatusCake client")
    }

    /// Resource name scoped to this run.
    pub fn name(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.prefix)
    }
}
