//! Record gateway configuration
//!
//! Loaded from environment variables, with an optional `.env` file.

use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Connection settings for the hosted record API
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

fn default_timeout_secs() -> u64 {
    30
}

impl GatewayConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is optional
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let timeout_secs = match lookup("GATEWAY_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "GATEWAY_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => default_timeout_secs(),
        };

        Ok(Self {
            base_url: required("GATEWAY_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            project_id: required("GATEWAY_PROJECT_ID")?,
            public_key: required("GATEWAY_PUBLIC_KEY")?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
