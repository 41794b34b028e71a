//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPKIT_API_BASE_URL` - Base URL of the storefront backend API
//!
//! ## Optional
//! - `SHOPKIT_REQUEST_TIMEOUT_SECS` - Overall per-request deadline (default: 10)
//! - `SHOPKIT_CREDENTIALS_PATH` - Path for the file-backed credential store;
//!   credentials stay in memory when unset

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default per-request deadline in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error(transparent)]
    Client(#[from] crate::error::ApiError),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend API.
    pub base_url: Url,
    /// Fixed overall deadline applied uniformly to every request.
    pub request_timeout: Duration,
    /// Location of the durable credential store, if any.
    pub credentials_path: Option<PathBuf>,
}

impl ApiConfig {
    /// Build a config for the given base URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPKIT_API_BASE_URL".to_string(), e.to_string())
        })?;
        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials_path: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("SHOPKIT_API_BASE_URL")?;
        let mut config = Self::new(&base_url)?;

        if let Some(secs) = get_optional_env("SHOPKIT_REQUEST_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "SHOPKIT_REQUEST_TIMEOUT_SECS".to_string(),
                    e.to_string(),
                )
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.credentials_path = get_optional_env("SHOPKIT_CREDENTIALS_PATH").map(PathBuf::from);

        Ok(config)
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_valid_url() {
        let config = ApiConfig::new("http://localhost:4000/api").expect("valid url");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.base_url.as_str(), "http://localhost:4000/api");
    }

    #[test]
    fn test_config_rejects_invalid_url() {
        let err = ApiConfig::new("not a url").expect_err("invalid url");
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
