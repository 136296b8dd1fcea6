//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `GEMS_DATA_DIR` - Directory for locally stored values (default: `.gems`)
//! - `GEMS_CART_API_URL` - Base URL of the remote cart service; without it
//!   authenticated cart operations fail with a "not configured" error
//! - `GEMS_PAYMENT_DELAY_MS` - Simulated payment latency (default: 2000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::checkout::DEFAULT_PAYMENT_DELAY;

const DEFAULT_DATA_DIR: &str = ".gems";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where the local store keeps its files
    pub data_dir: PathBuf,
    /// Remote cart service base URL
    pub cart_api_url: Option<Url>,
    /// Latency of the simulated payment processor
    pub payment_delay: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cart_api_url: None,
            payment_delay: DEFAULT_PAYMENT_DELAY,
            sentry_dsn: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir =
            get("GEMS_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let cart_api_url = get("GEMS_CART_API_URL")
            .map(|raw| parse_base_url(&raw))
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("GEMS_CART_API_URL".to_string(), e))?;

        let payment_delay = get("GEMS_PAYMENT_DELAY_MS")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GEMS_PAYMENT_DELAY_MS".to_string(), e.to_string())
            })?
            .map_or(DEFAULT_PAYMENT_DELAY, Duration::from_millis);

        Ok(Self {
            data_dir,
            cart_api_url,
            payment_delay,
            sentry_dsn: get("SENTRY_DSN"),
        })
    }
}

/// Parse an http(s) base URL.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
