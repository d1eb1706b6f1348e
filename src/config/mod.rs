#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_identifier, validate_range, validate_store_uri, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_STORE_URI: &str = "sqlite://./data/staged_etl.db";
pub const DEFAULT_COLLECTION: &str = "processed_data";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;

/// Resolved settings for one process, whichever source they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub api_endpoint: String,
    pub fetch_timeout_ms: u64,
    pub store_uri: String,
    pub collection: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            store_uri: DEFAULT_STORE_URI.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl ConfigProvider for Settings {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    fn store_uri(&self) -> &str {
        &self.store_uri
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api_endpoint", &self.api_endpoint)?;
        validate_range("fetch_timeout_ms", self.fetch_timeout_ms, 1, 600_000)?;
        validate_store_uri("store_uri", &self.store_uri)?;
        validate_identifier("collection", &self.collection)?;
        Ok(())
    }
}

/// How a run is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Processing and storage in isolated worker stages.
    #[default]
    Staged,
    /// Fetch, transform and store inline on one task.
    Sequential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let settings = Settings {
            fetch_timeout_ms: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_non_sqlite_store_is_rejected() {
        let settings = Settings {
            store_uri: "mongodb://localhost:27017/multi_threaded".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
