use crate::config::toml_config::TomlConfig;
use crate::config::{
    RunMode, Settings, DEFAULT_API_ENDPOINT, DEFAULT_COLLECTION, DEFAULT_FETCH_TIMEOUT_MS,
    DEFAULT_STORE_URI,
};
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "staged-etl")]
#[command(about = "Fetch user records, normalize them in a worker stage and persist the batch")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, default_value = DEFAULT_STORE_URI)]
    pub store_uri: String,

    #[arg(long, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
    pub fetch_timeout_ms: u64,

    #[arg(long, value_enum, default_value_t = RunMode::Staged)]
    pub mode: RunMode,

    #[arg(long, help = "Load source and store settings from a TOML file instead")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Settings from `--config` when given, otherwise from the flags.
    pub fn settings(&self) -> Result<Settings> {
        match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Ok(TomlConfig::from_file(path)?.into())
            }
            None => Ok(Settings {
                api_endpoint: self.api_endpoint.clone(),
                fetch_timeout_ms: self.fetch_timeout_ms,
                store_uri: self.store_uri.clone(),
                collection: self.collection.clone(),
            }),
        }
    }
}
