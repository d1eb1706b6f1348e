pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{HttpSource, SqliteStore};
pub use crate::config::{RunMode, Settings};
pub use crate::core::{
    coordinator::{Coordinator, RunReport, RunState},
    sequential::SequentialRunner,
};
pub use crate::utils::error::{EtlError, Result};
