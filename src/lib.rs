pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::openai::{AiSettings, OpenAiReportGenerator};
pub use core::{
    etl::{IntelEngine, RunSummary},
    pipeline::DealPipeline,
};
pub use utils::error::{IntelError, Result};
