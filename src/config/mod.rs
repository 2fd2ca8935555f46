//! Layered configuration
//!
//! Settings are merged from three layers, last wins:
//! 1. Built-in defaults
//! 2. User config file (`--config`, else ~/.config/batchrun/config.toml)
//! 3. CLI flags

mod defaults;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use merge::{deep_merge, merge_layers};
pub use settings::{default_config_path, load_toml_file, Endpoints, Overrides, Settings};

use std::path::PathBuf;

use crate::staging::StagingError;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("--command is required")]
    MissingCommand,

    #[error(transparent)]
    Staging(#[from] StagingError),
}
