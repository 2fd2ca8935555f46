//! Log subscriber setup
//!
//! Messages are written bare (no timestamp, target or level) to stdout, or
//! appended to a file when one is given. `RUST_LOG` overrides the level
//! chosen from the verbosity flags.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// 0 = errors only, 1 = info, 2+ = debug
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::ERROR,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<(), LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level_for(verbosity)).into())
        .from_env_lossy();
    let layer = fmt::layer().without_time().with_target(false).with_level(false);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing_subscriber::registry()
                .with(layer.with_writer(Mutex::new(file)).with_ansi(false))
                .with(filter)
                .try_init()?;
        }
        None => {
            tracing_subscriber::registry()
                .with(layer.with_writer(io::stdout))
                .with(filter)
                .try_init()?;
        }
    }
    Ok(())
}
