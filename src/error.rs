//! Top-level run errors and their exit codes

use std::io;

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::signal::EXIT_CODE_CANCELLED;
use crate::staging::TransferError;
use crate::tail::TailError;

/// Exit codes
pub const EXIT_CODE_OK: i32 = 0;
pub const EXIT_CODE_RUNTIME: i32 = 1;
pub const EXIT_CODE_CONFIG: i32 = 2;
pub const EXIT_CODE_SUBMIT: i32 = 20;
pub const EXIT_CODE_OBSERVE: i32 = 40;
pub const EXIT_CODE_TRANSFER: i32 = 70;

/// Errors that end a run
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("job submission failed: {0}")]
    Submit(#[source] ClientError),

    #[error("job observation failed: {0}")]
    Observe(#[source] ClientError),

    #[error("failed to write job output: {0}")]
    Output(#[source] io::Error),

    #[error("{0}")]
    Transfer(#[from] TransferError),

    #[error("interrupted")]
    Interrupted,
}

impl DriverError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Config(_) => EXIT_CODE_CONFIG,
            DriverError::Submit(_) => EXIT_CODE_SUBMIT,
            DriverError::Observe(_) => EXIT_CODE_OBSERVE,
            DriverError::Output(_) => EXIT_CODE_RUNTIME,
            DriverError::Transfer(_) => EXIT_CODE_TRANSFER,
            DriverError::Interrupted => EXIT_CODE_CANCELLED,
        }
    }
}

impl From<TailError> for DriverError {
    fn from(err: TailError) -> Self {
        match err {
            TailError::Fetch(e) => DriverError::Observe(e),
            TailError::Output(e) => DriverError::Output(e),
        }
    }
}
