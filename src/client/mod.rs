//! Remote service clients
//!
//! The driver talks to three collaborators through the traits defined here:
//! - `JobScheduler`: submit, describe and cancel a batch job
//! - `LogStore`: page through a job's log stream
//! - `ObjectStore`: copy artifacts to and from the staging location
//!
//! Production implementations shell out to the `aws` command-line tool
//! (`AwsBatch`, `AwsLogs`, `AwsS3`). Tests substitute the fakes in
//! `crate::mock`.

mod aws_cli;
mod batch;
mod logs;
mod s3;

use std::fmt;
use std::io;
use std::path::PathBuf;

use batchrun_protocol::{ContainerOverrides, GetLogEventsResponse, JobDetail, ProtocolError};

pub use aws_cli::{AwsCli, AwsCliConfig};
pub use batch::AwsBatch;
pub use logs::AwsLogs;
pub use s3::AwsS3;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("local I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("service error: {0}")]
    Service(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Everything the scheduler needs to enqueue one job.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub job_name: String,
    pub job_queue: String,
    pub job_definition: String,
    pub overrides: ContainerOverrides,
}

/// One page request against a log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEventsRequest {
    pub log_group: String,
    pub log_stream: String,
    /// Milliseconds since the epoch; events before this are not returned.
    pub start_time: i64,
    pub next_token: Option<String>,
    pub start_from_head: bool,
}

/// Remote job scheduler
pub trait JobScheduler: Send + Sync {
    /// Submit a job and return its identifier.
    fn submit(&self, request: &SubmitRequest) -> ClientResult<String>;

    /// Describe a single job.
    fn describe(&self, job_id: &str) -> ClientResult<JobDetail>;

    /// Request cancellation of a job.
    fn cancel(&self, job_id: &str, reason: &str) -> ClientResult<()>;
}

/// Structured log store
pub trait LogStore: Send + Sync {
    /// Fetch one page of events.
    fn get_log_events(&self, request: &LogEventsRequest) -> ClientResult<GetLogEventsResponse>;
}

/// Either end of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Remote(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Remote(uri) => f.write_str(uri),
        }
    }
}

/// Object storage reached through a copy tool
///
/// Both operations return the tool's output for logging.
pub trait ObjectStore: Send + Sync {
    /// Copy a single object between local storage and the remote location.
    fn copy(&self, from: &Location, to: &Location) -> ClientResult<String>;

    /// Delete everything under a remote prefix.
    fn remove_recursive(&self, uri: &str) -> ClientResult<String>;
}
