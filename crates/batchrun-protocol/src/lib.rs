//! batchrun Protocol Types
//!
//! Serde shapes for the JSON documents exchanged with the batch scheduler and
//! the structured log store, plus the job status enumeration they share.

pub mod batch;
pub mod error;
pub mod logs;
pub mod status;

pub use batch::{
    ContainerDetail, ContainerOverrides, DescribeJobsResponse, JobDetail, ResourceRequirement,
    SubmitJobResponse,
};
pub use error::ProtocolError;
pub use logs::{GetLogEventsResponse, OutputLogEvent, DEFAULT_LOG_GROUP};
pub use status::JobStatus;

/// Interpreter used to run the composed container command.
pub const CONTAINER_SHELL: [&str; 2] = ["/bin/bash", "-c"];
