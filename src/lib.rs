//! batchrun - submit a containerized batch job and follow it to completion
//!
//! A run composes the shell command executed inside the container, stages
//! input artifacts through object storage, submits the job, polls its
//! status while tailing its log stream, and finally retrieves outputs and
//! removes the staging prefix.

pub mod client;
pub mod compose;
pub mod config;
pub mod error;
pub mod job;
pub mod lifecycle;
pub mod logging;
pub mod mock;
pub mod plan;
pub mod signal;
pub mod staging;
pub mod tail;

pub use config::{ConfigError, Settings};
pub use error::DriverError;
pub use job::{JobHandle, JobSpec, ResourceOverrides};
pub use lifecycle::{Clients, Driver, DriverConfig, RunOutcome};
pub use plan::{JobRequest, RunPlan};
pub use staging::StagingSpec;
