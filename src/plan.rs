//! Validated run plan
//!
//! Everything a run needs, checked before any remote call: the job to
//! submit, where its artifacts are staged, and the CLI path used inside the
//! container.

use crate::config::{ConfigError, Settings};
use crate::job::{JobSpec, ResourceOverrides};
use crate::staging::StagingSpec;

/// Job fields taken from the command line
#[derive(Debug, Clone, Default)]
pub struct JobRequest {
    pub definition: String,
    pub command: Option<String>,
    pub bucket: Option<String>,
    pub uploads: Vec<String>,
    pub downloads: Vec<String>,
    pub overrides: ResourceOverrides,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub job: JobSpec,
    pub staging: StagingSpec,
    /// `aws` path inside the container
    pub container_cli: String,
}

impl RunPlan {
    pub fn new(request: JobRequest, settings: &Settings) -> Result<Self, ConfigError> {
        let command = request
            .command
            .filter(|c| !c.trim().is_empty())
            .ok_or(ConfigError::MissingCommand)?;

        if request.definition.trim().is_empty() {
            return Err(ConfigError::Invalid("job definition must not be empty".to_string()));
        }

        let staging = StagingSpec::new(
            request.bucket.as_deref(),
            &settings.workdir,
            &request.uploads,
            &request.downloads,
            settings.teardown,
        )?;

        Ok(Self {
            job: JobSpec {
                definition: request.definition,
                queue: settings.job_queue.clone(),
                name: settings.job_name.clone(),
                command,
                overrides: request.overrides,
            },
            staging,
            container_cli: settings.awscli.clone(),
        })
    }
}
