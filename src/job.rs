//! Job specification and the handle observed during a run
//!
//! `JobSpec` is what gets submitted and never changes afterwards.
//! `JobHandle` only exists once the scheduler has accepted the job; the
//! lifecycle state machine is the only writer of its observed state.

use batchrun_protocol::{ContainerOverrides, JobStatus, ResourceRequirement, CONTAINER_SHELL};

use crate::client::SubmitRequest;
use crate::tail::{LogCursor, TailReport};

/// Optional per-submission resource overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceOverrides {
    /// vCPU count
    pub cpus: Option<u32>,
    /// Memory in MiB
    pub memory_mib: Option<u64>,
}

impl ResourceOverrides {
    pub fn is_empty(&self) -> bool {
        self.cpus.is_none() && self.memory_mib.is_none()
    }

    pub fn requirements(&self) -> Vec<ResourceRequirement> {
        let mut requirements = Vec::new();
        if let Some(cpus) = self.cpus {
            requirements.push(ResourceRequirement::vcpus(cpus));
        }
        if let Some(mib) = self.memory_mib {
            requirements.push(ResourceRequirement::memory_mib(mib));
        }
        requirements
    }
}

/// What to run and where to queue it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub definition: String,
    pub queue: String,
    pub name: String,
    /// The user command, before staging wraps it
    pub command: String,
    pub overrides: ResourceOverrides,
}

impl JobSpec {
    /// Submission for this job running `container_command` under bash.
    pub fn submit_request(&self, container_command: &str) -> SubmitRequest {
        let mut command: Vec<String> = CONTAINER_SHELL.iter().map(|s| s.to_string()).collect();
        command.push(container_command.to_string());

        SubmitRequest {
            job_name: self.name.clone(),
            job_queue: self.queue.clone(),
            job_definition: self.definition.clone(),
            overrides: ContainerOverrides {
                command,
                resource_requirements: self.overrides.requirements(),
            },
        }
    }
}

/// A submitted job and what has been observed about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    job_id: String,
    pub(crate) status: Option<JobStatus>,
    pub(crate) log_stream: Option<String>,
    pub(crate) cursor: LogCursor,
}

impl JobHandle {
    /// Handle for a job the scheduler accepted as `job_id`.
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: None,
            log_stream: None,
            cursor: LogCursor::default(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Last recorded status; None until the first describe.
    pub fn status(&self) -> Option<JobStatus> {
        self.status
    }

    pub fn log_stream(&self) -> Option<&str> {
        self.log_stream.as_deref()
    }

    pub fn cursor(&self) -> &LogCursor {
        &self.cursor
    }

    pub(crate) fn record_tail(&mut self, report: &TailReport) {
        self.cursor = self.cursor.advance(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(overrides: ResourceOverrides) -> JobSpec {
        JobSpec {
            definition: "train".to_string(),
            queue: "optimal".to_string(),
            name: "default".to_string(),
            command: "echo hi".to_string(),
            overrides,
        }
    }

    #[test]
    fn test_submit_request_wraps_command_in_bash() {
        let request = spec(ResourceOverrides::default()).submit_request("mkdir -p tmp; cd tmp; echo hi");
        assert_eq!(
            request.overrides.command,
            vec!["/bin/bash", "-c", "mkdir -p tmp; cd tmp; echo hi"]
        );
        assert!(request.overrides.resource_requirements.is_empty());
        assert_eq!(request.job_definition, "train");
    }

    #[test]
    fn test_resource_overrides() {
        let overrides = ResourceOverrides {
            cpus: Some(8),
            memory_mib: Some(30_000),
        };
        let request = spec(overrides).submit_request("true");
        assert_eq!(
            request.overrides.resource_requirements,
            vec![ResourceRequirement::vcpus(8), ResourceRequirement::memory_mib(30_000)]
        );
    }

    #[test]
    fn test_partial_overrides() {
        let overrides = ResourceOverrides {
            cpus: None,
            memory_mib: Some(512),
        };
        assert!(!overrides.is_empty());
        assert_eq!(overrides.requirements(), vec![ResourceRequirement::memory_mib(512)]);
        assert!(ResourceOverrides::default().is_empty());
    }

    #[test]
    fn test_handle_starts_unobserved() {
        let handle = JobHandle::submitted("job-1");
        assert_eq!(handle.job_id(), "job-1");
        assert!(handle.status().is_none());
        assert!(handle.log_stream().is_none());
        assert_eq!(handle.cursor().start_time(), 0);
    }

    #[test]
    fn test_record_tail_advances_cursor() {
        let mut handle = JobHandle::submitted("job-1");
        handle.record_tail(&TailReport {
            delivered: 2,
            last_timestamp: Some(1_000),
            last_token: None,
        });
        assert_eq!(handle.cursor().start_time(), 1_001);
    }
}
