//! Batch scheduler documents.
//!
//! Field names follow the scheduler's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::status::JobStatus;

/// Response to a submit-job call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobResponse {
    pub job_id: String,
}

/// Container overrides sent with a submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerOverrides {
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_requirements: Vec<ResourceRequirement>,
}

/// A single resource requirement override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl ResourceRequirement {
    /// vCPU count override.
    pub fn vcpus(count: u32) -> Self {
        Self {
            kind: "VCPU".to_string(),
            value: count.to_string(),
        }
    }

    /// Memory override in MiB.
    pub fn memory_mib(mib: u64) -> Self {
        Self {
            kind: "MEMORY".to_string(),
            value: mib.to_string(),
        }
    }
}

/// Response to a describe-jobs call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeJobsResponse {
    #[serde(default)]
    pub jobs: Vec<JobDetail>,
}

impl DescribeJobsResponse {
    /// Take the entry for `job_id`.
    pub fn into_job(self, job_id: &str) -> Result<JobDetail, ProtocolError> {
        self.jobs
            .into_iter()
            .find(|job| job.job_id == job_id)
            .ok_or_else(|| ProtocolError::MissingJob {
                job_id: job_id.to_string(),
            })
    }
}

/// One job as described by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub container: ContainerDetail,
}

/// Container section of a job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_stream_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}
