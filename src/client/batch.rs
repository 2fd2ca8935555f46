//! Batch scheduler over `aws batch`.

use batchrun_protocol::{DescribeJobsResponse, JobDetail, SubmitJobResponse};

use super::{AwsCli, ClientResult, JobScheduler, SubmitRequest};

/// `JobScheduler` backed by `aws batch`
#[derive(Debug, Clone)]
pub struct AwsBatch {
    cli: AwsCli,
    endpoint: Option<String>,
}

impl AwsBatch {
    pub fn new(cli: AwsCli, endpoint: Option<String>) -> Self {
        Self { cli, endpoint }
    }
}

pub(crate) fn submit_args(request: &SubmitRequest) -> ClientResult<Vec<String>> {
    Ok(vec![
        "batch".to_string(),
        "submit-job".to_string(),
        "--job-name".to_string(),
        request.job_name.clone(),
        "--job-queue".to_string(),
        request.job_queue.clone(),
        "--job-definition".to_string(),
        request.job_definition.clone(),
        "--container-overrides".to_string(),
        serde_json::to_string(&request.overrides)?,
    ])
}

pub(crate) fn describe_args(job_id: &str) -> Vec<String> {
    vec![
        "batch".to_string(),
        "describe-jobs".to_string(),
        "--jobs".to_string(),
        job_id.to_string(),
    ]
}

pub(crate) fn cancel_args(job_id: &str, reason: &str) -> Vec<String> {
    vec![
        "batch".to_string(),
        "cancel-job".to_string(),
        "--job-id".to_string(),
        job_id.to_string(),
        "--reason".to_string(),
        reason.to_string(),
    ]
}

impl JobScheduler for AwsBatch {
    fn submit(&self, request: &SubmitRequest) -> ClientResult<String> {
        let response: SubmitJobResponse = self
            .cli
            .run_json(submit_args(request)?, self.endpoint.as_deref())?;
        Ok(response.job_id)
    }

    fn describe(&self, job_id: &str) -> ClientResult<JobDetail> {
        let response: DescribeJobsResponse = self
            .cli
            .run_json(describe_args(job_id), self.endpoint.as_deref())?;
        Ok(response.into_job(job_id)?)
    }

    fn cancel(&self, job_id: &str, reason: &str) -> ClientResult<()> {
        self.cli
            .run(cancel_args(job_id, reason), self.endpoint.as_deref())?;
        Ok(())
    }
}
