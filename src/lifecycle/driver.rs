//! Run driver
//!
//! Ordering of a run:
//! 1. Compose the container command and upload inputs
//! 2. Submit (a failure here ends the run with no cleanup)
//! 3. Poll until a terminal status, tailing logs as they appear
//! 4. On a loop error: report FAILED and cancel the job (best effort)
//! 5. Download outputs and tear down the staging prefix

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use batchrun_protocol::JobStatus;
use tracing::{debug, error, info, warn};

use crate::client::{JobScheduler, LogStore, ObjectStore};
use crate::compose::compose;
use crate::config::Settings;
use crate::error::DriverError;
use crate::job::JobHandle;
use crate::plan::RunPlan;
use crate::signal::SignalState;
use crate::staging::{StagingGuard, StagingPipeline};
use crate::tail::LogTailer;

use super::machine::{transition, Action, Observation};

/// Remote collaborators, constructed once by the caller
#[derive(Clone, Copy)]
pub struct Clients<'a> {
    pub scheduler: &'a dyn JobScheduler,
    pub logs: &'a dyn LogStore,
    pub objects: &'a dyn ObjectStore,
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Sleep before each describe call
    pub poll_interval: Duration,
    pub log_group: String,
    /// Local directory artifacts are read from and written to
    pub local_root: PathBuf,
}

impl DriverConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            log_group: settings.log_group.clone(),
            local_root: PathBuf::from("."),
        }
    }

    pub fn with_local_root(mut self, local_root: impl Into<PathBuf>) -> Self {
        self.local_root = local_root.into();
        self
    }
}

/// Terminal result of a run that reached the end of polling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub job_id: String,
    pub status: JobStatus,
    /// Container exit code, when the scheduler reports one
    pub exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Succeeded
    }
}

pub struct Driver<'a> {
    clients: Clients<'a>,
    config: DriverConfig,
    signal: Arc<SignalState>,
}

impl<'a> Driver<'a> {
    pub fn new(clients: Clients<'a>, config: DriverConfig, signal: Arc<SignalState>) -> Self {
        Self {
            clients,
            config,
            signal,
        }
    }

    /// Execute `plan`, writing job log messages to `out`.
    pub fn run(&self, plan: &RunPlan, out: &mut dyn Write) -> Result<RunOutcome, DriverError> {
        let command = compose(&plan.container_cli, &plan.staging, &plan.job.command);
        info!("{}", command);

        let pipeline = StagingPipeline::new(self.clients.objects, &self.config.local_root);
        if let Some(prefix) = plan.staging.remote_prefix() {
            pipeline.upload(&prefix, plan.staging.uploads())?;
        }
        if self.signal.is_interrupted() {
            return Err(DriverError::Interrupted);
        }

        let request = plan.job.submit_request(&command);
        let job_id = self
            .clients
            .scheduler
            .submit(&request)
            .map_err(DriverError::Submit)?;
        info!("{} \"{}\"", plan.job.definition, plan.job.command);
        debug!("submitted job {} to {}", job_id, plan.job.queue);

        let guard = StagingGuard::new(&pipeline, &plan.staging);
        let watched = self.watch(JobHandle::submitted(job_id.clone()), out);

        if let Err(ref e) = watched {
            error!("FAILED");
            error!("{}", e);
            if let Err(cancel_err) = self.clients.scheduler.cancel(&job_id, &e.to_string()) {
                warn!("failed to cancel job {}: {}", job_id, cancel_err);
            }
        }

        let released = guard.release();
        match (watched, released) {
            (Ok((status, exit_code)), Ok(())) => Ok(RunOutcome {
                job_id,
                status,
                exit_code,
            }),
            (Ok(_), Err(cleanup)) => Err(cleanup.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => {
                error!("cleanup failed: {}", cleanup);
                Err(e)
            }
        }
    }

    /// Poll until the job reaches a terminal status.
    fn watch(
        &self,
        mut handle: JobHandle,
        out: &mut dyn Write,
    ) -> Result<(JobStatus, Option<i32>), DriverError> {
        let tailer = LogTailer::new(self.clients.logs, self.config.log_group.clone());

        loop {
            if self.signal.sleep(self.config.poll_interval) {
                return Err(DriverError::Interrupted);
            }

            let detail = self
                .clients
                .scheduler
                .describe(handle.job_id())
                .map_err(DriverError::Observe)?;
            let (next, actions) = transition(&handle, &Observation::from(&detail));
            handle = next;

            for action in actions {
                match action {
                    Action::Report(status) => info!("{}", status),
                    Action::Tail { log_stream, cursor } => {
                        let report = tailer.tail(&log_stream, &cursor, out)?;
                        handle.record_tail(&report);
                    }
                    Action::Finish(status) => {
                        let exit_code = detail.container.exit_code;
                        match (&detail.status_reason, exit_code) {
                            (Some(reason), Some(code)) => {
                                debug!("{}: {} (exit code {})", status, reason, code)
                            }
                            (Some(reason), None) => debug!("{}: {}", status, reason),
                            (None, Some(code)) => debug!("{}: exit code {}", status, code),
                            (None, None) => {}
                        }
                        info!("{}", status);
                        return Ok((status, exit_code));
                    }
                }
            }
        }
    }
}
