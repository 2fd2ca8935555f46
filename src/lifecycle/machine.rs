//! Polling state machine
//!
//! Each describe call yields an `Observation`. `transition` folds it into
//! the `JobHandle` and returns the actions the driver must perform, in
//! order. It performs no I/O.

use batchrun_protocol::{JobDetail, JobStatus};

use crate::job::JobHandle;
use crate::tail::LogCursor;

/// One describe result, reduced to what the loop acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub status: JobStatus,
    pub log_stream: Option<String>,
}

impl Observation {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            log_stream: None,
        }
    }

    pub fn with_log_stream(mut self, log_stream: impl Into<String>) -> Self {
        self.log_stream = Some(log_stream.into());
        self
    }
}

impl From<&JobDetail> for Observation {
    fn from(detail: &JobDetail) -> Self {
        Self {
            status: detail.status,
            log_stream: detail.container.log_stream_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Report a newly observed non-terminal status
    Report(JobStatus),
    /// Deliver log events from `cursor` onward
    Tail { log_stream: String, cursor: LogCursor },
    /// Report the terminal status and stop polling
    Finish(JobStatus),
}

/// Apply an observation to the handle.
///
/// Status reports happen only on change. Once the job is `RUNNING` or
/// terminal, the log stream is captured the first time it shows up and then
/// tailed on every observation. A terminal status always comes last.
pub fn transition(handle: &JobHandle, observation: &Observation) -> (JobHandle, Vec<Action>) {
    let mut next = handle.clone();
    let mut actions = Vec::new();
    let status = observation.status;

    if next.status != Some(status) {
        next.status = Some(status);
        if !status.is_terminal() {
            actions.push(Action::Report(status));
        }
    }

    if status.has_logs() {
        if next.log_stream.is_none() {
            next.log_stream = observation.log_stream.clone();
        }
        if let Some(ref log_stream) = next.log_stream {
            actions.push(Action::Tail {
                log_stream: log_stream.clone(),
                cursor: next.cursor.clone(),
            });
        }
    }

    if status.is_terminal() {
        actions.push(Action::Finish(status));
    }

    (next, actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tail::TailReport;
    use batchrun_protocol::ContainerDetail;

    fn step(handle: &JobHandle, observation: Observation) -> (JobHandle, Vec<Action>) {
        transition(handle, &observation)
    }

    fn tail(stream: &str, start_time: i64) -> Action {
        Action::Tail {
            log_stream: stream.to_string(),
            cursor: LogCursor::new(start_time),
        }
    }

    #[test]
    fn test_first_observation_reported() {
        let handle = JobHandle::submitted("job-1");
        let (next, actions) = step(&handle, Observation::new(JobStatus::Submitted));

        assert_eq!(next.status(), Some(JobStatus::Submitted));
        assert_eq!(actions, vec![Action::Report(JobStatus::Submitted)]);
    }

    #[test]
    fn test_unchanged_status_not_reported() {
        let handle = JobHandle::submitted("job-1");
        let (handle, _) = step(&handle, Observation::new(JobStatus::Pending));
        let (handle, actions) = step(&handle, Observation::new(JobStatus::Pending));

        assert!(actions.is_empty());
        assert_eq!(handle.status(), Some(JobStatus::Pending));
    }

    #[test]
    fn test_running_without_stream_does_not_tail() {
        let handle = JobHandle::submitted("job-1");
        let (handle, actions) = step(&handle, Observation::new(JobStatus::Running));

        assert_eq!(actions, vec![Action::Report(JobStatus::Running)]);
        assert!(handle.log_stream().is_none());
    }

    #[test]
    fn test_stream_captured_once_and_tailed_each_observation() {
        let handle = JobHandle::submitted("job-1");
        let (handle, _) = step(&handle, Observation::new(JobStatus::Running));

        let (handle, actions) = step(
            &handle,
            Observation::new(JobStatus::Running).with_log_stream("train/default/abc"),
        );
        assert_eq!(actions, vec![tail("train/default/abc", 0)]);
        assert_eq!(handle.log_stream(), Some("train/default/abc"));

        // A different stream name later does not replace the captured one.
        let (handle, actions) = step(
            &handle,
            Observation::new(JobStatus::Running).with_log_stream("train/default/other"),
        );
        assert_eq!(actions, vec![tail("train/default/abc", 0)]);
        assert_eq!(handle.log_stream(), Some("train/default/abc"));
    }

    #[test]
    fn test_unchanged_running_still_tails() {
        let handle = JobHandle::submitted("job-1");
        let (handle, _) = step(
            &handle,
            Observation::new(JobStatus::Running).with_log_stream("s"),
        );

        for _ in 0..3 {
            let (_, actions) = step(
                &handle,
                Observation::new(JobStatus::Running).with_log_stream("s"),
            );
            assert_eq!(actions, vec![tail("s", 0)]);
        }
    }

    #[test]
    fn test_tail_uses_advanced_cursor() {
        let handle = JobHandle::submitted("job-1");
        let (mut handle, _) = step(
            &handle,
            Observation::new(JobStatus::Running).with_log_stream("s"),
        );
        handle.record_tail(&TailReport {
            delivered: 1,
            last_timestamp: Some(4_000),
            last_token: None,
        });

        let (_, actions) = step(&handle, Observation::new(JobStatus::Running));
        assert_eq!(actions, vec![tail("s", 4_001)]);
    }

    #[test]
    fn test_terminal_tails_then_finishes() {
        let handle = JobHandle::submitted("job-1");
        let (handle, _) = step(
            &handle,
            Observation::new(JobStatus::Running).with_log_stream("s"),
        );
        let (handle, actions) = step(&handle, Observation::new(JobStatus::Succeeded));

        assert_eq!(
            actions,
            vec![tail("s", 0), Action::Finish(JobStatus::Succeeded)]
        );
        assert_eq!(handle.status(), Some(JobStatus::Succeeded));
    }

    #[test]
    fn test_failed_before_any_stream() {
        let handle = JobHandle::submitted("job-1");
        let (handle, _) = step(&handle, Observation::new(JobStatus::Runnable));
        let (_, actions) = step(&handle, Observation::new(JobStatus::Failed));

        assert_eq!(actions, vec![Action::Finish(JobStatus::Failed)]);
    }

    #[test]
    fn test_skipped_states_are_fine() {
        let handle = JobHandle::submitted("job-1");
        let (handle, _) = step(&handle, Observation::new(JobStatus::Submitted));
        let (_, actions) = step(
            &handle,
            Observation::new(JobStatus::Succeeded).with_log_stream("s"),
        );

        assert_eq!(actions, vec![tail("s", 0), Action::Finish(JobStatus::Succeeded)]);
    }

    #[test]
    fn test_pending_ignores_stream() {
        let handle = JobHandle::submitted("job-1");
        let (handle, actions) = step(
            &handle,
            Observation::new(JobStatus::Starting).with_log_stream("s"),
        );

        assert_eq!(actions, vec![Action::Report(JobStatus::Starting)]);
        assert!(handle.log_stream().is_none());
    }

    #[test]
    fn test_observation_from_detail() {
        let detail = JobDetail {
            job_id: "job-1".to_string(),
            status: JobStatus::Running,
            status_reason: None,
            container: ContainerDetail {
                log_stream_name: Some("s".to_string()),
                exit_code: None,
            },
        };
        assert_eq!(
            Observation::from(&detail),
            Observation::new(JobStatus::Running).with_log_stream("s")
        );
    }
}
