//! Scripted batch scheduler and log store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use batchrun_protocol::{
    ContainerDetail, GetLogEventsResponse, JobDetail, JobStatus, OutputLogEvent, ProtocolError,
};

use crate::client::{
    ClientError, ClientResult, JobScheduler, LogEventsRequest, LogStore, SubmitRequest,
};
use crate::signal::SignalState;

use super::failure::{FailureConfig, FailureInjector, MockOp};
use super::Journal;

/// One scripted describe-jobs answer
#[derive(Debug, Clone)]
pub struct Step {
    pub status: JobStatus,
    /// Log stream name the container reports from this step on
    pub log_stream: Option<String>,
    /// Events the job writes by the time this step is observed
    pub events: Vec<OutputLogEvent>,
    pub exit_code: Option<i32>,
}

impl Step {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            log_stream: None,
            events: Vec::new(),
            exit_code: None,
        }
    }

    pub fn with_log_stream(mut self, name: impl Into<String>) -> Self {
        self.log_stream = Some(name.into());
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn emit(mut self, timestamp: i64, message: impl Into<String>) -> Self {
        self.events.push(OutputLogEvent::new(timestamp, message));
        self
    }
}

#[derive(Debug, Default)]
struct BatchState {
    steps: Vec<Step>,
    position: usize,
    container_stream: Option<String>,
    pending_events: Vec<OutputLogEvent>,
    streams: HashMap<String, Vec<OutputLogEvent>>,
    submissions: Vec<SubmitRequest>,
    job_ids: Vec<String>,
    cancellations: Vec<(String, String)>,
    describe_calls: usize,
    log_calls: usize,
    interrupt_on_describe: Option<(usize, Arc<SignalState>)>,
}

impl BatchState {
    fn append_events(&mut self, events: Vec<OutputLogEvent>) {
        match self.container_stream.clone() {
            Some(stream) => {
                let log = self.streams.entry(stream).or_default();
                log.append(&mut self.pending_events);
                log.extend(events);
            }
            None => self.pending_events.extend(events),
        }
    }
}

/// Scripted scheduler and log store for a single job
///
/// Each describe call serves the next scripted `Step`; the last step repeats
/// once the script is exhausted. Events attached to a step become readable
/// from the job's log stream when that step is served.
pub struct MockBatch {
    state: Mutex<BatchState>,
    failures: Mutex<FailureInjector>,
    journal: Journal,
    page_size: usize,
}

impl Default for MockBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBatch {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BatchState::default()),
            failures: Mutex::new(FailureInjector::new()),
            journal: Journal::new(),
            page_size: 100,
        }
    }

    /// Script the describe-jobs answers.
    pub fn with_steps(self, steps: Vec<Step>) -> Self {
        self.state.lock().unwrap().steps = steps;
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Maximum events per log page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Raise an interrupt on `state` during the given describe call (1-based).
    pub fn interrupt_on_describe(&self, call: usize, state: Arc<SignalState>) {
        self.state.lock().unwrap().interrupt_on_describe = Some((call, state));
    }

    pub fn inject_failure(&self, op: MockOp, config: FailureConfig) {
        self.failures.lock().unwrap().inject(op, config);
    }

    /// Create an empty log stream.
    pub fn push_log_stream(&self, stream: &str) {
        self.state
            .lock()
            .unwrap()
            .streams
            .entry(stream.to_string())
            .or_default();
    }

    /// Append an event directly to a log stream.
    pub fn push_log_event(&self, stream: &str, event: OutputLogEvent) {
        self.state
            .lock()
            .unwrap()
            .streams
            .entry(stream.to_string())
            .or_default()
            .push(event);
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// `(job_id, reason)` for every cancel call.
    pub fn cancellations(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().cancellations.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.state.lock().unwrap().describe_calls
    }

    pub fn log_calls(&self) -> usize {
        self.state.lock().unwrap().log_calls
    }

    fn check_failure(&self, op: MockOp) -> ClientResult<()> {
        match self.failures.lock().unwrap().check(op) {
            Some(message) => Err(ClientError::Service(message)),
            None => Ok(()),
        }
    }
}

impl JobScheduler for MockBatch {
    fn submit(&self, request: &SubmitRequest) -> ClientResult<String> {
        self.journal.record(format!("submit {}", request.job_definition));
        self.check_failure(MockOp::Submit)?;

        let mut state = self.state.lock().unwrap();
        state.submissions.push(request.clone());
        let job_id = format!("job-{:04}", state.submissions.len());
        state.job_ids.push(job_id.clone());
        Ok(job_id)
    }

    fn describe(&self, job_id: &str) -> ClientResult<JobDetail> {
        self.journal.record(format!("describe {}", job_id));

        let interrupt = {
            let mut state = self.state.lock().unwrap();
            state.describe_calls += 1;
            match state.interrupt_on_describe {
                Some((call, ref signal)) if call == state.describe_calls => Some(Arc::clone(signal)),
                _ => None,
            }
        };
        if let Some(signal) = interrupt {
            signal.handle_signal();
        }

        self.check_failure(MockOp::Describe)?;

        let mut state = self.state.lock().unwrap();
        if !state.job_ids.iter().any(|id| id == job_id) {
            return Err(ProtocolError::MissingJob {
                job_id: job_id.to_string(),
            }
            .into());
        }

        let step = if state.steps.is_empty() {
            Step::new(JobStatus::Submitted)
        } else if state.position < state.steps.len() {
            let step = state.steps[state.position].clone();
            state.position += 1;
            if let Some(ref stream) = step.log_stream {
                state.container_stream.get_or_insert_with(|| stream.clone());
            }
            state.append_events(step.events.clone());
            step
        } else {
            state.steps[state.steps.len() - 1].clone()
        };

        Ok(JobDetail {
            job_id: job_id.to_string(),
            status: step.status,
            status_reason: None,
            container: ContainerDetail {
                log_stream_name: state.container_stream.clone(),
                exit_code: step.exit_code,
            },
        })
    }

    fn cancel(&self, job_id: &str, reason: &str) -> ClientResult<()> {
        self.journal.record(format!("cancel {}", job_id));
        self.check_failure(MockOp::Cancel)?;
        self.state
            .lock()
            .unwrap()
            .cancellations
            .push((job_id.to_string(), reason.to_string()));
        Ok(())
    }
}

fn parse_token(token: &str) -> ClientResult<usize> {
    token
        .strip_prefix("f/")
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(|| ClientError::Service(format!("InvalidParameterException: bad token {}", token)))
}

impl LogStore for MockBatch {
    fn get_log_events(&self, request: &LogEventsRequest) -> ClientResult<GetLogEventsResponse> {
        self.check_failure(MockOp::GetLogEvents)?;

        let mut state = self.state.lock().unwrap();
        state.log_calls += 1;

        let log = state.streams.get(&request.log_stream).ok_or_else(|| {
            ClientError::Service(format!(
                "ResourceNotFoundException: log stream {} does not exist",
                request.log_stream
            ))
        })?;

        let mut visible: Vec<OutputLogEvent> = log
            .iter()
            .filter(|event| event.timestamp >= request.start_time)
            .cloned()
            .collect();
        visible.sort_by_key(|event| event.timestamp);

        let offset = match request.next_token {
            Some(ref token) => parse_token(token)?,
            None => 0,
        };
        let start = offset.min(visible.len());
        let end = (start + self.page_size).min(visible.len());
        let events = visible[start..end].to_vec();

        Ok(GetLogEventsResponse {
            next_forward_token: Some(format!("f/{}", end)),
            next_backward_token: Some(format!("b/{}", start)),
            events,
        })
    }
}
