//! Log tailing
//!
//! Implements cursor-based retrieval of a job's log stream. One `tail` call
//! drains everything currently readable from the cursor onward, following
//! forward tokens until the store hands back the token it was just given.
//!
//! ## Cursor boundary
//!
//! Between calls the cursor is advanced to one millisecond past the last
//! delivered event, so the next call does not ask for that exact timestamp
//! again. An event that lands in the same millisecond as the last delivered
//! one, but is ingested after the call returned, is not seen by later calls.

use std::io::{self, Write};

use tracing::{debug, info};

use crate::client::{ClientError, LogEventsRequest, LogStore};

/// Position in a log stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogCursor {
    /// Milliseconds since the epoch; the next call starts here.
    start_time: i64,
    /// Forward token of the last page read.
    token: Option<String>,
}

impl LogCursor {
    pub fn new(start_time: i64) -> Self {
        Self {
            start_time,
            token: None,
        }
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Last forward token seen. Reported for diagnostics; each call restarts
    /// from `start_time`.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Cursor after a call: one millisecond past the last delivered event,
    /// never moving backwards. Unchanged if nothing was delivered.
    pub fn advance(&self, report: &TailReport) -> Self {
        match report.last_timestamp {
            Some(last) => Self {
                start_time: self.start_time.max(last.saturating_add(1)),
                token: report.last_token.clone().or_else(|| self.token.clone()),
            },
            None => self.clone(),
        }
    }
}

/// Outcome of one `tail` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailReport {
    /// Number of events written
    pub delivered: usize,
    /// Timestamp of the last event written
    pub last_timestamp: Option<i64>,
    /// Forward token of the last page
    pub last_token: Option<String>,
}

/// Error during log tailing
#[derive(Debug, thiserror::Error)]
pub enum TailError {
    #[error("log fetch failed: {0}")]
    Fetch(#[from] ClientError),

    #[error("failed to write log output: {0}")]
    Output(#[from] io::Error),
}

/// Reads a job's log stream page by page
pub struct LogTailer<'a> {
    store: &'a dyn LogStore,
    log_group: String,
}

impl<'a> LogTailer<'a> {
    pub fn new(store: &'a dyn LogStore, log_group: impl Into<String>) -> Self {
        Self {
            store,
            log_group: log_group.into(),
        }
    }

    /// Deliver every event from `cursor` onward.
    ///
    /// Each message is written to `out` as-is and logged at info level with
    /// its UTC timestamp.
    pub fn tail(
        &self,
        log_stream: &str,
        cursor: &LogCursor,
        out: &mut dyn Write,
    ) -> Result<TailReport, TailError> {
        let mut report = TailReport::default();
        let mut request = LogEventsRequest {
            log_group: self.log_group.clone(),
            log_stream: log_stream.to_string(),
            start_time: cursor.start_time(),
            next_token: None,
            start_from_head: true,
        };

        loop {
            let mut page = self.store.get_log_events(&request)?;
            page.events.sort_by_key(|event| event.timestamp);

            for event in page.events {
                if event.timestamp < cursor.start_time() {
                    continue;
                }
                writeln!(out, "{}", event.message)?;
                info!("{}", event.to_log_line());
                report.delivered += 1;
                report.last_timestamp = Some(event.timestamp);
            }

            match page.next_forward_token {
                Some(next) if request.next_token.as_deref() != Some(next.as_str()) => {
                    request.next_token = Some(next);
                }
                next => {
                    report.last_token = next.or(request.next_token);
                    break;
                }
            }
        }

        out.flush()?;
        debug!(
            "tailed {} event(s) from {} starting at {} (previous token {})",
            report.delivered,
            log_stream,
            cursor.start_time(),
            cursor.token().unwrap_or("none")
        );
        Ok(report)
    }
}
