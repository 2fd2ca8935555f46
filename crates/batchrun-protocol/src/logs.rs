//! Structured log store documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Log group the scheduler writes container output to.
pub const DEFAULT_LOG_GROUP: &str = "/aws/batch/job";

/// Response to a get-log-events call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLogEventsResponse {
    #[serde(default)]
    pub events: Vec<OutputLogEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_forward_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_backward_token: Option<String>,
}

/// A single log event. Timestamps are milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputLogEvent {
    pub timestamp: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_time: Option<i64>,
}

impl OutputLogEvent {
    pub fn new(timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
            ingestion_time: None,
        }
    }

    /// Event time in UTC, if the timestamp is representable.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
    }

    /// `[YYYY-mm-dd HH:MM:SS] message`
    pub fn to_log_line(&self) -> String {
        match self.time() {
            Some(time) => format!("[{}] {}", time.format("%Y-%m-%d %H:%M:%S"), self.message),
            None => self.message.clone(),
        }
    }
}
