//! In-process fakes for the remote services
//!
//! Stand-ins for the scheduler, the log store and object storage so the
//! driver can be exercised end to end without the `aws` tool.
//!
//! - `MockBatch`: scripted status progression plus the log streams the job
//!   writes as it advances (implements `JobScheduler` and `LogStore`)
//! - `MockObjectStore`: in-memory bucket with real local file I/O
//! - `Journal`: shared, ordered record of the calls made against the fakes
//! - `FailureInjector`: per-operation error injection

mod batch;
mod failure;
mod store;

use std::sync::{Arc, Mutex};

pub use batch::{MockBatch, Step};
pub use failure::{FailureConfig, FailureInjector, MockOp};
pub use store::MockObjectStore;

/// Ordered call record shared between fakes
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries starting with `prefix`.
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }
}
