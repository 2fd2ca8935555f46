//! Failure injection for the fakes.

use std::collections::HashMap;

/// Operations a failure can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Submit,
    Describe,
    Cancel,
    GetLogEvents,
    Copy,
    Remove,
}

/// Failure configuration for an operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Error message returned as a service error
    pub message: String,
    /// Number of calls that succeed before failures start
    pub skip: u32,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Fail every call
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            skip: 0,
            fail_count: None,
        }
    }

    /// Let the first `calls` calls through
    pub fn after(mut self, calls: u32) -> Self {
        self.skip = calls;
        self
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Failure injector for the fakes
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<MockOp, FailureConfig>,
    call_counts: HashMap<MockOp, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for an operation
    pub fn inject(&mut self, op: MockOp, config: FailureConfig) {
        self.configs.insert(op, config);
        self.call_counts.insert(op, 0);
    }

    /// Count a call and return the error message if this call should fail
    pub fn check(&mut self, op: MockOp) -> Option<String> {
        let config = self.configs.get(&op)?;
        let count = self.call_counts.entry(op).or_insert(0);
        *count += 1;

        if *count <= config.skip {
            return None;
        }
        if let Some(limit) = config.fail_count {
            if *count - config.skip > limit {
                return None;
            }
        }
        Some(config.message.clone())
    }
}
