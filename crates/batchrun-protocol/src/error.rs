//! Protocol-level errors.

use thiserror::Error;

/// Errors raised while interpreting scheduler or log store documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("describe-jobs returned no entry for job {job_id}")]
    MissingJob { job_id: String },
}
