//! Orchestration-layer errors: wraps `hkbt_core::error::HkError` with the
//! failure modes that only exist once you add a request schema and a batch
//! runner on top of it.

use thiserror::Error;

use hkbt_core::error::HkError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid backtest request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Core(#[from] HkError),

    #[error("symbol '{0}' produced no result in the batch")]
    MissingBatchResult(String),
}

impl RunError {
    /// The error code exposed at the external boundary (spec.md §7); batch-
    /// runner-only failures get their own code since they have no `HkError`
    /// counterpart.
    pub fn code(&self) -> &'static str {
        match self {
            RunError::InvalidRequest(_) => "INVALID_ARGUMENT",
            RunError::Core(e) => e.code(),
            RunError::MissingBatchResult(_) => "INTERNAL",
        }
    }
}
