//! Core error type.
//!
//! Mirrors spec.md §7's error kinds. `SOURCE_UNAVAILABLE` is retried
//! internally by the data pipeline and only surfaces here once retries are
//! exhausted; `INVALID_STATE_TRANSITION` is a programmer-bug class and is
//! expected to abort the run rather than be handled.

use thiserror::Error;

use crate::data::validation::DataQualityReport;

#[derive(Debug, Error)]
pub enum HkError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("market data source unavailable for {symbol}: {reason}")]
    SourceUnavailable { symbol: String, reason: String },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("quality rejected (score {score:.1}): {reason}")]
    QualityRejected {
        score: f64,
        reason: String,
        report: Box<DataQualityReport>,
    },

    #[error("invalid order state transition for order {order_id}: {from} -> {to}")]
    InvalidStateTransition {
        order_id: u64,
        from: String,
        to: String,
    },

    #[error("risk rejected: {0}")]
    RiskRejected(String),

    #[error("run cancelled")]
    Cancelled,
}

impl HkError {
    /// The error code exposed at the external boundary (spec.md §7).
    pub fn code(&self) -> &'static str {
        match self {
            HkError::InvalidArgument(_) => "INVALID_ARGUMENT",
            HkError::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            HkError::InsufficientData(_) => "INSUFFICIENT_DATA",
            HkError::QualityRejected { .. } => "QUALITY_REJECTED",
            HkError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            HkError::RiskRejected(_) => "RISK_REJECTED",
            HkError::Cancelled => "CANCELLED",
        }
    }
}

pub type HkResult<T> = Result<T, HkError>;
