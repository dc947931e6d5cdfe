// src/error.rs
use thiserror::Error;

/// Everything that can stop a chart from being built.
///
/// Row-level problems never show up here; they are skipped and reported
/// through [`crate::progress::Progress`]. Only chart-level failures propagate.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("chart not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed chart {chart}: ranks are not exactly 1..={len} (got {ranks:?})", len = .ranks.len())]
    MalformedChart { chart: String, ranks: Vec<u32> },

    #[error("malformed chart {chart}: peak/last/weeks present on some entries only")]
    MixedStats { chart: String },

    #[error("chart {chart} is unusable: {kept} of {seen} rows parsed")]
    EmptyChart { chart: String, kept: usize, seen: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChartError {
    /// Transport failures are the only kind worth trying again.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChartError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
