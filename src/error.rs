//! Error types for the monitor.

use thiserror::Error;

/// Errors raised while ingesting, scoring or persisting samples.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Line did not hold exactly four finite numeric fields
    #[error("malformed sample {line:?}: {reason}")]
    MalformedSample { line: String, reason: String },

    /// Scaler or classifier failed for one sample
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    /// Transport could not be opened or has gone away
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Persistence collaborator failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSample {
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// Per-sample errors drop the sample; everything else is surfaced.
    pub fn is_per_sample(&self) -> bool {
        matches!(self, Self::MalformedSample { .. } | Self::Scoring(_))
    }
}

impl From<rusqlite::Error> for MonitorError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Collaborator-defined scoring failures.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("no classifier model loaded")]
    ModelUnavailable,

    #[error("classifier produced a non-finite probability")]
    NonFinite,

    #[error("inference error: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
