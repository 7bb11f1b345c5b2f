//! Error types shared by every engine component

use thiserror::Error;

/// Recoverable failures reported by the engine.
///
/// None of these are fatal: the caller decides whether to abort the request
/// or retry with adjusted inputs.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No usable price history for the requested instrument
    #[error("no price history available for instrument '{0}'")]
    DataUnavailable(String),

    /// Empty or malformed instrument identifier
    #[error("invalid instrument identifier: {0:?}")]
    InvalidInstrument(String),

    /// Malformed mortality input
    #[error("invalid mortality table: {0}")]
    InvalidTable(String),

    /// Non-positive horizon or path count, negative volatility, zero-horizon cost request
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invalid_parameters(msg: impl Into<String>) -> Self {
        EngineError::InvalidParameters(msg.into())
    }

    pub(crate) fn invalid_table(msg: impl Into<String>) -> Self {
        EngineError::InvalidTable(msg.into())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, EngineError>;
