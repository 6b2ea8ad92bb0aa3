//! Result and error types for covbin.

use thiserror::Error;

/// Result type for coverage model operations
pub type CovResult<T> = Result<T, CovError>;

/// Errors that stop a coverage model operation.
///
/// Every variant corresponds to a fatal condition: the operation that
/// produced it made no further progress. Recoverable conditions (illegal
/// hits, dropped subset bins, missing holes) are reported through the
/// model's alert log instead.
#[derive(Debug, Error)]
pub enum CovError {
    /// A region or point does not match the model's fixed dimension count
    #[error("dimension mismatch: expected {expected}, got {actual} ({context})")]
    DimensionMismatch {
        /// Dimension count already fixed by the model
        expected: usize,
        /// Dimension count supplied
        actual: usize,
        /// Operation that detected the mismatch
        context: String,
    },

    /// More cross dimensions were supplied than the builder accepts
    #[error("cross of {count} dimensions exceeds the limit of {max}")]
    TooManyDimensions {
        /// Number of non-empty dimensions supplied
        count: usize,
        /// Maximum accepted
        max: usize,
    },

    /// The cross product size does not fit in memory addressing
    #[error("cross product size overflows")]
    CrossOverflow,

    /// Operation requires at least one bin (or one count bin)
    #[error("coverage model is empty: {message}")]
    EmptyModel {
        /// Error message
        message: String,
    },

    /// A model setting is out of range
    #[error("invalid setting: {message}")]
    InvalidSetting {
        /// Error message
        message: String,
    },

    /// A database field failed to parse
    #[error("database parse error at line {line}: {field}: {detail}")]
    Parse {
        /// 1-based line number (0 when end of input was reached)
        line: usize,
        /// Name of the field being read
        field: &'static str,
        /// What went wrong
        detail: String,
    },

    /// `record_last` was called before any point was generated
    #[error("no stimulus point has been generated yet")]
    NoSelection,

    /// A model handle does not refer to a live model
    #[error("invalid model id {id}")]
    InvalidModelId {
        /// Raw handle value
        id: u32,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be decoded
    #[error("settings error: {message}")]
    Settings {
        /// Error message
        message: String,
    },
}

impl CovError {
    /// Create an empty-model error
    #[must_use]
    pub fn empty_model(message: impl Into<String>) -> Self {
        Self::EmptyModel {
            message: message.into(),
        }
    }

    /// Create an invalid-setting error
    #[must_use]
    pub fn invalid_setting(message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    #[must_use]
    pub fn dimension_mismatch(expected: usize, actual: usize, context: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected,
            actual,
            context: context.into(),
        }
    }
}
