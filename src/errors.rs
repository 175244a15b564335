use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for validation, forecasting and storage failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("Group not found: {0}")]
    GroupNotFound(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forecast failed: {0}")]
    Forecast(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, SplitError>;

/// Coarse classification a caller uses to decide who has to act on a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself is malformed and must be corrected by the caller.
    InputValidation,
    /// The request is well formed but the stored history cannot support it.
    InsufficientData,
    /// The addressed resource does not exist.
    NotFound,
    /// A server-side failure; retrying with the same input will not help.
    Internal,
}

impl SplitError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SplitError::InvalidInput(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SplitError::InvalidInput(_) | SplitError::GroupNotFound(_) => {
                ErrorCategory::InputValidation
            }
            SplitError::InsufficientData(_) => ErrorCategory::InsufficientData,
            SplitError::NotFound(_) => ErrorCategory::NotFound,
            SplitError::Forecast(_) | SplitError::Storage(_) | SplitError::Config(_) => {
                ErrorCategory::Internal
            }
        }
    }

    /// The user-facing reason without the category prefix.
    pub fn reason(&self) -> &str {
        match self {
            SplitError::InvalidInput(message)
            | SplitError::InsufficientData(message)
            | SplitError::GroupNotFound(message)
            | SplitError::NotFound(message)
            | SplitError::Forecast(message)
            | SplitError::Storage(message)
            | SplitError::Config(message) => message,
        }
    }
}

impl From<std::io::Error> for SplitError {
    fn from(err: std::io::Error) -> Self {
        SplitError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SplitError {
    fn from(err: serde_json::Error) -> Self {
        SplitError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            SplitError::invalid("bad").category(),
            ErrorCategory::InputValidation
        );
        assert_eq!(
            SplitError::GroupNotFound("x".into()).category(),
            ErrorCategory::InputValidation
        );
        assert_eq!(
            SplitError::InsufficientData("short".into()).category(),
            ErrorCategory::InsufficientData
        );
        assert_eq!(
            SplitError::Forecast("nope".into()).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn io_errors_become_storage_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err = SplitError::from(io);
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.reason(), "missing file");
    }
}
