//! Failure classification for command and query execution.

use thiserror::Error;

/// Classified failure returned by handlers and inspected by pipeline
/// behaviors.
///
/// Every variant carries a human-readable message. The classification is the
/// only thing behaviors are allowed to act on; payload-level details stay
/// opaque to them.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request itself was malformed or incomplete; no aggregate was
    /// touched.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced aggregate does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was well-formed but illegal given current aggregate state.
    #[error("business rule violated: {0}")]
    BusinessRule(String),

    /// A concurrent change was detected, such as a stale aggregate version.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Anything else; treated as a defect rather than a domain outcome.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Stable label for tracing fields and metrics dimensions.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::BusinessRule(_) => "business_rule",
            AppError::Conflict(_) => "conflict",
            AppError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Unexpected(format!("serialization error: {error}"))
    }
}

/// Result type for handler and behavior execution.
pub type AppResult<T> = Result<T, AppError>;
