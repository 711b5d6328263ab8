use std::time::Duration;
use thiserror::Error;

use crate::services::StoreError;

/// Errors surfaced by the recommendation engine
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecommendError {
    /// Stable machine-readable kind, used in error responses and logs
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendError::InvalidArgument(_) => "invalid_argument",
            RecommendError::NotFound(_) => "not_found",
            RecommendError::Unavailable(_) => "unavailable",
            RecommendError::DeadlineExceeded(_) => "deadline_exceeded",
            RecommendError::DataIntegrity(_) => "data_integrity",
            RecommendError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for RecommendError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => RecommendError::Unavailable(msg),
            StoreError::Timeout(msg) => RecommendError::Unavailable(format!("timed out: {}", msg)),
            StoreError::Malformed(msg) => RecommendError::Internal(msg),
        }
    }
}
