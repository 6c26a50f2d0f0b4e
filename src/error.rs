use crate::services::repository::RepositoryError;
use thiserror::Error;

/// Errors produced by the matching engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Missing or contradictory request data. Recoverable by the caller.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No scorable candidates while the caller asked for at least one
    #[error("No caregivers available for matching")]
    EmptyPool,

    /// A single malformed caregiver record. Skipped, never fatal to a batch.
    #[error("Cannot score caregiver {caregiver_id}: {reason}")]
    Computation { caregiver_id: String, reason: String },
}

impl MatchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MatchError::InvalidRequest(message.into())
    }
}

/// Errors surfaced by the matching service to HTTP and CLI callers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Senior not found: {0}")]
    SeniorNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    /// HTTP status this error maps to
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::Validation(_) | ApiError::Match(MatchError::InvalidRequest(_)) => 400,
            ApiError::SeniorNotFound(_) | ApiError::Repository(RepositoryError::NotFound(_)) => 404,
            ApiError::Match(MatchError::EmptyPool) => 422,
            ApiError::Match(MatchError::Computation { .. }) | ApiError::Repository(_) => 500,
        }
    }

    /// Short machine-readable error label
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_failed",
            ApiError::Match(MatchError::InvalidRequest(_)) => "invalid_request",
            ApiError::Match(MatchError::EmptyPool) => "empty_pool",
            ApiError::Match(MatchError::Computation { .. }) => "computation_failed",
            ApiError::SeniorNotFound(_) | ApiError::Repository(RepositoryError::NotFound(_)) => "not_found",
            ApiError::Repository(_) => "data_unavailable",
        }
    }
}

/// Top-level errors of the binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("bad".into()).http_status(), 400);
        assert_eq!(ApiError::from(MatchError::invalid("no origin")).http_status(), 400);
        assert_eq!(ApiError::SeniorNotFound("s-1".into()).http_status(), 404);
        assert_eq!(ApiError::from(RepositoryError::Api("down".into())).http_status(), 500);
    }

    #[test]
    fn test_messages_pass_through() {
        let err = ApiError::from(MatchError::invalid("booking_date and start_time are required"));
        assert_eq!(err.to_string(), "Invalid request: booking_date and start_time are required");
        assert_eq!(err.kind(), "invalid_request");
    }
}
