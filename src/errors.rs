//! Error taxonomy for the alert pipeline and its external collaborators.

use thiserror::Error;

/// Per-item failure inside the normalization pipeline.
///
/// None of these abort a batch: extractors turn them into degraded records and
/// the summary builder counts and skips the offending entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlertError {
    #[error("extraction response failed schema validation: {0}")]
    SchemaValidation(String),
    #[error("extraction service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("feed entity is not a recognizable alert: {0}")]
    MalformedEntity(String),
}

/// Transport-level failure reported by an inference service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request timed out")]
    Timeout,
    #[error("request was not authorized")]
    Unauthorized,
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<ServiceError> for AlertError {
    fn from(value: ServiceError) -> Self {
        AlertError::ServiceUnavailable(value.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return ServiceError::Timeout;
        }
        match value.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                ServiceError::Unauthorized
            }
            _ => ServiceError::Unavailable(value.to_string()),
        }
    }
}
