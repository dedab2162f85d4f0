//! API error types and handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use peanut_shared::PeanutError;
use thiserror::Error;
use tracing::error;

/// API error type.
///
/// Failures are reported with a short plain-text body; details only go to
/// the log.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No component with the requested name was discovered.
    #[error("component not found: {0}")]
    NotFound(String),

    /// Listing workload objects failed.
    #[error("failed to load workloads: {0}")]
    Source(PeanutError),

    /// Workload metadata could not be turned into components.
    #[error("failed to parse workloads: {0}")]
    Discovery(PeanutError),

    /// A document could not be encoded.
    #[error("failed to encode document: {0}")]
    Encode(PeanutError),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Source(_) | ApiError::Discovery(_) | ApiError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The response body; never includes error details.
    fn public_message(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "component not found",
            ApiError::Source(_) => "failed to load workloads",
            ApiError::Discovery(_) => "failed to parse workloads",
            ApiError::Encode(_) => "failed to encode document",
        }
    }
}

impl From<PeanutError> for ApiError {
    fn from(err: PeanutError) -> Self {
        match err {
            err if err.is_discovery_error() => ApiError::Discovery(err),
            err @ PeanutError::Encode(_) => ApiError::Encode(err),
            err => ApiError::Source(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_errors() {
        let err = ApiError::from(PeanutError::extraction("bad metadata"));
        assert!(matches!(err, ApiError::Discovery(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(PeanutError::Cluster("unreachable".into()));
        assert!(matches!(err, ApiError::Source(_)));

        let err = ApiError::from(PeanutError::Encode("bad".into()));
        assert!(matches!(err, ApiError::Encode(_)));
    }

    #[test]
    fn not_found_is_404() {
        let err = ApiError::NotFound("mysql".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
