//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use avsync_domain::error::{CommunicationError, ConfigurationError, SyncError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`SyncError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(SyncError);

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            SyncError::Configuration(
                ConfigurationError::UnknownItem(_) | ConfigurationError::UnknownDevice(_),
            ) => StatusCode::NOT_FOUND,
            SyncError::Configuration(_) => StatusCode::BAD_REQUEST,
            SyncError::Communication(CommunicationError::Timeout(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            SyncError::Communication(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            SyncError::Configuration(err) => err.to_string(),
            SyncError::Communication(err) => err.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
