//! API error type and its mapping to HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use railcast_features::InputError;
use railcast_modeling::PredictionError;
use railcast_storage::StorageError;

/// Every fault a request handler can answer with.
///
/// One mapping to status codes keeps the propagation policy in one
/// place: input faults are client errors, a missing model is
/// server-unavailable, and everything unexpected is a generic 500 whose
/// detail only reaches the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed date or reading in the request body.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Structurally valid JSON missing required content.
    #[error("{0}")]
    BadRequest(String),
    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    BadCredentials,
    /// Missing, unknown, or expired session token.
    #[error("authentication required")]
    Unauthorized,
    /// Registration collided with an existing account.
    #[error("username or email already exists")]
    DuplicateUser,
    /// No model artifact is loaded.
    #[error("prediction model is not available")]
    ModelUnavailable,
    /// The loaded model rejected the feature vector.
    #[error("prediction failed")]
    Prediction(#[source] PredictionError),
    /// Persistence failure on a load-bearing path.
    #[error("internal error")]
    Storage(#[source] StorageError),
}

impl ApiError {
    /// Status code for the fault.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Input(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BadCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::DuplicateUser => StatusCode::CONFLICT,
            Self::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Prediction(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::DuplicateUser => Self::DuplicateUser,
            other => Self::Storage(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
