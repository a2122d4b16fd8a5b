//! Unified error handling for the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::PearError;
use crate::slack::SlackError;

/// Application-level error type for the webhook endpoints.
#[derive(Debug, Error)]
pub enum AppError {
    /// Command or interaction handling failed.
    #[error("Pear error: {0}")]
    Pear(#[from] PearError),

    /// Request did not carry a valid Slack signature.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<SlackError> for AppError {
    fn from(error: SlackError) -> Self {
        match error {
            SlackError::InvalidSignature(msg) => Self::Unauthorized(msg),
            SlackError::InvalidPayload(msg) => Self::BadRequest(msg),
            other => Self::Pear(PearError::Slack(other)),
        }
    }
}

impl AppError {
    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Pear(e) if e.is_bad_request() => StatusCode::BAD_REQUEST,
            Self::Pear(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        // Slack only sees the status line
        let message = status.canonical_reason().unwrap_or("Error");

        (status, message).into_response()
    }
}
