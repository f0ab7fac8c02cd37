use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use locstat::{PipelineError, INTERNAL_FAULT_MESSAGE};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Pipeline(err) => StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> String {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST".to_string(),
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE".to_string(),
            ServerError::Pipeline(err) => err.kind().code().to_ascii_uppercase(),
            ServerError::Internal(_) => "INTERNAL_ERROR".to_string(),
            ServerError::Config(_) => "CONFIG_ERROR".to_string(),
            ServerError::NotFound => "NOT_FOUND".to_string(),
        }
    }

    /// Message returned to the caller. Internal detail is only logged.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Pipeline(err) => err.public_message(),
            ServerError::Internal(_) | ServerError::Config(_) => INTERNAL_FAULT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request_failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request_rejected");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.error_code(),
                message: self.public_message(),
            },
        });

        (status, body).into_response()
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(err.body_text())
        } else {
            ServerError::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(err: MultipartRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("worker task failed: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
