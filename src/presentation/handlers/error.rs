use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::ProviderErrorKind;
use crate::application::services::PipelineError;
use crate::domain::ValidationError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error surface of the HTTP handlers, rendered as `{ "error": ... }`.
#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    Multipart(MultipartError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Pipeline(PipelineError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Provider(e)) => match e.kind {
                ProviderErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                ProviderErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ProviderErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Pipeline(PipelineError::Resource(_) | PipelineError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Multipart(e) => e.status(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Pipeline(PipelineError::Validation(e)) => e.to_string(),
            ApiError::Pipeline(e @ PipelineError::Provider(_)) => e.to_string(),
            ApiError::Pipeline(PipelineError::Resource(_)) => {
                "Transcription failed: scratch storage unavailable".to_string()
            }
            ApiError::Pipeline(PipelineError::Internal(_)) => {
                "Transcription failed: internal error".to_string()
            }
            ApiError::Multipart(e) => format!("Failed to read multipart: {}", e.body_text()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError::Pipeline(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Pipeline(e.into())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Request failed");
        } else {
            tracing::warn!(status = %status, error = ?self, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
