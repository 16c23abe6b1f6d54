//! Error types for the shrink server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shrink_core::ErrorResponse;
use thiserror::Error;
use tracing::{debug, error};

/// Message returned for every processing failure
pub const GENERIC_FAILURE: &str = "Error compressing PDF";

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("No PDF data provided")]
    MissingPayload,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body too large")]
    PayloadTooLarge,

    /// Detail is logged, never sent
    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Rewrite timeout after {0}ms")]
    Timeout(u64),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ServerError::PayloadTooLarge;
        }
        debug!("Rejected request body: {}", rejection.body_text());
        ServerError::InvalidRequest("Request body must be a JSON object".into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::MissingPayload => (
                StatusCode::BAD_REQUEST,
                "MISSING_PAYLOAD",
                self.to_string(),
            ),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                self.to_string(),
            ),
            ServerError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            ServerError::Processing(_) | ServerError::Timeout(_) => {
                error!("PDF compression error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    GENERIC_FAILURE.to_string(),
                )
            }
        };

        let body = ErrorResponse {
            message,
            code: Some(code.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
