//! Error types for the server

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::AgriError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Inference timed out after {0} seconds")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AgriError> for ServerError {
    fn from(err: AgriError) -> Self {
        match err {
            AgriError::InvalidImage(msg) => ServerError::InvalidImage(msg),
            AgriError::Validation(msg) => ServerError::Validation(msg),
            AgriError::Inference(msg) => ServerError::Inference(msg),
            AgriError::InferenceTimeout(secs) => ServerError::Timeout(secs),
            AgriError::Configuration(msg) => ServerError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::Validation(rejection.body_text())
        }
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(rejection: MultipartRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(err.body_text())
        } else {
            ServerError::Validation(err.body_text())
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::InvalidImage(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid image: {msg}"))
            }
            ServerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            ServerError::Inference(msg) => {
                tracing::error!(detail = %msg, "Inference error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Classification failed. Check server logs for details.".to_string(),
                )
            }
            ServerError::Timeout(secs) => {
                tracing::error!(timeout_secs = secs, "Inference timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Classification timed out".to_string(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_status() {
        let cases = [
            (AgriError::InvalidImage("x".into()), StatusCode::BAD_REQUEST),
            (AgriError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AgriError::Inference("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AgriError::InferenceTimeout(3), StatusCode::GATEWAY_TIMEOUT),
            (AgriError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let response = ServerError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
