//! Error handling

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;

/// definitions for the thumbforge application.
#[derive(Debug)]
pub enum ThumbforgeError {
    /// When you didn't do the right thing
    BadRequest(String),
    /// No content generation backend is configured
    ContentUnavailable,
    /// The content generation backend failed or answered with garbage
    ContentGeneration(String),
    /// Image decoding or encoding failed
    Image(image::ImageError),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for ThumbforgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "Bad request: {message}"),
            Self::ContentUnavailable => write!(f, "Content generation is not configured"),
            Self::ContentGeneration(message) => write!(f, "Content generation failed: {message}"),
            Self::Image(err) => write!(f, "Image processing failed: {err}"),
            Self::InternalServerError(message) => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ThumbforgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            _ => None,
        }
    }
}

impl From<image::ImageError> for ThumbforgeError {
    fn from(err: image::ImageError) -> Self {
        ThumbforgeError::Image(err)
    }
}

impl From<std::io::Error> for ThumbforgeError {
    fn from(err: std::io::Error) -> Self {
        ThumbforgeError::InternalServerError(err.to_string())
    }
}

impl From<reqwest::Error> for ThumbforgeError {
    fn from(err: reqwest::Error) -> Self {
        ThumbforgeError::ContentGeneration(err.to_string())
    }
}

impl From<serde_json::Error> for ThumbforgeError {
    fn from(err: serde_json::Error) -> Self {
        ThumbforgeError::ContentGeneration(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ThumbforgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        ThumbforgeError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for ThumbforgeError {
    fn from(err: axum::http::Error) -> Self {
        ThumbforgeError::InternalServerError(err.to_string())
    }
}

impl From<JsonRejection> for ThumbforgeError {
    fn from(rejection: JsonRejection) -> Self {
        ThumbforgeError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ThumbforgeError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ThumbforgeError::BadRequest(message) => {
                info!("Bad request received: {message}");
                (StatusCode::BAD_REQUEST, message)
            }
            ThumbforgeError::ContentUnavailable => {
                info!("Content request without a configured backend");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Content generation is not configured".to_string(),
                )
            }
            ThumbforgeError::ContentGeneration(message) => {
                tracing::error!("Content generation error: {}", message);
                (StatusCode::BAD_GATEWAY, message)
            }
            ThumbforgeError::Image(err) => {
                tracing::error!("Image error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Thumbnail could not be created".to_string(),
                )
            }
            ThumbforgeError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
