use crate::domain::error::DomainError;
use std::fmt;
use thiserror::Error;

/// Pipeline step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BaseImage,
    Watermark,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::BaseImage => f.write_str("base image"),
            Stage::Watermark => f.write_str("watermark"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Failed to download {stage} from {locator}: {message}")]
    Retrieval {
        stage: Stage,
        locator: String,
        message: String,
    },

    #[error("Watermark URL did not point to a valid image: {locator} (content type: {content_type})")]
    InvalidWatermarkContent { locator: String, content_type: String },

    #[error("Failed to decode {stage}: {message}")]
    Decode { stage: Stage, message: String },

    #[error("Composition failed: {0}")]
    Composition(String),

    #[error("Failed to write output to {target}: {message}")]
    Write { target: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Image not found: {0}")]
    NotFound(String),
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        ApplicationError::Composition(err.to_string())
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

impl ApplicationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::Retrieval { .. } => StatusCode::BAD_GATEWAY,
            ApplicationError::InvalidWatermarkContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationError::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApplicationError::NotFound(_) => StatusCode::NOT_FOUND,
            ApplicationError::Composition(_)
            | ApplicationError::Write { .. }
            | ApplicationError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
