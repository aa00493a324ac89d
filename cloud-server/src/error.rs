//! Error handling
//!
//! Every failure is reported as HTTP 400 with `{error, status}`; client
//! and internal errors are not distinguished on the wire.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use truetag_core::logic::dataset::DatasetError;
use truetag_core::logic::model::ModelError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    InvalidRequest(String),

    #[error("validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    // Engine errors
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;

        match &self {
            AppError::InvalidRequest(_) | AppError::ValidationError(_) => {
                tracing::debug!("Rejected request: {}", self);
            }
            _ => tracing::error!("Request failed: {}", self),
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("worker task failed: {}", err))
    }
}
