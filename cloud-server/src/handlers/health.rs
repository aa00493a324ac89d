//! Health check handlers

use axum::Json;
use truetag_core::constants::{APP_NAME, APP_VERSION};

use crate::models::HealthResponse;

fn healthy(timestamp: Option<i64>) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        service: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        timestamp,
    }
}

pub async fn root() -> Json<HealthResponse> {
    Json(healthy(None))
}

pub async fn check() -> Json<HealthResponse> {
    Json(healthy(Some(chrono::Utc::now().timestamp())))
}
