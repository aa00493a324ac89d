//! Label & trust analysis models

use serde::{Deserialize, Serialize};
use truetag_core::logic::label::{MatchResult, Region};
use truetag_core::logic::trust::{RiskLevel, TrustResult};
use validator::Validate;

/// Label rectangle in image pixels
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = 0.0))]
    pub x: f64,
    #[validate(range(min = 0.0))]
    pub y: f64,
    #[validate(range(min = 0.0))]
    pub width: f64,
    #[validate(range(min = 0.0))]
    pub height: f64,
}

impl From<Coordinates> for Region {
    fn from(c: Coordinates) -> Self {
        Region::new(c.x, c.y, c.width, c.height)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnalysisRequest {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    /// Base64 image, optionally a data URL
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,
    #[validate(nested)]
    pub expected_coordinates: Coordinates,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnalysisResponse {
    pub product_id: String,
    pub label_match: bool,
    pub score: f64,
    pub confidence: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LabelAnalysisResponse {
    pub fn new(product_id: String, result: MatchResult) -> Self {
        Self {
            product_id,
            label_match: result.label_match,
            score: result.score,
            confidence: result.confidence,
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: result.error,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrustScoreRequest {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// ISO-8601; naive timestamps are taken as UTC
    #[validate(length(min = 1, message = "activationTime is required"))]
    pub activation_time: String,
    #[validate(range(min = 0, message = "returnAttempts must be non-negative"))]
    pub return_attempts: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub expected_coordinates: Option<Coordinates>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustScoreResponse {
    pub product_id: String,
    pub user_id: String,
    pub trust_score: f64,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub confidence: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrustScoreResponse {
    pub fn new(product_id: String, user_id: String, result: TrustResult) -> Self {
        Self {
            product_id,
            user_id,
            trust_score: result.trust_score,
            risk_level: result.risk_level,
            risk_factors: result.risk_factors,
            confidence: result.confidence,
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: result.error,
        }
    }
}

/// `GET /` and `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}
