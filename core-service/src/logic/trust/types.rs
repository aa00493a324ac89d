//! Trust Types
//!
//! Core types cho trust scoring.
//! KHÔNG chứa logic - chỉ data structures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::model::ModelError;

// ============================================================================
// RISK FACTORS
// ============================================================================

pub const FACTOR_QUICK_RETURN: &str = "Very quick return";
pub const FACTOR_LATE_RETURN: &str = "Late return";
pub const FACTOR_MULTIPLE_ATTEMPTS: &str = "Multiple return attempts";
pub const FACTOR_LABEL_FAILED: &str = "Label verification failed";
pub const FACTOR_CALCULATION_ERROR: &str = "Error in trust calculation";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum TrustError {
    #[error("anomaly model failed: {0}")]
    Model(#[from] ModelError),
}

// ============================================================================
// RISK LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Xử lý hoàn trả bình thường
    Low,
    /// Cần kiểm tra thủ công
    Medium,
    /// Từ chối hoặc điều tra
    High,
}

impl RiskLevel {
    /// `score < high_below` → High, `< medium_below` → Medium, else Low
    pub fn from_score(score: f64, high_below: f64, medium_below: f64) -> Self {
        if score < high_below {
            RiskLevel::High
        } else if score < medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// TRUST RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustResult {
    /// 0.0 (untrusted) - 1.0 (fully trusted)
    pub trust_score: f64,
    pub risk_level: RiskLevel,
    /// Rule reasons, in rule order
    pub risk_factors: Vec<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrustResult {
    /// Fail-safe result: an unscorable return is always high risk
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            trust_score: 0.0,
            risk_level: RiskLevel::High,
            risk_factors: vec![FACTOR_CALCULATION_ERROR.to_string()],
            confidence: 0.0,
            error: Some(reason.into()),
        }
    }
}
