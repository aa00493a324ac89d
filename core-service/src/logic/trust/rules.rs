//! Trust Rules & Thresholds
//!
//! Định nghĩa các penalty và ngưỡng risk cho trust scoring.
//! KHÔNG chứa logic scoring - chỉ constants và config.

use serde::{Deserialize, Serialize};

// ============================================================================
// TIMING RULES
// ============================================================================

/// Returns earlier than this (hours after activation) are "very quick"
pub const QUICK_RETURN_HOURS: f64 = 24.0;

/// Multiplier for a very quick return
pub const QUICK_RETURN_PENALTY: f64 = 0.7;

/// Returns later than this (30 days) are "late"
pub const LATE_RETURN_HOURS: f64 = 720.0;

/// Multiplier for a late return
pub const LATE_RETURN_PENALTY: f64 = 0.9;

// ============================================================================
// BEHAVIOR & LABEL RULES
// ============================================================================

/// Multiplier when the customer has returned before
pub const RETURN_ATTEMPTS_PENALTY: f64 = 0.8;

/// Label match scores below this fail verification
pub const LABEL_SCORE_MIN: f64 = 0.7;

/// Multiplier for a failed label verification
pub const LABEL_FAILED_PENALTY: f64 = 0.6;

// ============================================================================
// RISK LEVELS
// ============================================================================

/// Below this trust score = high risk
pub const HIGH_RISK_BELOW: f64 = 0.5;

/// Below this trust score = medium risk, at or above = low
pub const MEDIUM_RISK_BELOW: f64 = 0.8;

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Label scores above this give high confidence
pub const CONFIDENT_LABEL_SCORE: f64 = 0.8;

pub const HIGH_CONFIDENCE: f64 = 0.8;
pub const LOW_CONFIDENCE: f64 = 0.6;

// ============================================================================
// CONFIGURABLE RULES (for runtime adjustment)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustRules {
    pub quick_return_hours: f64,
    pub quick_return_penalty: f64,
    pub late_return_hours: f64,
    pub late_return_penalty: f64,
    pub return_attempts_penalty: f64,
    pub label_score_min: f64,
    pub label_failed_penalty: f64,
    pub high_risk_below: f64,
    pub medium_risk_below: f64,
    pub confident_label_score: f64,
}

impl Default for TrustRules {
    fn default() -> Self {
        Self {
            quick_return_hours: QUICK_RETURN_HOURS,
            quick_return_penalty: QUICK_RETURN_PENALTY,
            late_return_hours: LATE_RETURN_HOURS,
            late_return_penalty: LATE_RETURN_PENALTY,
            return_attempts_penalty: RETURN_ATTEMPTS_PENALTY,
            label_score_min: LABEL_SCORE_MIN,
            label_failed_penalty: LABEL_FAILED_PENALTY,
            high_risk_below: HIGH_RISK_BELOW,
            medium_risk_below: MEDIUM_RISK_BELOW,
            confident_label_score: CONFIDENT_LABEL_SCORE,
        }
    }
}
