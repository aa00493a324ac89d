//! Trust Feature Vector - ML input for the anomaly model
//!
//! Versioned like every other feature payload: the layout version and hash
//! travel with the values so training data and persisted models can be
//! checked against the running engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::layout::{
    layout_hash, validate_layout, LayoutMismatch, HOURS_SINCE_ACTIVATION, LABEL_MATCH_SCORE,
    RETURN_ATTEMPTS, TRUST_FEATURE_COUNT, TRUST_FEATURE_LAYOUT, TRUST_FEATURE_VERSION,
};

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustFeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Values in `TRUST_FEATURE_LAYOUT` order
    pub values: [f64; TRUST_FEATURE_COUNT],
}

impl TrustFeatureVector {
    pub fn from_values(values: [f64; TRUST_FEATURE_COUNT]) -> Self {
        Self {
            version: TRUST_FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn new(hours_since_activation: f64, return_attempts: u32, label_match_score: f64) -> Self {
        Self::from_values([
            hours_since_activation,
            f64::from(return_attempts),
            label_match_score,
        ])
    }

    pub fn hours_since_activation(&self) -> f64 {
        self.values[HOURS_SINCE_ACTIVATION]
    }

    pub fn return_attempts(&self) -> f64 {
        self.values[RETURN_ATTEMPTS]
    }

    pub fn label_match_score(&self) -> f64 {
        self.values[LABEL_MATCH_SCORE]
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).map(|i| self.values[i])
    }

    /// Index of the first NaN/infinite feature, if any
    pub fn first_non_finite(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_finite())
    }

    pub fn validate(&self) -> Result<(), LayoutMismatch> {
        validate_layout(self.version, self.layout_hash)
    }

    /// JSON form with named values, for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": TRUST_FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<[f64; TRUST_FEATURE_COUNT]> for TrustFeatureVector {
    fn from(values: [f64; TRUST_FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Build the trust feature vector from raw return signals.
///
/// Pure and deterministic. Temporal ordering is not validated: a return that
/// precedes activation yields negative hours and is passed through as-is.
pub fn extract_features(
    activation_time: DateTime<Utc>,
    return_timestamp: DateTime<Utc>,
    return_attempts: u32,
    label_match_score: f64,
) -> TrustFeatureVector {
    let elapsed = return_timestamp.signed_duration_since(activation_time);
    let hours = elapsed.num_milliseconds() as f64 / 1000.0 / 3600.0;

    TrustFeatureVector::new(hours, return_attempts, label_match_score)
}

// ============================================================================
// TESTS
// ============================================================================
