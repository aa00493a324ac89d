//! Anomaly Model - Isolation forest over trust feature vectors
//!
//! Classifies a return as normal (+1) or anomalous (-1). An untrained model
//! is a valid model: it classifies everything as normal.

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::forest::{ForestConfig, IsolationForest};
use crate::logic::features::layout::{feature_name, LayoutMismatch};
use crate::logic::features::{TrustFeatureVector, TRUST_FEATURE_COUNT};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("non-finite value for feature '{feature}'")]
    NonFinite { feature: &'static str },

    #[error("{0}")]
    LayoutMismatch(LayoutMismatch),

    #[error("model file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("model file is not valid: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },
}

impl From<LayoutMismatch> for ModelError {
    fn from(err: LayoutMismatch) -> Self {
        ModelError::LayoutMismatch(err)
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Anomalous,
    Normal,
}

impl Prediction {
    /// -1 for anomalous, +1 for normal
    pub fn as_i8(&self) -> i8 {
        match self {
            Prediction::Anomalous => -1,
            Prediction::Normal => 1,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, Prediction::Anomalous)
    }
}

// ============================================================================
// DETECTOR TRAIT
// ============================================================================

/// Read-only inference seam used by the trust engine
pub trait AnomalyDetector: Send + Sync {
    fn predict(&self, vector: &TrustFeatureVector) -> Result<Prediction, ModelError>;
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyModel {
    pub id: String,
    forest: IsolationForest,
    pub training_samples: usize,
    pub trained_at: Option<DateTime<Utc>>,
}

impl Default for AnomalyModel {
    fn default() -> Self {
        Self::with_config(ForestConfig::default())
    }
}

impl AnomalyModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForestConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            forest: IsolationForest::with_config(config),
            training_samples: 0,
            trained_at: None,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        self.forest.config()
    }

    pub fn is_trained(&self) -> bool {
        self.forest.is_fitted()
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// Fit on historical vectors. Rows with a non-finite feature or a label
    /// score outside [0, 1] are dropped; empty input after that leaves the
    /// model unchanged.
    pub fn train(&mut self, vectors: &[TrustFeatureVector]) {
        let rows: Vec<&TrustFeatureVector> = vectors
            .iter()
            .filter(|v| {
                if v.first_non_finite().is_some() {
                    log::warn!("Skipping non-finite training vector: {}", v.to_log_entry());
                    return false;
                }
                if !(0.0..=1.0).contains(&v.label_match_score()) {
                    log::warn!("Skipping training vector with label score out of range: {}", v.to_log_entry());
                    return false;
                }
                true
            })
            .collect();

        if rows.is_empty() {
            log::debug!("Anomaly model training skipped: no usable samples");
            return;
        }

        let mut data = Array2::<f64>::zeros((rows.len(), TRUST_FEATURE_COUNT));
        for (mut target, vector) in data.rows_mut().into_iter().zip(rows.iter()) {
            for (cell, value) in target.iter_mut().zip(vector.values.iter()) {
                *cell = *value;
            }
        }

        self.forest.fit(&data);
        self.training_samples = rows.len();
        self.trained_at = Some(Utc::now());

        log::info!(
            "Anomaly model trained on {} samples ({} trees, threshold {:?})",
            rows.len(),
            self.forest.n_trees(),
            self.forest.threshold()
        );
    }

    /// Raw anomaly score in (0, 1]; 0.5 for an untrained model
    pub fn score(&self, vector: &TrustFeatureVector) -> Result<f64, ModelError> {
        check_input(vector)?;
        Ok(self.forest.score(ArrayView1::from(&vector.values[..])))
    }
}

impl AnomalyDetector for AnomalyModel {
    fn predict(&self, vector: &TrustFeatureVector) -> Result<Prediction, ModelError> {
        check_input(vector)?;

        if self.forest.is_anomaly(ArrayView1::from(&vector.values[..])) {
            Ok(Prediction::Anomalous)
        } else {
            Ok(Prediction::Normal)
        }
    }
}

fn check_input(vector: &TrustFeatureVector) -> Result<(), ModelError> {
    vector.validate()?;

    if let Some(index) = vector.first_non_finite() {
        return Err(ModelError::NonFinite {
            feature: feature_name(index).unwrap_or("unknown"),
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
