//! Model Handle - shared, copy-on-train access to the anomaly model
//!
//! Readers clone the current snapshot `Arc` and release the lock before
//! running inference. Training fits a fresh model off-lock and swaps it in,
//! so no reader ever observes a partially trained model.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::inference::{AnomalyDetector, AnomalyModel, ModelError, Prediction};
use super::storage;
use crate::logic::features::TrustFeatureVector;

/// Model status for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_id: String,
    pub trained: bool,
    pub training_samples: usize,
    pub trained_at: Option<DateTime<Utc>>,
    pub n_trees: usize,
    pub contamination: f64,
    pub inference_count: u64,
    pub anomaly_count: u64,
}

#[derive(Debug, Clone)]
pub struct ModelHandle {
    current: Arc<RwLock<Arc<AnomalyModel>>>,
    /// Serializes training runs against each other (not against readers)
    train_lock: Arc<Mutex<()>>,
    inference_count: Arc<AtomicU64>,
    anomaly_count: Arc<AtomicU64>,
}

impl ModelHandle {
    pub fn new(model: AnomalyModel) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(model))),
            train_lock: Arc::new(Mutex::new(())),
            inference_count: Arc::new(AtomicU64::new(0)),
            anomaly_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current model snapshot
    pub fn snapshot(&self) -> Arc<AnomalyModel> {
        self.current.read().clone()
    }

    /// Swap in a new model
    pub fn replace(&self, model: AnomalyModel) {
        *self.current.write() = Arc::new(model);
    }

    /// Train a new snapshot with the current config and swap it in.
    ///
    /// Returns false (and keeps the current model) when no usable samples
    /// were given.
    pub fn train(&self, vectors: &[TrustFeatureVector]) -> bool {
        let _guard = self.train_lock.lock();

        let config = self.snapshot().config().clone();
        let mut next = AnomalyModel::with_config(config);
        next.train(vectors);

        if !next.is_trained() {
            return false;
        }

        self.replace(next);
        true
    }

    pub fn persist(&self, path: &Path) -> Result<(), ModelError> {
        storage::save_model(&self.snapshot(), path)
    }

    pub fn status(&self) -> ModelStatus {
        let model = self.snapshot();
        ModelStatus {
            model_id: model.id.clone(),
            trained: model.is_trained(),
            training_samples: model.training_samples,
            trained_at: model.trained_at,
            n_trees: model.n_trees(),
            contamination: model.config().contamination,
            inference_count: self.inference_count.load(Ordering::Relaxed),
            anomaly_count: self.anomaly_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new(AnomalyModel::default())
    }
}

impl AnomalyDetector for ModelHandle {
    fn predict(&self, vector: &TrustFeatureVector) -> Result<Prediction, ModelError> {
        let prediction = self.snapshot().predict(vector)?;

        self.inference_count.fetch_add(1, Ordering::Relaxed);
        if prediction.is_anomaly() {
            self.anomaly_count.fetch_add(1, Ordering::Relaxed);
        }

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<TrustFeatureVector> {
        (0..100)
            .map(|i| TrustFeatureVector::new(150.0 + (i % 20) as f64 * 25.0, (i % 2) as u32, 0.8 + (i % 5) as f64 * 0.05))
            .collect()
    }

    #[test]
    fn test_train_swaps_snapshot() {
        let handle = ModelHandle::default();
        let before = handle.snapshot();

        assert!(handle.train(&history()));

        let after = handle.snapshot();
        assert!(!before.is_trained());
        assert!(after.is_trained());
        assert_ne!(before.id, after.id);
    }

    #[test]
    fn test_empty_train_keeps_snapshot() {
        let handle = ModelHandle::default();
        let before = handle.snapshot();

        assert!(!handle.train(&[]));
        assert!(Arc::ptr_eq(&before, &handle.snapshot()));
    }

    #[test]
    fn test_status_counts_inference() {
        let handle = ModelHandle::default();
        handle.predict(&TrustFeatureVector::new(10.0, 0, 1.0)).unwrap();
        handle.predict(&TrustFeatureVector::new(20.0, 1, 0.9)).unwrap();

        let status = handle.status();
        assert_eq!(status.inference_count, 2);
        assert_eq!(status.anomaly_count, 0);
        assert!(!status.trained);
        assert_eq!(status.contamination, 0.1);
    }

    #[test]
    fn test_concurrent_readers_during_training() {
        let handle = ModelHandle::default();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let h = handle.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        h.predict(&TrustFeatureVector::new(300.0, 0, 0.9)).unwrap();
                    }
                })
            })
            .collect();

        assert!(handle.train(&history()));

        for r in readers {
            r.join().unwrap();
        }
        assert_eq!(handle.status().inference_count, 800);
    }

    #[test]
    fn test_persist_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let handle = ModelHandle::default();
        handle.train(&history());
        handle.persist(&path).unwrap();

        let loaded = storage::load_model(&path).unwrap();
        assert_eq!(loaded.id, handle.snapshot().id);
    }
}
