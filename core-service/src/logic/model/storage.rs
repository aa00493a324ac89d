//! Model persistence
//!
//! The model is stored as a JSON envelope: layout version + layout hash +
//! SHA-256 of the serialized model payload. A missing file means "no model
//! yet"; anything unreadable is reported as an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::inference::{AnomalyModel, ModelError};
use crate::logic::features::layout::{layout_hash, validate_layout, TRUST_FEATURE_VERSION};

const MODEL_FILE_NAME: &str = "trust_model.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedModel {
    feature_version: u8,
    layout_hash: u32,
    saved_at: DateTime<Utc>,
    checksum: String,
    payload: String,
}

/// Default model path under the platform data dir
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("truetag")
        .join(MODEL_FILE_NAME)
}

fn checksum(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// Save model to disk (write-then-rename)
pub fn save_model(model: &AnomalyModel, path: &Path) -> Result<(), ModelError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let payload = serde_json::to_string(model)?;
    let envelope = PersistedModel {
        feature_version: TRUST_FEATURE_VERSION,
        layout_hash: layout_hash(),
        saved_at: Utc::now(),
        checksum: checksum(&payload),
        payload,
    };

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(&envelope)?)?;
    fs::rename(&tmp, path)?;

    log::info!("Anomaly model {} saved to {}", model.id, path.display());
    Ok(())
}

/// Load model from disk with layout and checksum validation
pub fn load_model(path: &Path) -> Result<AnomalyModel, ModelError> {
    let data = fs::read(path)?;
    let envelope: PersistedModel = serde_json::from_slice(&data)?;

    validate_layout(envelope.feature_version, envelope.layout_hash)?;

    let actual = checksum(&envelope.payload);
    if actual != envelope.checksum {
        return Err(ModelError::Checksum {
            expected: envelope.checksum,
            actual,
        });
    }

    let model: AnomalyModel = serde_json::from_str(&envelope.payload)?;
    log::info!(
        "Anomaly model {} loaded from {} (trained: {})",
        model.id,
        path.display(),
        model.is_trained()
    );
    Ok(model)
}

/// Missing file → default model; present but unreadable → error
pub fn load_or_default(path: &Path) -> Result<AnomalyModel, ModelError> {
    if !path.exists() {
        log::info!("No model at {} - using untrained default", path.display());
        return Ok(AnomalyModel::default());
    }
    load_model(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::TrustFeatureVector;
    use crate::logic::model::AnomalyDetector;

    fn trained_model() -> AnomalyModel {
        let vectors: Vec<_> = (0..60)
            .map(|i| TrustFeatureVector::new(100.0 + i as f64 * 7.0, (i % 2) as u32, 0.8 + (i % 5) as f64 * 0.04))
            .collect();
        let mut model = AnomalyModel::new();
        model.train(&vectors);
        model
    }

    #[test]
    fn test_save_load_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");

        let original = trained_model();
        save_model(&original, &path).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.training_samples, 60);
        assert!(loaded.is_trained());

        let probe = TrustFeatureVector::new(3.0, 4, 0.2);
        assert_eq!(loaded.predict(&probe).unwrap(), original.predict(&probe).unwrap());
        assert_eq!(loaded.score(&probe).unwrap(), original.score(&probe).unwrap());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let model = load_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(!model.is_trained());
    }

    #[test]
    fn test_corrupt_file_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = load_or_default(&path).unwrap_err();
        assert!(matches!(err, ModelError::Serialization(_)));
    }

    #[test]
    fn test_tampered_payload_fails_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_model(&trained_model(), &path).unwrap();

        let mut envelope: PersistedModel = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        envelope.payload = envelope.payload.replacen("\"training_samples\":60", "\"training_samples\":61", 1);
        fs::write(&path, serde_json::to_vec(&envelope).unwrap()).unwrap();

        assert!(matches!(load_model(&path), Err(ModelError::Checksum { .. })));
    }

    #[test]
    fn test_layout_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        save_model(&AnomalyModel::new(), &path).unwrap();

        let mut envelope: PersistedModel = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        envelope.feature_version += 1;
        fs::write(&path, serde_json::to_vec(&envelope).unwrap()).unwrap();

        assert!(matches!(load_model(&path), Err(ModelError::LayoutMismatch(_))));
    }
}
