//! Dataset Module - Anomaly model training data
//!
//! Loads historical return records (JSON array or JSONL) and generates
//! synthetic history for bootstrapping a fresh deployment.

pub mod record;
pub mod synthetic;

#[cfg(test)]
mod tests;

pub use record::{load_records, parse_records, parse_timestamp, save_records, DatasetError, TrainingRecord};
pub use synthetic::SyntheticGenerator;

use crate::logic::features::TrustFeatureVector;

/// Feature vectors for a batch of records
pub fn to_vectors(records: &[TrainingRecord]) -> Vec<TrustFeatureVector> {
    records.iter().map(TrainingRecord::to_vector).collect()
}
