//! Training Records
//!
//! Historical return records used to fit the anomaly model. Files are
//! either a JSON array or JSONL (one record per line).

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::logic::features::{extract_features, TrustFeatureVector};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid record on line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid timestamp '{0}': expected ISO-8601")]
    Timestamp(String),
}

// ============================================================================
// RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(default, alias = "productId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub activation_time: DateTime<Utc>,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub return_timestamp: DateTime<Utc>,

    pub return_attempts: u32,

    #[serde(default = "default_label_score")]
    pub label_match_score: f64,

    /// Ground truth when known (synthetic data); unused for fitting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_legitimate: Option<bool>,
}

fn default_label_score() -> f64 {
    1.0
}

impl TrainingRecord {
    pub fn new(
        activation_time: DateTime<Utc>,
        return_timestamp: DateTime<Utc>,
        return_attempts: u32,
        label_match_score: f64,
    ) -> Self {
        Self {
            product_id: None,
            activation_time,
            return_timestamp,
            return_attempts,
            label_match_score,
            is_legitimate: None,
        }
    }

    pub fn to_vector(&self) -> TrustFeatureVector {
        extract_features(
            self.activation_time,
            self.return_timestamp,
            self.return_attempts,
            self.label_match_score,
        )
    }
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// RFC 3339, or naive ISO-8601 interpreted as UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatasetError> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|_| DatasetError::Timestamp(value.to_string()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

// ============================================================================
// FILES
// ============================================================================

/// Load records from a JSON array or JSONL file
pub fn load_records(path: &Path) -> Result<Vec<TrainingRecord>, DatasetError> {
    let content = fs::read_to_string(path)?;
    let records = parse_records(&content)?;
    log::info!("Loaded {} training records from {:?}", records.len(), path);
    Ok(records)
}

pub fn parse_records(content: &str) -> Result<Vec<TrainingRecord>, DatasetError> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| DatasetError::Record { line: idx + 1, source })
        })
        .collect()
}

/// Write records as a pretty JSON array, creating parent directories
pub fn save_records(records: &[TrainingRecord], path: &Path) -> Result<(), DatasetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush()?;

    log::info!("Saved {} training records to {:?}", records.len(), path);
    Ok(())
}
