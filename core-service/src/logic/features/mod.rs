//! Features Module - Trust Feature Extraction
//!
//! Converts raw return signals into the fixed-length vector consumed by the
//! anomaly model.

pub mod layout;
pub mod vector;

pub use layout::{feature_name, layout_hash, TRUST_FEATURE_COUNT, TRUST_FEATURE_VERSION};
pub use vector::{extract_features, TrustFeatureVector};
