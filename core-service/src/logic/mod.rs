//! Logic Module - Label verification & return trust engines
//!
//! - `label/` - Label vs. surroundings image matching
//! - `features/` - Trust feature extraction (versioned layout)
//! - `model/` - Isolation forest anomaly model, persistence, shared handle
//! - `trust/` - Rule-based trust scoring on top of the model
//! - `dataset/` - Training records and synthetic history
//! - `registry` - Expected label coordinates per product

pub mod dataset;
pub mod features;
pub mod label;
pub mod model;
pub mod registry;
pub mod trust;
