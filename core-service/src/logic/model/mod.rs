//! Model Module - Anomaly detection for return trust scoring
//!
//! Isolation forest, persistence and the shared copy-on-train handle.

pub mod forest;
pub mod handle;
pub mod inference;
pub mod storage;

// Re-export common types
pub use forest::{ForestConfig, IsolationForest};
pub use handle::{ModelHandle, ModelStatus};
pub use inference::{AnomalyDetector, AnomalyModel, ModelError, Prediction};
pub use storage::{default_model_path, load_model, load_or_default, save_model};
