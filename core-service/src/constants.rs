//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name (reported by the health endpoints)
pub const APP_NAME: &str = "TrueTag AI";

/// Default HTTP port of the AI service
pub const DEFAULT_PORT: u16 = 8000;

/// Synthetic bootstrap samples (0 = disabled)
pub const DEFAULT_SYNTHETIC_SAMPLES: usize = 0;

/// Seed for synthetic bootstrap data
pub const SYNTHETIC_SEED: u64 = 42;

/// Photo size (px) assumed for synthetic label positions
pub const SYNTHETIC_IMAGE_SIZE: u32 = 1000;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get service port from environment or use default
pub fn get_service_port() -> u16 {
    std::env::var("AI_SERVICE_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get model file path from environment or use the per-user data dir
pub fn get_model_path() -> PathBuf {
    std::env::var("TRUST_MODEL_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(crate::logic::model::default_model_path)
}

/// Get label registry file path, if configured
pub fn get_registry_path() -> Option<PathBuf> {
    std::env::var("LABEL_REGISTRY_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Get synthetic bootstrap sample count from environment or use default
pub fn get_synthetic_samples() -> usize {
    std::env::var("TRUST_SYNTHETIC_SAMPLES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SYNTHETIC_SAMPLES)
}
