//! Configuration module

use std::env;
use std::path::PathBuf;

use truetag_core::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Persisted anomaly model file
    pub model_path: PathBuf,

    /// Optional product id → label region file
    pub registry_path: Option<PathBuf>,

    /// Synthetic samples to bootstrap an untrained model with (0 = off)
    pub synthetic_samples: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: constants::get_service_port(),
            model_path: constants::get_model_path(),
            registry_path: constants::get_registry_path(),
            synthetic_samples: constants::get_synthetic_samples(),
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
