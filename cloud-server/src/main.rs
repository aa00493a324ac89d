//! TrueTag AI Service
//!
//! HTTP front-end for label verification and return trust scoring.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TRUETAG AI SERVICE                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  API      │  │ Label         │  │  Trust Scorer       │ │
//! │  │  (Axum)   │─▶│ Analyzer      │─▶│  (rules + model)    │ │
//! │  └───────────┘  └───────────────┘  └──────────┬──────────┘ │
//! │                                               ▼            │
//! │                                     ┌──────────────────┐   │
//! │                                     │ ModelHandle      │   │
//! │                                     │ (copy-on-train)  │   │
//! │                                     └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod extract;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use truetag_core::constants::{APP_NAME, APP_VERSION, SYNTHETIC_IMAGE_SIZE, SYNTHETIC_SEED};
use truetag_core::logic::dataset::{self, SyntheticGenerator};
use truetag_core::logic::label::LabelAnalyzer;
use truetag_core::logic::model::{self, AnomalyModel, ModelHandle};
use truetag_core::logic::registry::{LabelCoordinateSource, StaticRegistry};
use truetag_core::logic::trust::TrustScorer;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (core `log` records are bridged into tracing)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "truetag_ai=debug,truetag_core=info,tower_http=debug".into());
    let (json_layer, text_layer) = if config.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("{} v{} starting ({})", APP_NAME, APP_VERSION, config.environment);
    tracing::info!("Model file: {}", config.model_path.display());

    // Build application state
    let state = AppState {
        model: init_model(&config),
        analyzer: LabelAnalyzer::new(),
        registry: init_registry(&config)?,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Load the persisted model; fall back to a fresh one (optionally trained
/// on synthetic history) when the file is missing or unusable.
fn init_model(config: &config::Config) -> ModelHandle {
    let model = match model::load_or_default(&config.model_path) {
        Ok(model) => model,
        Err(e) => {
            tracing::warn!("Model file unusable ({}), starting with an untrained model", e);
            AnomalyModel::default()
        }
    };

    if model.is_trained() {
        tracing::info!(
            "Loaded anomaly model {} ({} samples)",
            model.id,
            model.training_samples
        );
    }

    let handle = ModelHandle::new(model);

    if !handle.snapshot().is_trained() && config.synthetic_samples > 0 {
        let records = SyntheticGenerator::new(config.synthetic_samples)
            .with_seed(SYNTHETIC_SEED)
            .generate_returns(chrono::Utc::now());

        if handle.train(&dataset::to_vectors(&records)) {
            tracing::info!("Bootstrapped anomaly model on {} synthetic returns", records.len());
        }
    }

    handle
}

fn init_registry(config: &config::Config) -> anyhow::Result<Arc<dyn LabelCoordinateSource>> {
    let registry = match &config.registry_path {
        Some(path) => StaticRegistry::from_file(path)
            .with_context(|| format!("failed to load label registry {}", path.display()))?,
        None if config.synthetic_samples > 0 => {
            let positions = SyntheticGenerator::new(config.synthetic_samples)
                .with_seed(SYNTHETIC_SEED)
                .generate_label_positions(SYNTHETIC_IMAGE_SIZE, SYNTHETIC_IMAGE_SIZE);
            tracing::info!("Seeded label registry with {} synthetic positions", positions.len());
            StaticRegistry::from_entries(positions)
        }
        None => {
            tracing::info!("No label registry configured; trust requests need expectedCoordinates");
            StaticRegistry::new()
        }
    };

    Ok(Arc::new(registry))
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: ModelHandle,
    pub analyzer: LabelAnalyzer,
    pub registry: Arc<dyn LabelCoordinateSource>,
    pub config: config::Config,
}

impl AppState {
    /// Trust scorer over the shared model handle
    pub fn scorer(&self) -> TrustScorer {
        TrustScorer::new(self.model.clone())
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check));

    let analysis_routes = Router::new()
        .route("/analyze/label", post(handlers::analysis::label))
        .route("/analyze/trust", post(handlers::analysis::trust));

    let model_routes = Router::new()
        .route("/model/status", get(handlers::model::status))
        .route("/model/train", post(handlers::model::train));

    // Combine all routes
    Router::new()
        .merge(health_routes)
        .merge(analysis_routes)
        .merge(model_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
