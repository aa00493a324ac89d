//! Anomaly model management handlers

use axum::{extract::State, Json};
use truetag_core::logic::dataset;
use truetag_core::logic::model::ModelStatus;

use crate::extract::ValidatedJson;
use crate::models::{TrainRequest, TrainResponse};
use crate::{AppError, AppResult, AppState};

pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.model.status())
}

/// Train a new model snapshot and swap it in; optionally persist it
pub async fn train(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TrainRequest>,
) -> AppResult<Json<TrainResponse>> {
    let vectors = dataset::to_vectors(&req.records);
    let model = state.model.clone();
    let path = state.config.model_path.clone();
    let persist = req.persist;

    let trained = tokio::task::spawn_blocking(move || -> AppResult<bool> {
        if !model.train(&vectors) {
            return Ok(false);
        }
        if persist {
            model.persist(&path)?;
        }
        Ok(true)
    })
    .await??;

    if !trained {
        return Err(AppError::InvalidRequest("no usable training records".to_string()));
    }

    let status = state.model.status();
    tracing::info!(
        model_id = %status.model_id,
        samples = status.training_samples,
        persisted = persist,
        "Anomaly model retrained"
    );

    Ok(Json(TrainResponse { persisted: persist, status }))
}
