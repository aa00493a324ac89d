//! Label & trust analysis handlers

use axum::{extract::State, Json};
use chrono::Utc;
use truetag_core::logic::dataset::parse_timestamp;
use truetag_core::logic::label::Region;

use crate::extract::ValidatedJson;
use crate::models::{LabelAnalysisRequest, LabelAnalysisResponse, TrustScoreRequest, TrustScoreResponse};
use crate::{AppError, AppResult, AppState};

/// Label score when the return comes without a photo
const NO_IMAGE_LABEL_SCORE: f64 = 1.0;

/// Compare the label region against its surroundings
pub async fn label(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LabelAnalysisRequest>,
) -> AppResult<Json<LabelAnalysisResponse>> {
    let region = Region::from(req.expected_coordinates);
    let result = run_label_analysis(&state, req.image, region).await?;

    tracing::info!(
        product_id = %req.product_id,
        label_match = result.label_match,
        score = result.score,
        "Label analyzed"
    );

    Ok(Json(LabelAnalysisResponse::new(req.product_id, result)))
}

/// Trust score for a return request; the return happens "now"
pub async fn trust(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TrustScoreRequest>,
) -> AppResult<Json<TrustScoreResponse>> {
    let activation_time = parse_timestamp(&req.activation_time)
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;
    let return_attempts = u32::try_from(req.return_attempts)
        .map_err(|_| AppError::InvalidRequest("returnAttempts is out of range".to_string()))?;

    let label_match_score = match req.image.filter(|image| !image.is_empty()) {
        Some(image) => {
            // Request coordinates win over the registry; unknown products get an empty region
            let region = req
                .expected_coordinates
                .map(Region::from)
                .or_else(|| state.registry.coordinates_for(&req.product_id))
                .unwrap_or_default();

            run_label_analysis(&state, image, region).await?.score
        }
        None => NO_IMAGE_LABEL_SCORE,
    };

    let result = state
        .scorer()
        .score(activation_time, Utc::now(), return_attempts, label_match_score);

    tracing::info!(
        product_id = %req.product_id,
        user_id = %req.user_id,
        trust_score = result.trust_score,
        risk_level = %result.risk_level,
        "Return scored"
    );

    Ok(Json(TrustScoreResponse::new(req.product_id, req.user_id, result)))
}

/// Image work runs off the async executor
async fn run_label_analysis(
    state: &AppState,
    image: String,
    region: Region,
) -> AppResult<truetag_core::MatchResult> {
    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&image, &region)).await?;
    Ok(result)
}
