//! Model management models

use serde::{Deserialize, Serialize};
use truetag_core::logic::dataset::TrainingRecord;
use truetag_core::logic::model::ModelStatus;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TrainRequest {
    #[validate(length(min = 1, message = "at least one training record is required"))]
    pub records: Vec<TrainingRecord>,
    /// Write the new model to the configured model path
    #[serde(default)]
    pub persist: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResponse {
    pub persisted: bool,
    #[serde(flatten)]
    pub status: ModelStatus,
}
