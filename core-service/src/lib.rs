//! TrueTag AI Core
//!
//! Label authenticity matching and return trust scoring.
//!
//! ```text
//! image + region ──► label::LabelAnalyzer ──► MatchResult.score
//!                                                  │
//! activation/return/attempts ──► features ──► model ──► trust::TrustScorer ──► TrustResult
//! ```

pub mod constants;
pub mod logic;

pub use logic::label::{LabelAnalyzer, MatchResult, Region};
pub use logic::model::{AnomalyModel, ModelHandle};
pub use logic::registry::{LabelCoordinateSource, StaticRegistry};
pub use logic::trust::{RiskLevel, TrustResult, TrustScorer};
