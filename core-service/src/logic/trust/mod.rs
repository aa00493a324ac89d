//! Trust Module
//!
//! Chấm điểm độ tin cậy của yêu cầu hoàn trả dựa trên anomaly model
//! và các business rules. Uncertainty luôn được coi là high risk.
//!
//! ## Structure
//! - `types`: RiskLevel, TrustResult, TrustError, risk factor names
//! - `rules`: Penalties and thresholds
//! - `scorer`: Scoring logic
//!
//! ## Usage
//! ```ignore
//! use truetag_core::logic::trust::{TrustScorer, RiskLevel};
//!
//! let scorer = TrustScorer::new(model_handle.clone());
//! let result = scorer.score(activation_time, Utc::now(), attempts, label_score);
//! if result.risk_level == RiskLevel::High {
//!     println!("Manual review: {:?}", result.risk_factors);
//! }
//! ```

pub mod rules;
pub mod scorer;
pub mod types;

pub use rules::TrustRules;
pub use scorer::TrustScorer;
pub use types::{RiskLevel, TrustError, TrustResult};
