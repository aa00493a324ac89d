//! Trust Scorer
//!
//! CHỈ chứa logic scoring: model prediction + rule penalties.
//! Input: activation time, return time, return attempts, label match score
//! Output: TrustResult

use chrono::{DateTime, Utc};

use super::rules::{TrustRules, HIGH_CONFIDENCE, LOW_CONFIDENCE};
use super::types::{
    RiskLevel, TrustError, TrustResult, FACTOR_LABEL_FAILED, FACTOR_LATE_RETURN,
    FACTOR_MULTIPLE_ATTEMPTS, FACTOR_QUICK_RETURN,
};
use crate::logic::features::{extract_features, TrustFeatureVector};
use crate::logic::label::types::clamp_unit;
use crate::logic::model::{AnomalyDetector, ModelHandle};

/// Combines the anomaly model with business rules.
///
/// The detector is injected by the caller; the scorer never owns model
/// lifecycle.
#[derive(Debug, Clone)]
pub struct TrustScorer<D: AnomalyDetector = ModelHandle> {
    detector: D,
    rules: TrustRules,
}

impl<D: AnomalyDetector> TrustScorer<D> {
    pub fn new(detector: D) -> Self {
        Self::with_rules(detector, TrustRules::default())
    }

    pub fn with_rules(detector: D, rules: TrustRules) -> Self {
        Self { detector, rules }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn rules(&self) -> &TrustRules {
        &self.rules
    }

    /// Score a return. Model failures are returned to the caller.
    pub fn try_score(
        &self,
        activation_time: DateTime<Utc>,
        return_timestamp: DateTime<Utc>,
        return_attempts: u32,
        label_match_score: f64,
    ) -> Result<TrustResult, TrustError> {
        let features = extract_features(activation_time, return_timestamp, return_attempts, label_match_score);
        self.try_score_features(&features)
    }

    /// Never fails: any error becomes the high-risk fail-safe result
    pub fn score(
        &self,
        activation_time: DateTime<Utc>,
        return_timestamp: DateTime<Utc>,
        return_attempts: u32,
        label_match_score: f64,
    ) -> TrustResult {
        match self.try_score(activation_time, return_timestamp, return_attempts, label_match_score) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Trust calculation failed: {}", e);
                TrustResult::failed(e.to_string())
            }
        }
    }

    /// Apply prediction and rules to an already extracted vector
    pub fn try_score_features(&self, features: &TrustFeatureVector) -> Result<TrustResult, TrustError> {
        let prediction = self.detector.predict(features)?;
        let rules = &self.rules;
        let mut risk_factors = Vec::new();

        // -1 → 0.0, +1 → 1.0
        let mut score = f64::from(prediction.as_i8() + 1) / 2.0;

        let hours = features.hours_since_activation();
        if hours < rules.quick_return_hours {
            score *= rules.quick_return_penalty;
            risk_factors.push(FACTOR_QUICK_RETURN.to_string());
        } else if hours > rules.late_return_hours {
            score *= rules.late_return_penalty;
            risk_factors.push(FACTOR_LATE_RETURN.to_string());
        }

        if features.return_attempts() > 0.0 {
            score *= rules.return_attempts_penalty;
            risk_factors.push(FACTOR_MULTIPLE_ATTEMPTS.to_string());
        }

        let label_score = features.label_match_score();
        if label_score < rules.label_score_min {
            score *= rules.label_failed_penalty;
            risk_factors.push(FACTOR_LABEL_FAILED.to_string());
        }

        let trust_score = clamp_unit(score);
        let risk_level = RiskLevel::from_score(trust_score, rules.high_risk_below, rules.medium_risk_below);
        let confidence = if label_score > rules.confident_label_score {
            HIGH_CONFIDENCE
        } else {
            LOW_CONFIDENCE
        };

        log::debug!(
            "Trust score {:.3} ({}) for {} [{:?}]",
            trust_score,
            risk_level,
            features.to_log_entry(),
            prediction
        );

        Ok(TrustResult {
            trust_score,
            risk_level,
            risk_factors,
            confidence,
            error: None,
        })
    }
}

impl Default for TrustScorer<ModelHandle> {
    fn default() -> Self {
        Self::new(ModelHandle::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{ModelError, Prediction};
    use crate::logic::trust::types::FACTOR_CALCULATION_ERROR;
    use chrono::Duration;

    struct Fixed(Prediction);

    impl AnomalyDetector for Fixed {
        fn predict(&self, _: &TrustFeatureVector) -> Result<Prediction, ModelError> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl AnomalyDetector for Broken {
        fn predict(&self, _: &TrustFeatureVector) -> Result<Prediction, ModelError> {
            Err(ModelError::NonFinite { feature: "label_match_score" })
        }
    }

    fn normal() -> TrustScorer<Fixed> {
        TrustScorer::new(Fixed(Prediction::Normal))
    }

    #[test]
    fn test_quick_repeat_return_with_bad_label() {
        let now = Utc::now();
        let result = TrustScorer::default().score(now, now, 3, 0.5);

        assert_eq!(
            result.risk_factors,
            vec![FACTOR_QUICK_RETURN, FACTOR_MULTIPLE_ATTEMPTS, FACTOR_LABEL_FAILED]
        );
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!((result.trust_score - 0.7 * 0.8 * 0.6).abs() < 1e-12);
        assert_eq!(result.confidence, 0.6);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_ordinary_return_is_low_risk() {
        let now = Utc::now();
        let result = TrustScorer::default().score(now - Duration::days(14), now, 0, 1.0);

        assert_eq!(result.trust_score, 1.0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.risk_factors.is_empty());
        assert_eq!(result.confidence, 0.8);
    }

    #[test]
    fn test_late_return() {
        let now = Utc::now();
        let result = TrustScorer::default().score(now - Duration::days(40), now, 0, 1.0);

        assert_eq!(result.risk_factors, vec![FACTOR_LATE_RETURN]);
        assert!((result.trust_score - 0.9).abs() < 1e-12);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_timing_rules_are_exclusive_at_boundaries() {
        let now = Utc::now();
        let scorer = normal();

        let exactly_day = scorer.score(now - Duration::hours(24), now, 0, 1.0);
        assert!(exactly_day.risk_factors.is_empty());

        let exactly_month = scorer.score(now - Duration::hours(720), now, 0, 1.0);
        assert!(exactly_month.risk_factors.is_empty());
    }

    #[test]
    fn test_attempts_never_increase_trust() {
        let now = Utc::now();
        let scorer = normal();

        for days in [0, 3, 14, 60] {
            for label in [0.2, 0.69, 0.7, 1.0] {
                let activation = now - Duration::days(days);
                let first = scorer.score(activation, now, 0, label);
                let repeat = scorer.score(activation, now, 2, label);

                assert!(repeat.trust_score <= first.trust_score);
                assert!(repeat.risk_factors.iter().any(|f| f == FACTOR_MULTIPLE_ATTEMPTS));
                assert!(!first.risk_factors.iter().any(|f| f == FACTOR_MULTIPLE_ATTEMPTS));
            }
        }
    }

    #[test]
    fn test_anomalous_prediction_zeroes_trust() {
        let now = Utc::now();
        let scorer = TrustScorer::new(Fixed(Prediction::Anomalous));
        let result = scorer.score(now - Duration::days(10), now, 0, 1.0);

        assert_eq!(result.trust_score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.risk_factors.is_empty());
    }

    #[test]
    fn test_label_confidence_levels() {
        let now = Utc::now();
        let activation = now - Duration::days(10);
        let scorer = normal();

        assert_eq!(scorer.score(activation, now, 0, 0.81).confidence, 0.8);
        assert_eq!(scorer.score(activation, now, 0, 0.8).confidence, 0.6);
        assert_eq!(scorer.score(activation, now, 0, 0.0).confidence, 0.6);
    }

    #[test]
    fn test_model_failure_is_fail_safe() {
        let now = Utc::now();
        let scorer = TrustScorer::new(Broken);

        assert!(scorer.try_score(now, now, 0, 1.0).is_err());

        let result = scorer.score(now, now, 0, 1.0);
        assert_eq!(result.trust_score, 0.0);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.risk_factors, vec![FACTOR_CALCULATION_ERROR]);
        assert_eq!(result.confidence, 0.0);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_non_finite_label_is_fail_safe() {
        let now = Utc::now();
        let result = TrustScorer::default().score(now - Duration::days(10), now, 0, f64::NAN);

        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.error.unwrap().contains("label_match_score"));
    }

    #[test]
    fn test_scores_stay_in_unit_range() {
        let now = Utc::now();
        let scorer = normal();

        for hours in [-48, 0, 12, 100, 1000] {
            for attempts in [0, 1, 5] {
                for label in [0.0, 0.5, 1.0] {
                    let result = scorer.score(now - Duration::hours(hours), now, attempts, label);
                    assert!((0.0..=1.0).contains(&result.trust_score));
                    assert!((0.0..=1.0).contains(&result.confidence));
                }
            }
        }
    }

    #[test]
    fn test_empty_training_keeps_predictions() {
        let now = Utc::now();
        let handle = ModelHandle::default();
        let scorer = TrustScorer::new(handle.clone());
        let before = scorer.score(now - Duration::days(3), now, 1, 0.9);

        assert!(!handle.train(&[]));

        let after = scorer.score(now - Duration::days(3), now, 1, 0.9);
        assert_eq!(before, after);
    }
}
