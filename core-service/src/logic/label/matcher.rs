//! Label vs. surroundings matcher
//!
//! CHỈ chứa logic so khớp: ratio test + score/confidence policy.
//! Input: KeypointSet of the label and of its surroundings
//! Output: MatchResult

use super::keypoints::{hamming, Descriptor, KeypointSet};
use super::types::MatchResult;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Nearest neighbour must be closer than this fraction of the second nearest
pub const RATIO_TEST: f64 = 0.7;

/// Below this many label keypoints the label is treated as blank/unreadable
pub const MIN_LABEL_KEYPOINTS: usize = 10;

/// Keypoint count at which measurement confidence saturates
pub const CONFIDENCE_SATURATION: f64 = 100.0;

/// `label_match` requires a score strictly above this
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Result when the surroundings yield no features at all
pub const EMPTY_SURROUNDING_SCORE: f64 = 0.8;
pub const EMPTY_SURROUNDING_CONFIDENCE: f64 = 0.7;

pub const INSUFFICIENT_FEATURES: &str = "Insufficient features detected";

// ============================================================================
// MATCHING
// ============================================================================

/// Count label descriptors that pass the 2-NN ratio test against the
/// surrounding descriptors. A label feature without a second neighbour
/// cannot pass.
pub fn match_regions(label: &[Descriptor], surrounding: &[Descriptor]) -> usize {
    if surrounding.len() < 2 {
        return 0;
    }

    label
        .iter()
        .filter(|query| {
            let (best, second) = two_nearest(query, surrounding);
            f64::from(best) < RATIO_TEST * f64::from(second)
        })
        .count()
}

/// (nearest, second nearest) Hamming distances; `candidates` has ≥ 2 entries
fn two_nearest(query: &Descriptor, candidates: &[Descriptor]) -> (u32, u32) {
    let mut best = u32::MAX;
    let mut second = u32::MAX;

    for candidate in candidates {
        let d = hamming(query, candidate);
        if d < best {
            second = best;
            best = d;
        } else if d < second {
            second = d;
        }
    }

    (best, second)
}

// ============================================================================
// POLICY
// ============================================================================

/// Score label keypoints against surrounding keypoints
pub fn evaluate(label: &KeypointSet, surrounding: &KeypointSet) -> MatchResult {
    let total = label.len();

    if total < MIN_LABEL_KEYPOINTS {
        return MatchResult::new(false, 0.0, 1.0).with_error(INSUFFICIENT_FEATURES);
    }

    if surrounding.is_empty() {
        return MatchResult::new(true, EMPTY_SURROUNDING_SCORE, EMPTY_SURROUNDING_CONFIDENCE);
    }

    let matched = match_regions(&label.descriptors, &surrounding.descriptors);
    let score = matched as f64 / total as f64;
    let confidence = (total as f64 / CONFIDENCE_SATURATION).min(1.0);

    log::debug!(
        "Label match: {}/{} keypoints matched (score {:.3}, confidence {:.2})",
        matched,
        total,
        score,
        confidence
    );

    MatchResult::new(score > MATCH_THRESHOLD, score, confidence)
}

// ============================================================================
// TESTS
// ============================================================================
