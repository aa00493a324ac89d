//! Trust Feature Layout - Centralized Feature Definition
//!
//! **This file controls the trust feature schema**
//!
//! ## Rules:
//! 1. Add feature → increment TRUST_FEATURE_VERSION
//! 2. Change order → increment TRUST_FEATURE_VERSION
//! 3. Remove feature → increment TRUST_FEATURE_VERSION
//!
//! Persisted anomaly models record the version and hash they were trained
//! against, so a layout change invalidates old model files on load.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current trust feature layout version
pub const TRUST_FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const TRUST_FEATURE_LAYOUT: &[&str] = &[
    "hours_since_activation", // 0: Hours between activation and return request (may be negative)
    "return_attempts",        // 1: Number of previous return attempts
    "label_match_score",      // 2: Label verification score (0-1)
];

/// Total number of trust features
pub const TRUST_FEATURE_COUNT: usize = 3;

/// Index constants
pub const HOURS_SINCE_ACTIVATION: usize = 0;
pub const RETURN_ATTEMPTS: usize = 1;
pub const LABEL_MATCH_SCORE: usize = 2;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of the version byte followed by every feature name (NUL-separated)
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[TRUST_FEATURE_VERSION]);

    for name in TRUST_FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Lookup feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    TRUST_FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Lookup feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    TRUST_FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Layout mismatch between a persisted artifact and the running engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMismatch {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feature layout mismatch: expected v{} ({:08x}), got v{} ({:08x})",
            self.expected_version, self.expected_hash, self.actual_version, self.actual_hash
        )
    }
}

/// Validate a (version, hash) pair against the current layout
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatch> {
    let expected_hash = layout_hash();
    if version != TRUST_FEATURE_VERSION || hash != expected_hash {
        return Err(LayoutMismatch {
            expected_version: TRUST_FEATURE_VERSION,
            expected_hash,
            actual_version: version,
            actual_hash: hash,
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
