//! Label Types
//!
//! Core types for label verification. No logic beyond construction and
//! coordinate clipping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("cannot decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid label region: {0}")]
    Region(String),
}

// ============================================================================
// REGION
// ============================================================================

/// Expected label rectangle in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Non-finite coordinates cannot be clipped meaningfully
    pub fn validate(&self) -> Result<(), LabelError> {
        let fields = [("x", self.x), ("y", self.y), ("width", self.width), ("height", self.height)];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(LabelError::Region(format!("{name} is not a finite number")));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Label rectangle, truncated to integers and clipped to the image
    pub fn label_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        let x0 = self.x as i64;
        let y0 = self.y as i64;
        PixelRect::from_bounds(
            x0,
            y0,
            x0.saturating_add(self.width as i64),
            y0.saturating_add(self.height as i64),
            image_width,
            image_height,
        )
    }

    /// One label width/height of margin on every side, clipped to the image
    pub fn surrounding_rect(&self, image_width: u32, image_height: u32) -> PixelRect {
        PixelRect::from_bounds(
            (self.x - self.width) as i64,
            (self.y - self.height) as i64,
            (self.x + 2.0 * self.width) as i64,
            (self.y + 2.0 * self.height) as i64,
            image_width,
            image_height,
        )
    }
}

/// Integer rectangle already clipped to an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Clip `[x0, x1) × [y0, y1)` to `[0, w) × [0, h)`. Inverted bounds give an empty rect.
    pub fn from_bounds(x0: i64, y0: i64, x1: i64, y1: i64, w: u32, h: u32) -> Self {
        let clamp_x = |v: i64| v.clamp(0, i64::from(w)) as u32;
        let clamp_y = |v: i64| v.clamp(0, i64::from(h)) as u32;

        let (left, right) = (clamp_x(x0), clamp_x(x1));
        let (top, bottom) = (clamp_y(y0), clamp_y(y1));

        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left),
            height: bottom.saturating_sub(top),
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Outcome of one label analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub label_match: bool,
    pub score: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    /// Score and confidence are clamped to [0, 1]
    pub fn new(label_match: bool, score: f64, confidence: f64) -> Self {
        Self {
            label_match,
            score: clamp_unit(score),
            confidence: clamp_unit(confidence),
            error: None,
        }
    }

    /// Degraded result for a failed analysis
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            label_match: false,
            score: 0.0,
            confidence: 0.0,
            error: Some(reason.into()),
        }
    }

    pub fn with_error(mut self, reason: impl Into<String>) -> Self {
        self.error = Some(reason.into());
        self
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rect_clips_to_bounds() {
        let region = Region::new(90.0, -10.0, 50.0, 40.0);
        let rect = region.label_rect(100, 100);
        assert_eq!(rect, PixelRect { x: 90, y: 0, width: 10, height: 30 });
    }

    #[test]
    fn test_label_rect_truncates() {
        let rect = Region::new(10.9, 20.2, 30.7, 5.99).label_rect(200, 200);
        assert_eq!(rect, PixelRect { x: 10, y: 20, width: 30, height: 5 });
    }

    #[test]
    fn test_surrounding_rect() {
        let region = Region::new(100.0, 100.0, 200.0, 100.0);
        let rect = region.surrounding_rect(1000, 1000);
        assert_eq!(rect, PixelRect { x: 0, y: 0, width: 500, height: 300 });

        let clipped = region.surrounding_rect(400, 250);
        assert_eq!(clipped, PixelRect { x: 0, y: 0, width: 400, height: 250 });
    }

    #[test]
    fn test_degenerate_region_is_empty() {
        let rect = Region::default().label_rect(100, 100);
        assert_eq!(rect.area(), 0);

        let negative = Region::new(50.0, 50.0, -20.0, 10.0).label_rect(100, 100);
        assert_eq!(negative.area(), 0);

        let outside = Region::new(500.0, 500.0, 10.0, 10.0).label_rect(100, 100);
        assert_eq!(outside.area(), 0);
    }

    #[test]
    fn test_region_validation() {
        assert!(Region::new(0.0, 0.0, 10.0, 10.0).validate().is_ok());
        assert!(matches!(
            Region::new(f64::NAN, 0.0, 10.0, 10.0).validate(),
            Err(LabelError::Region(_))
        ));
    }

    #[test]
    fn test_match_result_clamps() {
        let result = MatchResult::new(true, 1.7, -0.2);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.confidence, 0.0);

        let failed = MatchResult::failed("boom");
        assert!(!failed.label_match);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
