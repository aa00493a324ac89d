//! Label Analyzer
//!
//! Pipeline: decode → grayscale + CLAHE → crop label/surroundings →
//! FAST/BRIEF on each crop → ratio-test matching.
//!
//! Features are detected on each crop independently, so keypoints closer
//! than `BORDER` to a crop edge are never described.

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use super::keypoints::{self, DetectorConfig, KeypointSet};
use super::matcher;
use super::preprocess::{self, ClaheConfig};
use super::types::{LabelError, MatchResult, Region};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelAnalyzerConfig {
    pub clahe: ClaheConfig,
    pub detector: DetectorConfig,
}

/// Stateless between calls; safe to share across request handlers.
#[derive(Debug, Clone, Default)]
pub struct LabelAnalyzer {
    config: LabelAnalyzerConfig,
}

impl LabelAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LabelAnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LabelAnalyzerConfig {
        &self.config
    }

    /// Analyze a base64 (optionally data-URL) image. Decode and region
    /// errors are returned to the caller.
    pub fn try_analyze(&self, image_data: &str, region: &Region) -> Result<MatchResult, LabelError> {
        region.validate()?;
        let image = preprocess::decode_base64_image(image_data)?;
        self.analyze_image(&image, region)
    }

    /// Never fails: any error becomes a `(false, 0, 0)` result carrying the message
    pub fn analyze(&self, image_data: &str, region: &Region) -> MatchResult {
        match self.try_analyze(image_data, region) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Label analysis failed: {}", e);
                MatchResult::failed(e.to_string())
            }
        }
    }

    /// Analyze an already decoded image
    pub fn analyze_image(&self, image: &DynamicImage, region: &Region) -> Result<MatchResult, LabelError> {
        region.validate()?;

        let gray = preprocess::preprocess(image, &self.config.clahe);
        let (width, height) = gray.dimensions();

        let label_rect = region.label_rect(width, height);
        let surrounding_rect = region.surrounding_rect(width, height);

        let label = self.detect_features(&preprocess::crop(&gray, label_rect));
        let surrounding = self.detect_features(&preprocess::crop(&gray, surrounding_rect));

        log::debug!(
            "Label region {:?}: {} label keypoints, {} surrounding keypoints",
            label_rect,
            label.len(),
            surrounding.len()
        );

        Ok(matcher::evaluate(&label, &surrounding))
    }

    /// Keypoints + descriptors for a preprocessed grayscale image
    pub fn detect_features(&self, gray: &GrayImage) -> KeypointSet {
        keypoints::detect_features(gray, &self.config.detector)
    }
}
