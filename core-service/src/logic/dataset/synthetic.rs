//! Synthetic return history for bootstrapping the anomaly model

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::record::TrainingRecord;
use crate::logic::label::Region;

/// Share of generated returns that follow the suspicious pattern
pub const SUSPICIOUS_RATIO: f64 = 0.2;

/// Standard label placements as fractions of the image: (x, y, width, height).
/// Top left, top right, bottom left, bottom right.
pub const STANDARD_LABEL_POSITIONS: [(f64, f64, f64, f64); 4] = [
    (0.1, 0.1, 0.2, 0.1),
    (0.7, 0.1, 0.2, 0.1),
    (0.1, 0.8, 0.2, 0.1),
    (0.7, 0.8, 0.2, 0.1),
];

/// Max shift of the label origin, as a fraction of the image size
pub const POSITION_NOISE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    samples: usize,
    seed: Option<u64>,
}

impl SyntheticGenerator {
    pub fn new(samples: usize) -> Self {
        Self { samples, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// One label region per product, in pixels of a `width` × `height` photo:
    /// a standard placement with the origin shifted by up to ±10% of the image
    /// and the size scaled by 0.9-1.1.
    pub fn generate_label_positions(&self, width: u32, height: u32) -> Vec<(String, Region)> {
        let mut rng = self.rng();
        let (w, h) = (f64::from(width), f64::from(height));

        (0..self.samples)
            .map(|i| {
                let (x, y, rw, rh) = STANDARD_LABEL_POSITIONS[rng.gen_range(0..STANDARD_LABEL_POSITIONS.len())];
                let region = Region::new(
                    (x + rng.gen_range(-POSITION_NOISE..POSITION_NOISE)) * w,
                    (y + rng.gen_range(-POSITION_NOISE..POSITION_NOISE)) * h,
                    rw * rng.gen_range(0.9..1.1) * w,
                    rh * rng.gen_range(0.9..1.1) * h,
                );
                (format!("PROD{:04}", i), region)
            })
            .collect()
    }

    /// Legitimate returns: activated 5-29 days ago, 0-1 prior attempts,
    /// label 0.8-1.0. Suspicious: 1-23 hours, 2-4 attempts, label 0.3-0.7.
    pub fn generate_returns(&self, now: DateTime<Utc>) -> Vec<TrainingRecord> {
        let mut rng = self.rng();

        (0..self.samples)
            .map(|i| {
                let legitimate = rng.gen::<f64>() >= SUSPICIOUS_RATIO;

                let (age, attempts, label) = if legitimate {
                    (
                        Duration::days(rng.gen_range(5..30)),
                        rng.gen_range(0..2),
                        rng.gen_range(0.8..1.0),
                    )
                } else {
                    (
                        Duration::hours(rng.gen_range(1..24)),
                        rng.gen_range(2..5),
                        rng.gen_range(0.3..0.7),
                    )
                };

                TrainingRecord {
                    product_id: Some(format!("PROD{:04}", i)),
                    activation_time: now - age,
                    return_timestamp: now,
                    return_attempts: attempts,
                    label_match_score: label,
                    is_legitimate: Some(legitimate),
                }
            })
            .collect()
    }
}
