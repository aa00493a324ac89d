//! Isolation Forest - unsupervised outlier detector
//!
//! Liu, Ting & Zhou (2008). Points that are isolated by few random splits
//! are anomalies. The decision threshold is calibrated from the training set
//! with the contamination fraction.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of isolation trees
    pub n_estimators: usize,
    /// Sub-sample size per tree (capped by training set size)
    pub max_samples: usize,
    /// Expected anomaly fraction in training data
    pub contamination: f64,
    /// Seed for reproducible fits
    pub random_state: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            random_state: 42,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum IsolationNode {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    root: IsolationNode,
}

impl IsolationTree {
    fn fit(data: &Array2<f64>, rows: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        Self {
            root: grow(data, rows, 0, max_depth, rng),
        }
    }

    /// Path length of `x`, with the unbuilt-subtree correction at leaves
    pub fn path_length(&self, x: ArrayView1<'_, f64>) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;

        loop {
            match node {
                IsolationNode::Leaf { size } => return depth + average_path_length(*size),
                IsolationNode::Split { feature, threshold, left, right } => {
                    node = if x[*feature] < *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

fn grow(
    data: &Array2<f64>,
    rows: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> IsolationNode {
    if depth >= max_depth || rows.len() <= 1 {
        return IsolationNode::Leaf { size: rows.len() };
    }

    let n_features = data.ncols();
    let start = rng.gen_range(0..n_features);

    // First non-constant feature, starting from a random one
    for offset in 0..n_features {
        let feature = (start + offset) % n_features;
        let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
            let v = data[[r, feature]];
            (lo.min(v), hi.max(v))
        });

        if min < max {
            let threshold = split_point(min, max, rng);
            let (left, right): (Vec<usize>, Vec<usize>) =
                rows.into_iter().partition(|&r| data[[r, feature]] < threshold);

            return IsolationNode::Split {
                feature,
                threshold,
                left: Box::new(grow(data, left, depth + 1, max_depth, rng)),
                right: Box::new(grow(data, right, depth + 1, max_depth, rng)),
            };
        }
    }

    IsolationNode::Leaf { size: rows.len() }
}

/// Uniform draw in `[min, max)`. Works on half-widths so `max - min` cannot
/// overflow when the bounds sit near opposite ends of the f64 range.
fn split_point(min: f64, max: f64, rng: &mut StdRng) -> f64 {
    let half = max / 2.0 - min / 2.0;
    let u = rng.gen::<f64>();
    let threshold = min + u * half + u * half;
    if threshold < max {
        threshold
    } else {
        min + half
    }
}

/// c(n): average path length of an unsuccessful BST search over n points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IsolationForest {
    config: ForestConfig,
    trees: Vec<IsolationTree>,
    /// Sub-sample size actually used (normalizes path lengths)
    sample_size: usize,
    /// Anomaly score above which a point is anomalous; None until fitted
    threshold: Option<f64>,
}

impl IsolationForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForestConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n.max(1);
        self
    }

    pub fn with_contamination(mut self, contamination: f64) -> Self {
        self.config.contamination = contamination.clamp(0.0, 0.5);
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.config.random_state = seed;
        self
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.threshold.is_some() && !self.trees.is_empty()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Fit on `data` (rows = samples). An empty matrix leaves the forest untouched.
    pub fn fit(&mut self, data: &Array2<f64>) {
        let n = data.nrows();
        if n == 0 || data.ncols() == 0 {
            return;
        }

        let psi = self.config.max_samples.clamp(1, n);
        let max_depth = (psi as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(self.config.random_state);

        let trees: Vec<IsolationTree> = (0..self.config.n_estimators.max(1))
            .map(|_| {
                let rows = sample(&mut rng, n, psi).into_vec();
                IsolationTree::fit(data, rows, max_depth, &mut rng)
            })
            .collect();

        self.trees = trees;
        self.sample_size = psi;

        let mut scores: Vec<f64> = data.rows().into_iter().map(|row| self.score(row)).collect();
        scores.sort_by(|a, b| a.total_cmp(b));
        self.threshold = Some(percentile(&scores, 1.0 - self.config.contamination));
    }

    /// Anomaly score in (0, 1]; higher is more anomalous. 0.5 when unfitted.
    pub fn score(&self, x: ArrayView1<'_, f64>) -> f64 {
        let normalizer = average_path_length(self.sample_size);
        if self.trees.is_empty() || normalizer <= 0.0 {
            return 0.5;
        }

        let mean_path =
            self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;

        2f64.powf(-mean_path / normalizer)
    }

    /// Whether `x` lies beyond the calibrated threshold. Unfitted → false.
    pub fn is_anomaly(&self, x: ArrayView1<'_, f64>) -> bool {
        match self.threshold {
            Some(threshold) if !self.trees.is_empty() => self.score(x) > threshold,
            _ => false,
        }
    }
}

/// Linear-interpolated quantile of an ascending slice, `q` in [0, 1]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2};

    /// Tight grid around (2, 2) plus two far outliers
    fn clustered_data() -> Array2<f64> {
        let mut values = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                values.push(2.0 + i as f64 * 0.02);
                values.push(2.0 + j as f64 * 0.02);
            }
        }
        values.extend_from_slice(&[10.0, 10.0, -10.0, -10.0]);
        Array2::from_shape_vec((102, 2), values).unwrap()
    }

    #[test]
    fn test_split_point_spans_full_f64_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let t = split_point(-f64::MAX, f64::MAX, &mut rng);
            assert!(t.is_finite());
            assert!((-f64::MAX..f64::MAX).contains(&t));
        }

        let next = 1.0f64 + f64::EPSILON;
        let t = split_point(1.0, next, &mut rng);
        assert!((1.0..next).contains(&t));
    }

    #[test]
    fn test_fit_on_extreme_spread() {
        let values: Vec<f64> = (0..40)
            .flat_map(|i| {
                let extreme = if i % 2 == 0 { 1e308 } else { -1e308 };
                [100.0, extreme]
            })
            .collect();
        let data = Array2::from_shape_vec((40, 2), values).unwrap();

        let mut forest = IsolationForest::new().with_random_state(42);
        forest.fit(&data);

        assert!(forest.is_fitted());
        let score = forest.score(arr1(&[100.0, 0.0]).view());
        assert!(score > 0.0 && score <= 1.0);
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(percentile(&data, 0.0), 0.0);
        assert_eq!(percentile(&data, 1.0), 3.0);
        assert!((percentile(&data, 0.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_unfitted_forest_is_neutral() {
        let forest = IsolationForest::new();
        assert!(!forest.is_fitted());
        assert_eq!(forest.score(arr1(&[1.0, 2.0]).view()), 0.5);
        assert!(!forest.is_anomaly(arr1(&[1e9, -1e9]).view()));
    }

    #[test]
    fn test_outliers_are_flagged() {
        let mut forest = IsolationForest::new().with_contamination(0.1).with_random_state(42);
        forest.fit(&clustered_data());

        assert!(forest.is_fitted());
        assert!(forest.is_anomaly(arr1(&[10.0, 10.0]).view()));
        assert!(forest.is_anomaly(arr1(&[-10.0, -10.0]).view()));
        assert!(!forest.is_anomaly(arr1(&[2.09, 2.09]).view()));
    }

    #[test]
    fn test_scores_bounded() {
        let mut forest = IsolationForest::new().with_n_estimators(50);
        let data = clustered_data();
        forest.fit(&data);

        for row in data.rows() {
            let s = forest.score(row);
            assert!(s > 0.0 && s <= 1.0, "score {s} out of range");
        }
    }

    #[test]
    fn test_fit_is_reproducible() {
        let data = clustered_data();
        let mut a = IsolationForest::new().with_random_state(7);
        let mut b = IsolationForest::new().with_random_state(7);
        a.fit(&data);
        b.fit(&data);

        let probe = arr1(&[3.0, 1.5]);
        assert_eq!(a.score(probe.view()), b.score(probe.view()));
        assert_eq!(a.threshold(), b.threshold());
    }

    #[test]
    fn test_empty_fit_is_noop() {
        let mut forest = IsolationForest::new();
        forest.fit(&Array2::zeros((0, 3)));
        assert!(!forest.is_fitted());
    }

    #[test]
    fn test_constant_data_has_no_anomalies() {
        let data = Array2::from_elem((20, 3), 1.0);
        let mut forest = IsolationForest::new();
        forest.fit(&data);

        assert!(!forest.is_anomaly(arr1(&[1.0, 1.0, 1.0]).view()));
    }
}
