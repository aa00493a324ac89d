//! Keypoint detection and binary descriptors
//!
//! FAST-9 segment-test corners with 3x3 non-maximum suppression, described
//! by 256 BRIEF-style comparisons of 5x5 box means inside a 27x27 patch.
//! Everything is deterministic for identical pixel data.

use image::GrayImage;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Descriptor length in bytes (256 bits)
pub const DESCRIPTOR_BYTES: usize = 32;

/// Bresenham circle of radius 3, clockwise from 12 o'clock
const CIRCLE: [(i32, i32); 16] = [
    (0, -3), (1, -3), (2, -2), (3, -1),
    (3, 0), (3, 1), (2, 2), (1, 3),
    (0, 3), (-1, 3), (-2, 2), (-3, 1),
    (-3, 0), (-3, -1), (-2, -2), (-1, -3),
];

/// Contiguous arc length required by the segment test
const ARC_LENGTH: usize = 9;

/// Max offset of a sampling point from the keypoint
const PATCH_HALF: i32 = 13;

/// Half-size of the box averaged at each sampling point
const BOX_HALF: i32 = 2;

/// Keypoints closer than this to the border have no full descriptor patch
pub const BORDER: u32 = (PATCH_HALF + BOX_HALF + 1) as u32;

const PATTERN_SEED: u64 = 0x7472_7565_7461_6721;

/// Fixed comparison pattern, generated once
static PATTERN: Lazy<Vec<[(i32, i32); 2]>> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(PATTERN_SEED);
    (0..DESCRIPTOR_BYTES * 8)
        .map(|_| {
            let mut point = || (rng.gen_range(-PATCH_HALF..=PATCH_HALF), rng.gen_range(-PATCH_HALF..=PATCH_HALF));
            [point(), point()]
        })
        .collect()
});

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Intensity difference for the segment test
    pub fast_threshold: u8,
    /// Keep only the strongest N keypoints (None = all)
    pub max_keypoints: Option<usize>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_keypoints: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: u32,
    pub y: u32,
    pub response: f32,
}

pub type Descriptor = [u8; DESCRIPTOR_BYTES];

/// Keypoints with one descriptor each, same order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeypointSet {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl KeypointSet {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

// ============================================================================
// DETECTION
// ============================================================================

/// Detect keypoints and compute descriptors on a preprocessed grayscale image
pub fn detect_features(gray: &GrayImage, config: &DetectorConfig) -> KeypointSet {
    let (width, height) = gray.dimensions();
    if width <= 2 * BORDER || height <= 2 * BORDER {
        return KeypointSet::default();
    }

    let responses = corner_responses(gray, config.fast_threshold);
    let mut keypoints = suppress_non_maxima(&responses, width, height);

    // Strongest first; position breaks ties so ordering is stable
    keypoints.sort_by(|a, b| {
        b.response
            .total_cmp(&a.response)
            .then(a.y.cmp(&b.y))
            .then(a.x.cmp(&b.x))
    });
    if let Some(max) = config.max_keypoints {
        keypoints.truncate(max);
    }

    let integral = IntegralImage::new(gray);
    let descriptors = keypoints.iter().map(|kp| describe(&integral, kp)).collect();

    KeypointSet { keypoints, descriptors }
}

/// Segment-test response for every pixel where a descriptor fits (0 = no corner)
fn corner_responses(gray: &GrayImage, threshold: u8) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    let mut responses = vec![0.0f32; (width * height) as usize];
    let t = i32::from(threshold);

    for y in BORDER..height - BORDER {
        for x in BORDER..width - BORDER {
            let center = i32::from(gray.get_pixel(x, y)[0]);
            let ring: [i32; 16] = std::array::from_fn(|i| {
                let (dx, dy) = CIRCLE[i];
                i32::from(gray.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0])
            });

            if let Some(score) = segment_test(center, &ring, t) {
                responses[(y * width + x) as usize] = score;
            }
        }
    }

    responses
}

/// FAST-9: at least 9 contiguous ring pixels all brighter or all darker
/// than `center` by more than `t`. Score = summed excess contrast.
fn segment_test(center: i32, ring: &[i32; 16], t: i32) -> Option<f32> {
    // Quick rejection on the four compass points
    let compass = [ring[0], ring[4], ring[8], ring[12]];
    let bright = compass.iter().filter(|&&v| v > center + t).count();
    let dark = compass.iter().filter(|&&v| v < center - t).count();
    if bright < 2 && dark < 2 {
        return None;
    }

    let brighter = |v: i32| v > center + t;
    let darker = |v: i32| v < center - t;

    if has_arc(ring, brighter) || has_arc(ring, darker) {
        let score = ring
            .iter()
            .map(|&v| ((v - center).abs() - t).max(0) as f32)
            .sum();
        Some(score)
    } else {
        None
    }
}

fn has_arc(ring: &[i32; 16], pred: impl Fn(i32) -> bool) -> bool {
    let mut run = 0;
    // Walk the ring twice to catch arcs that wrap around
    for i in 0..32 {
        if pred(ring[i % 16]) {
            run += 1;
            if run >= ARC_LENGTH {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Keep local maxima in 3x3 windows; equal neighbours earlier in raster order win
fn suppress_non_maxima(responses: &[f32], width: u32, height: u32) -> Vec<Keypoint> {
    let mut keypoints = Vec::new();
    let at = |x: u32, y: u32| responses[(y * width + x) as usize];

    for y in BORDER..height - BORDER {
        'pixels: for x in BORDER..width - BORDER {
            let response = at(x, y);
            if response <= 0.0 {
                continue;
            }

            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let neighbour = at((x as i32 + dx) as u32, (y as i32 + dy) as u32);
                    let earlier = dy < 0 || (dy == 0 && dx < 0);
                    if neighbour > response || (earlier && neighbour == response) {
                        continue 'pixels;
                    }
                }
            }

            keypoints.push(Keypoint { x, y, response });
        }
    }

    keypoints
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Summed-area table for O(1) box sums
struct IntegralImage {
    width: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(gray: &GrayImage) -> Self {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];

        for y in 0..h {
            let mut row = 0u64;
            for x in 0..w {
                row += u64::from(gray.get_pixel(x as u32, y as u32)[0]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }

        Self { width: stride, sums }
    }

    /// Sum over the inclusive box centred at (cx, cy)
    fn box_sum(&self, cx: i32, cy: i32, half: i32) -> u64 {
        let x0 = (cx - half) as usize;
        let y0 = (cy - half) as usize;
        let x1 = (cx + half + 1) as usize;
        let y1 = (cy + half + 1) as usize;
        let s = &self.sums;
        let w = self.width;
        s[y1 * w + x1] + s[y0 * w + x0] - s[y0 * w + x1] - s[y1 * w + x0]
    }
}

fn describe(integral: &IntegralImage, kp: &Keypoint) -> Descriptor {
    let mut descriptor = [0u8; DESCRIPTOR_BYTES];
    let (cx, cy) = (kp.x as i32, kp.y as i32);

    for (bit, [(ax, ay), (bx, by)]) in PATTERN.iter().enumerate() {
        let a = integral.box_sum(cx + ax, cy + ay, BOX_HALF);
        let b = integral.box_sum(cx + bx, cy + by, BOX_HALF);
        if a < b {
            descriptor[bit / 8] |= 1 << (bit % 8);
        }
    }

    descriptor
}

/// Hamming distance between two descriptors
pub fn hamming(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

// ============================================================================
// TESTS
// ============================================================================
