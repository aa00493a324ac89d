//! Image decoding and preprocessing
//!
//! Grayscale conversion followed by contrast-limited adaptive histogram
//! equalization (CLAHE). Raw lighting variance otherwise destroys keypoint
//! repeatability.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{imageops, DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};

use super::types::{LabelError, PixelRect};

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaheConfig {
    /// Histogram clip limit, relative to a uniform histogram
    pub clip_limit: f32,
    /// Tile grid (columns, rows)
    pub tile_grid: (u32, u32),
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: (8, 8),
        }
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode a base64 image, accepting an optional `data:...;base64,` prefix
pub fn decode_base64_image(data: &str) -> Result<DynamicImage, LabelError> {
    let encoded = match data.split_once(',') {
        Some((_, rest)) => rest,
        None => data,
    };

    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Grayscale + CLAHE
pub fn preprocess(image: &DynamicImage, config: &ClaheConfig) -> GrayImage {
    let gray = image.to_luma8();
    equalize_adaptive(&gray, config)
}

/// Copy a clipped rectangle out of the image
pub fn crop(image: &GrayImage, rect: PixelRect) -> GrayImage {
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

// ============================================================================
// CLAHE
// ============================================================================

/// Contrast-limited adaptive histogram equalization with bilinear
/// interpolation between tile mappings.
pub fn equalize_adaptive(gray: &GrayImage, config: &ClaheConfig) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles_x = config.tile_grid.0.clamp(1, width);
    let tiles_y = config.tile_grid.1.clamp(1, height);
    let tile_w = width.div_ceil(tiles_x);
    let tile_h = height.div_ceil(tiles_y);
    // Uneven division can leave fewer populated tiles than requested
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(gray, x0, y0, x1, y1, config.clip_limit));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];
    let max_tx = tiles_x as f32 - 1.0;
    let max_ty = tiles_y as f32 - 1.0;

    GrayImage::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y)[0] as usize;

        let fx = ((x as f32 + 0.5) / tile_w as f32 - 0.5).clamp(0.0, max_tx);
        let fy = ((y as f32 + 0.5) / tile_h as f32 - 0.5).clamp(0.0, max_ty);
        let tx1 = fx.floor() as u32;
        let ty1 = fy.floor() as u32;
        let tx2 = (tx1 + 1).min(tiles_x - 1);
        let ty2 = (ty1 + 1).min(tiles_y - 1);
        let ax = fx - tx1 as f32;
        let ay = fy - ty1 as f32;

        let top = lut_at(tx1, ty1)[value] as f32 * (1.0 - ax) + lut_at(tx2, ty1)[value] as f32 * ax;
        let bottom = lut_at(tx1, ty2)[value] as f32 * (1.0 - ax) + lut_at(tx2, ty2)[value] as f32 * ax;
        let mapped = top * (1.0 - ay) + bottom * ay;

        Luma([mapped.round().clamp(0.0, 255.0) as u8])
    })
}

/// Clipped-histogram equalization lookup table for one tile
fn tile_lut(gray: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[gray.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    let mut lut = [0u8; 256];
    if area == 0 {
        return lut;
    }

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let batch = excess / 256;
        let residual = (excess % 256) as usize;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (256 / residual).max(1);
            for bin in hist.iter_mut().step_by(step).take(residual) {
                *bin += 1;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut cumulative = 0u32;
    for (value, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[value] = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

// ============================================================================
// TESTS
// ============================================================================
