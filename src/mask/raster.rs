//! Bitmap rasterization to a tile grid.
//!
//! The source bitmap can be any size and any supported format; it is resized
//! to the grid shape with a smooth (Catmull-Rom, bicubic-equivalent) filter,
//! converted to single-channel intensity, and thresholded at 0.5.
//!
//! The bitmap's top row corresponds to the *last* scan row: stage Y increases
//! away from the image's visual top, so the resampled grid is flipped
//! vertically before thresholding. Whether this matches the stage coordinate
//! convention of a particular instrument is an integration-test concern.

use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::MaskError;

use super::grid::TileMask;

/// Intensity threshold: cells at or above this are captured.
const CAPTURE_THRESHOLD: f32 = 0.5;

/// Binarize one luminance sample.
fn luminance_selects(value: u8) -> bool {
    value as f32 / 255.0 >= CAPTURE_THRESHOLD
}

/// Rasterize a bitmap down to a `rows x cols` tile mask.
///
/// Resamples with [`FilterType::CatmullRom`], flips vertically so that grid
/// row 0 aligns with the scan path's row 0, converts to grayscale, and
/// thresholds each cell at 0.5 (>= 0.5 selects the tile for capture).
pub fn rasterize(image: &DynamicImage, rows: usize, cols: usize) -> TileMask {
    if rows == 0 || cols == 0 {
        return TileMask::filled(rows, cols, false);
    }

    let gray = image
        .resize_exact(cols as u32, rows as u32, FilterType::CatmullRom)
        .flipv()
        .to_luma8();

    let mut cells = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let value = gray.get_pixel(col as u32, row as u32).0[0];
            cells.push(luminance_selects(value));
        }
    }

    TileMask::new(rows, cols, cells)
}

/// Load a mask bitmap from disk and rasterize it to the grid shape.
///
/// # Errors
///
/// Returns [`MaskError::Image`] when the file cannot be read or decoded.
pub fn load_mask(path: &Path, rows: usize, cols: usize) -> Result<TileMask, MaskError> {
    let image = image::open(path).map_err(|e| MaskError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(rasterize(&image, rows, cols))
}

// =============================================================================
// Tests
// =============================================================================
