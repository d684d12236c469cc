//! Field-of-view computation.
//!
//! The physical size of one captured tile depends on the magnification and on
//! the instrument's photo frame-size factor (an opaque scalar reported by the
//! capture hardware). Each axis has its own sensor constant, reflecting the
//! 4:3 aspect ratio of the detector frame.

use serde::Serialize;

use crate::error::GeometryError;

/// Sensor numerator for the frame width, in nanometres at magnification 1.
pub const FRAME_WIDTH_NUMERATOR_NM: f64 = 127_000.0;

/// Sensor numerator for the frame height, in nanometres at magnification 1.
pub const FRAME_HEIGHT_NUMERATOR_NM: f64 = 95_250.0;

/// Physical dimensions of one tile, in nanometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileSize {
    /// Tile height in nanometres
    pub height_nm: f64,

    /// Tile width in nanometres
    pub width_nm: f64,
}

/// Compute the physical tile size for a magnification and photo size factor.
///
/// `width = 127 000 * factor / magnification` and
/// `height = 95 250 * factor / magnification`, both in nanometres. The two
/// numerators are independent per-axis constants; their ratio fixes the frame
/// aspect ratio regardless of magnification.
///
/// Pure and independently testable: callers convert instrument readings into
/// the canonical nanometre unit here, before any planning happens.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidMagnification`] or
/// [`GeometryError::InvalidPhotoSize`] for non-positive inputs.
pub fn tile_size(magnification: f64, photo_size_factor: f64) -> Result<TileSize, GeometryError> {
    if magnification <= 0.0 || !magnification.is_finite() {
        return Err(GeometryError::InvalidMagnification(magnification));
    }
    if photo_size_factor <= 0.0 || !photo_size_factor.is_finite() {
        return Err(GeometryError::InvalidPhotoSize(photo_size_factor));
    }

    Ok(TileSize {
        height_nm: FRAME_HEIGHT_NUMERATOR_NM * photo_size_factor / magnification,
        width_nm: FRAME_WIDTH_NUMERATOR_NM * photo_size_factor / magnification,
    })
}
