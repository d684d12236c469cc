use std::path::PathBuf;

use thiserror::Error;

/// Errors in montage geometry, all detectable before any hardware motion
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    /// Overlap fraction outside the half-open valid range
    #[error("Tile overlap must be in [0, 1), got {0}")]
    InvalidOverlap(f64),

    /// Tile dimensions must be strictly positive
    #[error("Tile dimensions must be positive, got {height_nm} x {width_nm} nm")]
    InvalidTileSize { height_nm: f64, width_nm: f64 },

    /// Montage spans must be strictly positive
    #[error("Montage spans must be positive, got {height_nm} x {width_nm} nm")]
    InvalidSpan { height_nm: i64, width_nm: i64 },

    /// Overlap large enough that the stage step rounds down to nothing
    #[error(
        "Effective tile size on the {axis} axis is zero: {tile_nm} nm tile with overlap {overlap}"
    )]
    ZeroEffectiveTile {
        axis: &'static str,
        tile_nm: f64,
        overlap: f64,
    },

    /// Requested span is smaller than one effective tile in some axis
    #[error("Montage grid is degenerate: {rows} row(s) x {cols} column(s)")]
    EmptyGrid { rows: usize, cols: usize },

    /// Magnification must be strictly positive
    #[error("Magnification must be positive, got {0}")]
    InvalidMagnification(f64),

    /// Photo frame-size factor must be strictly positive
    #[error("Photo size factor must be positive, got {0}")]
    InvalidPhotoSize(f64),
}

/// Errors related to the tile-selection mask
#[derive(Debug, Clone, Error)]
pub enum MaskError {
    /// Mask grid shape does not match the planned tile grid (fatal: a
    /// partially applied mask is never acceptable)
    #[error(
        "Mask grid is {actual_rows}x{actual_cols} but the plan is {expected_rows}x{expected_cols}"
    )]
    GridMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// Mask bitmap could not be read or decoded
    #[error("Failed to load mask image {}: {message}", path.display())]
    Image { path: PathBuf, message: String },
}

/// Errors from the instrument control interface.
///
/// These are propagated, never retried: physical operations are not safely
/// retryable without operator judgment.
#[derive(Debug, Clone, Error)]
pub enum InstrumentError {
    /// A control command was rejected or failed on the instrument side
    #[error("Instrument command {command} failed: {message}")]
    Command {
        command: &'static str,
        message: String,
    },

    /// Connection to the instrument was lost
    #[error("Instrument connection lost")]
    Disconnected,
}

/// Top-level acquisition errors.
///
/// Geometry and mask errors are preconditions checked before the stage moves
/// and are unrecoverable for the run. Instrument errors halt immediately.
/// Focus-recovery exhaustion is not an error: it is reported as a value and
/// the acquisition continues with best-effort focus.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Mask error: {0}")]
    Mask(#[from] MaskError),

    #[error("Instrument error: {0}")]
    Instrument(#[from] InstrumentError),

    /// A capture file could not be moved into the output directory
    #[error("Failed to relocate capture file {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The instrument reported a capture but the expected temp file is absent
    #[error("Expected capture file missing: {}", path.display())]
    MissingCapture { path: PathBuf },
}
