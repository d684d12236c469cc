//! Run settings.
//!
//! One immutable value constructed at startup and passed explicitly into the
//! controller: no global mutable configuration anywhere in the crate.

use std::path::PathBuf;

use crate::focus::DEFAULT_MAX_ATTEMPTS;
use crate::geometry::StagePosition;
use crate::instrument::{AbcMode, CaptureMode};

/// Default working-distance change threshold in micrometres.
pub const DEFAULT_FOCUS_THRESHOLD_UM: f64 = 100.0;

/// Default magnification used while autofocusing.
pub const DEFAULT_AUTOFOCUS_MAGNIFICATION: f64 = 5_000.0;

/// Everything one acquisition run needs to know.
///
/// Stage coordinates and spans are in nanometres, working-distance thresholds
/// in micrometres.
#[derive(Debug, Clone)]
pub struct AcquisitionSettings {
    /// Start position of the montage; current stage position when `None`
    pub start: Option<StagePosition>,

    /// Total montage height in nanometres
    pub total_height_nm: i64,

    /// Total montage width in nanometres
    pub total_width_nm: i64,

    /// Fraction of overlap between adjacent tiles, in `[0, 1)`
    pub overlap: f64,

    /// Scan magnification; current instrument magnification when `None`
    pub magnification: Option<f64>,

    /// Run auto brightness/contrast before each capture
    pub use_auto_contrast: bool,

    /// Which detectors auto brightness/contrast adjusts
    pub abc_mode: AbcMode,

    /// Which detector image(s) each capture writes
    pub capture_mode: CaptureMode,

    /// Run focus recovery at each tile
    pub use_auto_focus: bool,

    /// Working-distance change threshold in micrometres
    pub focus_threshold_um: f64,

    /// Magnification to boost to while autofocusing (when the scan
    /// magnification is below it)
    pub autofocus_magnification: f64,

    /// Focus-recovery attempt budget
    pub max_focus_attempts: u32,

    /// Run auto astigmatism correction at each tile
    pub use_auto_astigmatism: bool,

    /// Switch the high voltage off once the run completes
    pub hv_off_on_end: bool,

    /// Directory the instrument captures into
    pub temp_dir: PathBuf,

    /// Directory the labeled output files land in
    pub output_dir: PathBuf,

    /// Base name for output files
    pub file_base: String,

    /// Optional mask bitmap selecting which tiles to capture
    pub mask_path: Option<PathBuf>,
}

impl AcquisitionSettings {
    /// Settings with the original script's defaults for everything that has
    /// one; spans must still be filled in.
    pub fn for_montage(total_height_nm: i64, total_width_nm: i64) -> Self {
        Self {
            start: None,
            total_height_nm,
            total_width_nm,
            overlap: 0.2,
            magnification: None,
            use_auto_contrast: false,
            abc_mode: AbcMode::All,
            capture_mode: CaptureMode::All,
            use_auto_focus: true,
            focus_threshold_um: DEFAULT_FOCUS_THRESHOLD_UM,
            autofocus_magnification: DEFAULT_AUTOFOCUS_MAGNIFICATION,
            max_focus_attempts: DEFAULT_MAX_ATTEMPTS,
            use_auto_astigmatism: false,
            hv_off_on_end: true,
            temp_dir: PathBuf::from("montage_tmp"),
            output_dir: PathBuf::from("montage_out"),
            file_base: "montage".to_string(),
            mask_path: None,
        }
    }
}
