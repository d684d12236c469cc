//! Configuration management for SEM Montage.
//!
//! Command-line arguments via clap, with environment-variable fallbacks under
//! a `MONTAGE_` prefix and sensible defaults for every optional setting.
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use sem_montage::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Plan(config) => { /* dry-run planning */ }
//!     Command::Simulate(config) => { /* simulated acquisition */ }
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `MONTAGE_HEIGHT_NM` / `MONTAGE_WIDTH_NM` - montage span (required)
//! - `MONTAGE_OVERLAP` - tile overlap fraction (default: 0.2)
//! - `MONTAGE_START_X_NM` / `MONTAGE_START_Y_NM` - start position
//! - `MONTAGE_MAGNIFICATION` - scan magnification
//! - `MONTAGE_MASK` - path to a tile-selection mask bitmap
//! - `MONTAGE_OUTPUT_DIR` / `MONTAGE_TEMP_DIR` - output locations
//! - `MONTAGE_FILE_BASE` - base name for output files

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::acquisition::settings::{
    AcquisitionSettings, DEFAULT_AUTOFOCUS_MAGNIFICATION, DEFAULT_FOCUS_THRESHOLD_UM,
};
use crate::focus::DEFAULT_MAX_ATTEMPTS;
use crate::geometry::StagePosition;
use crate::instrument::{AbcMode, CaptureMode};

// =============================================================================
// Default Values
// =============================================================================

/// Default tile overlap fraction.
pub const DEFAULT_TILE_OVERLAP: f64 = 0.2;

/// Default photo frame-size factor for dry-run planning.
pub const DEFAULT_PHOTO_SIZE_FACTOR: f64 = 4.0;

/// Default base name for output files.
pub const DEFAULT_FILE_BASE: &str = "montage";

// =============================================================================
// CLI
// =============================================================================

/// SEM Montage - automated tiled acquisition for motorized-stage microscopes.
#[derive(Parser, Debug)]
#[command(name = "sem-montage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the tile grid without touching any hardware.
    Plan(PlanConfig),

    /// Run the full acquisition loop against the built-in simulated
    /// instrument, writing placeholder capture files.
    Simulate(SimulateConfig),
}

// =============================================================================
// Shared Montage Arguments
// =============================================================================

/// Montage geometry arguments shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct MontageArgs {
    /// Total montage height in nanometres.
    #[arg(long, env = "MONTAGE_HEIGHT_NM")]
    pub height_nm: i64,

    /// Total montage width in nanometres.
    #[arg(long, env = "MONTAGE_WIDTH_NM")]
    pub width_nm: i64,

    /// Fraction of overlap between adjacent tiles.
    #[arg(long, default_value_t = DEFAULT_TILE_OVERLAP, env = "MONTAGE_OVERLAP")]
    pub overlap: f64,

    /// Start X coordinate in nanometres; current stage position if omitted.
    #[arg(long, env = "MONTAGE_START_X_NM")]
    pub start_x_nm: Option<i64>,

    /// Start Y coordinate in nanometres; current stage position if omitted.
    #[arg(long, env = "MONTAGE_START_Y_NM")]
    pub start_y_nm: Option<i64>,

    /// Path to a mask bitmap selecting which tiles to capture.
    ///
    /// Bright regions are captured, dark regions skipped. The bitmap is
    /// resampled to the tile grid and thresholded at 50% intensity.
    #[arg(long, env = "MONTAGE_MASK")]
    pub mask: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl MontageArgs {
    /// Validate the shared arguments and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.height_nm <= 0 || self.width_nm <= 0 {
            return Err("Montage height and width must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(format!(
                "Tile overlap must be in [0, 1), got {}",
                self.overlap
            ));
        }
        if self.start_x_nm.is_some() != self.start_y_nm.is_some() {
            return Err(
                "Provide both --start-x-nm and --start-y-nm, or neither".to_string()
            );
        }
        Ok(())
    }

    /// The explicit start position, when both axes were given.
    pub fn start(&self) -> Option<StagePosition> {
        match (self.start_x_nm, self.start_y_nm) {
            (Some(x), Some(y)) => Some(StagePosition::new(x, y)),
            _ => None,
        }
    }
}

// =============================================================================
// Plan Command
// =============================================================================

/// Output format for the plan command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,

    /// Machine-readable JSON
    Json,
}

/// Configuration for dry-run planning.
#[derive(Args, Debug)]
pub struct PlanConfig {
    #[command(flatten)]
    pub montage: MontageArgs,

    /// Magnification to plan for.
    #[arg(long, env = "MONTAGE_MAGNIFICATION")]
    pub magnification: f64,

    /// Photo frame-size factor, as the instrument would report it.
    #[arg(long, default_value_t = DEFAULT_PHOTO_SIZE_FACTOR, env = "MONTAGE_PHOTO_SIZE")]
    pub photo_size_factor: f64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl PlanConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.montage.validate()?;
        if self.magnification <= 0.0 {
            return Err("Magnification must be positive".to_string());
        }
        if self.photo_size_factor <= 0.0 {
            return Err("Photo size factor must be positive".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Simulate Command
// =============================================================================

/// Configuration for a simulated acquisition run.
#[derive(Args, Debug)]
pub struct SimulateConfig {
    #[command(flatten)]
    pub montage: MontageArgs,

    /// Scan magnification; the simulated instrument's current value if
    /// omitted.
    #[arg(long, env = "MONTAGE_MAGNIFICATION")]
    pub magnification: Option<f64>,

    /// Directory the labeled output files land in.
    #[arg(long, default_value = "montage_out", env = "MONTAGE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Directory captures are written to before relocation.
    #[arg(long, default_value = "montage_tmp", env = "MONTAGE_TEMP_DIR")]
    pub temp_dir: PathBuf,

    /// Base name for output files.
    #[arg(long, default_value = DEFAULT_FILE_BASE, env = "MONTAGE_FILE_BASE")]
    pub file_base: String,

    /// Which detector image(s) to capture per tile.
    #[arg(long, value_enum, default_value_t = CaptureMode::All)]
    pub capture_mode: CaptureMode,

    /// Run auto brightness/contrast before each capture.
    #[arg(long, default_value_t = false)]
    pub auto_contrast: bool,

    /// Which detectors auto brightness/contrast adjusts.
    #[arg(long, value_enum, default_value_t = AbcMode::All)]
    pub abc_mode: AbcMode,

    /// Disable per-tile focus recovery.
    #[arg(long, default_value_t = false)]
    pub no_auto_focus: bool,

    /// Working-distance change threshold in micrometres.
    #[arg(long, default_value_t = DEFAULT_FOCUS_THRESHOLD_UM)]
    pub focus_threshold_um: f64,

    /// Magnification to boost to while autofocusing.
    #[arg(long, default_value_t = DEFAULT_AUTOFOCUS_MAGNIFICATION)]
    pub autofocus_magnification: f64,

    /// Focus-recovery attempt budget.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_focus_attempts: u32,

    /// Run auto astigmatism correction at each tile.
    #[arg(long, default_value_t = false)]
    pub auto_astigmatism: bool,

    /// Leave the high voltage on when the run completes.
    #[arg(long, default_value_t = false)]
    pub keep_hv_on: bool,

    /// Simulated working-distance drift per autofocus call, in micrometres.
    ///
    /// Values above the focus threshold exercise the recovery path.
    #[arg(long, default_value_t = 0.0)]
    pub focus_drift_um: f64,
}

impl SimulateConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.montage.validate()?;
        if let Some(mag) = self.magnification {
            if mag <= 0.0 {
                return Err("Magnification must be positive".to_string());
            }
        }
        if self.focus_threshold_um <= 0.0 {
            return Err("Focus threshold must be positive".to_string());
        }
        if self.autofocus_magnification <= 0.0 {
            return Err("Autofocus magnification must be positive".to_string());
        }
        if self.file_base.is_empty() {
            return Err("File base name must not be empty".to_string());
        }
        Ok(())
    }

    /// Build the immutable run settings from this configuration.
    pub fn to_settings(&self) -> AcquisitionSettings {
        AcquisitionSettings {
            start: self.montage.start(),
            total_height_nm: self.montage.height_nm,
            total_width_nm: self.montage.width_nm,
            overlap: self.montage.overlap,
            magnification: self.magnification,
            use_auto_contrast: self.auto_contrast,
            abc_mode: self.abc_mode,
            capture_mode: self.capture_mode,
            use_auto_focus: !self.no_auto_focus,
            focus_threshold_um: self.focus_threshold_um,
            autofocus_magnification: self.autofocus_magnification,
            max_focus_attempts: self.max_focus_attempts,
            use_auto_astigmatism: self.auto_astigmatism,
            hv_off_on_end: !self.keep_hv_on,
            temp_dir: self.temp_dir.clone(),
            output_dir: self.output_dir.clone(),
            file_base: self.file_base.clone(),
            mask_path: self.montage.mask.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
