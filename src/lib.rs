//! # SEM Montage
//!
//! Automated montage (tiled image) acquisition for motorized-stage scanning
//! electron microscopes.
//!
//! A montage covers a large sample area with many overlapping tile captures.
//! This library computes the tile grid from physical dimensions and the
//! per-tile field of view, drives the stage/focus/capture hardware through a
//! synchronous command interface, and relocates the labeled output images.
//!
//! ## Features
//!
//! - **Serpentine planning**: deterministic boustrophedon scan path with
//!   overlap-reduced stage steps and whole-tile span truncation
//! - **Mask filtering**: binarize an arbitrary bitmap down to the tile grid
//!   to skip uninteresting regions
//! - **Focus recovery**: bounded sideways-probing search that relocates the
//!   stage to recover a failed focus lock, with full position rollback
//! - **Detector-aware output**: capture files renamed per tile and per
//!   detector slot
//!
//! ## Architecture
//!
//! - [`geometry`] - tile-position planner and field-of-view computation
//! - [`mask`] - bitmap rasterization and serpentine mask application
//! - [`focus`] - focus-recovery engine
//! - [`instrument`] - the instrument command interface and a simulated
//!   implementation
//! - [`acquisition`] - the per-tile orchestration loop
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use sem_montage::acquisition::{AcquisitionController, AcquisitionSettings};
//! use sem_montage::instrument::SimulatedInstrument;
//!
//! // A 100 x 80 um montage at the instrument's current magnification.
//! let settings = AcquisitionSettings::for_montage(80_000, 100_000);
//! let instrument = SimulatedInstrument::new();
//!
//! let mut controller = AcquisitionController::new(instrument, settings);
//! let report = controller.run().expect("acquisition failed");
//! println!(
//!     "captured {} of {} planned tiles",
//!     report.captured, report.planned
//! );
//! ```

pub mod acquisition;
pub mod config;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod instrument;
pub mod mask;

// Re-export commonly used types
pub use acquisition::{
    relocate_captures, AcquisitionController, AcquisitionReport, AcquisitionSettings,
    TEMP_CAPTURE_BASE,
};
pub use config::{Cli, Command, OutputFormat, PlanConfig, SimulateConfig};
pub use error::{AcquisitionError, GeometryError, InstrumentError, MaskError};
pub use focus::{recover_focus, FocusOutcome, DEFAULT_MAX_ATTEMPTS, PROBE_STEP_FRACTION};
pub use geometry::{
    plan_montage, tile_size, MontagePlan, MontageSpec, StagePosition, TileSize,
    FRAME_HEIGHT_NUMERATOR_NM, FRAME_WIDTH_NUMERATOR_NM,
};
pub use instrument::{
    AbcMode, CaptureMode, Instrument, ScanState, SimulatedInstrument, DETECTOR_SLOTS,
};
pub use mask::{apply_mask, load_mask, rasterize, TileMask};
