//! Instrument control interface.
//!
//! This module defines the [`Instrument`] trait, the fixed command surface
//! through which the acquisition core drives the microscope: stage motion,
//! magnification, high voltage, the auto-adjustment primitives, focus state,
//! capture, and scan control.
//!
//! All calls are synchronous and blocking: each returns only once the
//! physical operation has completed, so the strict move -> settle -> measure
//! -> capture ordering the acquisition depends on falls out of sequential
//! execution. There is exactly one writer of stage/optics state per process.
//!
//! The real vendor link is out of scope for this crate; the trait is
//! implemented by [`SimulatedInstrument`] for the CLI and for tests.

use std::path::Path;

use clap::ValueEnum;

use crate::error::InstrumentError;
use crate::geometry::StagePosition;

pub mod simulated;

pub use simulated::SimulatedInstrument;

/// Number of detector slots the capture hardware exposes.
///
/// All-detector captures write one image/metadata pair per *active* slot;
/// inactive slots simply produce no file.
pub const DETECTOR_SLOTS: usize = 6;

// =============================================================================
// Command Parameters
// =============================================================================

/// Which detector image(s) a capture writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CaptureMode {
    /// One image from the currently selected detector
    Single,

    /// One image per active detector, numbered by slot
    All,
}

/// Which detector image(s) auto brightness/contrast adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AbcMode {
    /// Only the currently selected detector
    Single,

    /// Every active detector
    All,
}

/// Continuous-scan state after a captured freeze-frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Resume continuous scanning
    Run,

    /// Freeze the current frame
    Freeze,

    /// Freeze immediately, without waiting for the frame to complete
    FreezeForced,
}

impl ScanState {
    /// Vendor wire code for this state.
    pub const fn code(self) -> u8 {
        match self {
            ScanState::Run => 0,
            ScanState::Freeze => 1,
            ScanState::FreezeForced => 2,
        }
    }
}

// =============================================================================
// Instrument Trait
// =============================================================================

/// Synchronous command interface to the microscope.
///
/// Every method may fail with an [`InstrumentError`]; failures are propagated
/// to the caller, never retried internally. Methods take `&mut self` because
/// each call mutates or depends on physical instrument state.
pub trait Instrument {
    /// Current stage position in nanometres.
    fn stage_position(&mut self) -> Result<StagePosition, InstrumentError>;

    /// Move the stage. An unspecified axis is left unchanged.
    fn move_stage(&mut self, x: Option<i64>, y: Option<i64>) -> Result<(), InstrumentError>;

    /// Current magnification.
    fn magnification(&mut self) -> Result<f64, InstrumentError>;

    /// Set the magnification.
    fn set_magnification(&mut self, value: f64) -> Result<(), InstrumentError>;

    /// Photo frame-size factor used in the field-of-view computation.
    fn photo_size_factor(&mut self) -> Result<f64, InstrumentError>;

    /// Switch the high voltage (gun) on or off.
    fn set_hv(&mut self, on: bool) -> Result<(), InstrumentError>;

    /// Run auto brightness/contrast correction.
    ///
    /// `bm` is the vendor's beam-selection parameter; this workflow always
    /// passes 0.
    fn run_auto_abc(&mut self, mode: AbcMode, bm: u8) -> Result<(), InstrumentError>;

    /// Run the autofocus primitive.
    fn run_auto_afc(&mut self) -> Result<(), InstrumentError>;

    /// Run auto astigmatism correction.
    fn run_auto_asc(&mut self) -> Result<(), InstrumentError>;

    /// Current coarse focus value.
    fn focus(&mut self) -> Result<f64, InstrumentError>;

    /// Set the coarse focus value.
    fn set_focus(&mut self, coarse: f64) -> Result<(), InstrumentError>;

    /// Current working distance in micrometres.
    fn working_distance(&mut self) -> Result<f64, InstrumentError>;

    /// Capture the current frame(s) into `dir` under `base_name`.
    ///
    /// Writes one image + metadata text pair per captured detector, following
    /// the vendor naming convention: `{base_name}.{bmp,txt}` for
    /// [`CaptureMode::Single`], `{base_name}_0{slot}.{bmp,txt}` per active
    /// slot for [`CaptureMode::All`].
    fn run_capture(
        &mut self,
        mode: CaptureMode,
        dir: &Path,
        base_name: &str,
    ) -> Result<(), InstrumentError>;

    /// Set the continuous-scan state.
    fn run_scan(&mut self, state: ScanState) -> Result<(), InstrumentError>;
}
