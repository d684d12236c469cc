//! Per-tile acquisition loop.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::AcquisitionError;
use crate::focus::{recover_focus, FocusOutcome};
use crate::geometry::{plan_montage, tile_size, MontageSpec, StagePosition};
use crate::instrument::{Instrument, ScanState};
use crate::mask::{apply_mask, load_mask};

use super::output::{relocate_captures, TEMP_CAPTURE_BASE};
use super::settings::AcquisitionSettings;

// =============================================================================
// Acquisition Report
// =============================================================================

/// Summary of one completed acquisition run.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionReport {
    /// Number of tile rows in the planned grid
    pub rows: usize,

    /// Number of tile columns in the planned grid
    pub cols: usize,

    /// Tiles in the plan before masking
    pub planned: usize,

    /// Tiles actually captured
    pub captured: usize,

    /// Tiles skipped by the mask
    pub skipped: usize,

    /// Indices (in capture order) of tiles where focus recovery exhausted its
    /// budget and the capture proceeded with best-effort focus
    pub focus_failures: Vec<usize>,
}

// =============================================================================
// Acquisition Controller
// =============================================================================

/// Drives one montage acquisition over an [`Instrument`].
///
/// The controller resolves all geometry and mask preconditions before
/// touching stage motion or high voltage, then runs the strictly sequential
/// per-tile loop. Instrument errors abort the run immediately; focus-recovery
/// exhaustion is logged and recorded but never fatal.
pub struct AcquisitionController<I: Instrument> {
    instrument: I,
    settings: AcquisitionSettings,
}

impl<I: Instrument> AcquisitionController<I> {
    /// Create a controller for one run.
    pub fn new(instrument: I, settings: AcquisitionSettings) -> Self {
        Self {
            instrument,
            settings,
        }
    }

    /// Consume the controller, returning the instrument.
    pub fn into_instrument(self) -> I {
        self.instrument
    }

    /// Run the full acquisition.
    pub fn run(&mut self) -> Result<AcquisitionReport, AcquisitionError> {
        // Where to put the stage back when the run is over.
        let return_point = self.instrument.stage_position()?;
        let start = self.settings.start.unwrap_or(return_point);

        let magnification = match self.settings.magnification {
            Some(value) => value,
            None => self.instrument.magnification()?,
        };

        // Resolve every precondition before any stage motion or HV change.
        let photo_size_factor = self.instrument.photo_size_factor()?;
        let tile = tile_size(magnification, photo_size_factor)?;

        let spec = MontageSpec {
            start,
            total_height_nm: self.settings.total_height_nm,
            total_width_nm: self.settings.total_width_nm,
            tile_height_nm: tile.height_nm,
            tile_width_nm: tile.width_nm,
            overlap: self.settings.overlap,
        };
        let plan = plan_montage(&spec)?;

        info!(
            rows = plan.rows(),
            cols = plan.cols(),
            tiles = plan.len(),
            magnification,
            "montage planned"
        );

        let positions: Vec<StagePosition> = match &self.settings.mask_path {
            Some(path) => {
                let mask = load_mask(path, plan.rows(), plan.cols())?;
                let selected = apply_mask(&plan, &mask)?;
                info!(
                    selected = selected.len(),
                    skipped = plan.len() - selected.len(),
                    "mask applied"
                );
                selected
            }
            None => plan.positions().to_vec(),
        };

        let mut report = AcquisitionReport {
            rows: plan.rows(),
            cols: plan.cols(),
            planned: plan.len(),
            captured: 0,
            skipped: plan.len() - positions.len(),
            focus_failures: Vec::new(),
        };

        self.instrument.set_magnification(magnification)?;
        self.instrument.set_hv(true)?;

        for (index, position) in positions.iter().enumerate() {
            info!(tile = index, x = position.x, y = position.y, "capturing tile");
            self.instrument
                .move_stage(Some(position.x), Some(position.y))?;

            if self.settings.use_auto_contrast {
                self.instrument.run_auto_abc(self.settings.abc_mode, 0)?;
            }

            if self.settings.use_auto_focus {
                if magnification < self.settings.autofocus_magnification {
                    self.instrument
                        .set_magnification(self.settings.autofocus_magnification)?;
                }
                let outcome = recover_focus(
                    &mut self.instrument,
                    tile.width_nm,
                    self.settings.focus_threshold_um,
                    position.x,
                    self.settings.max_focus_attempts,
                )?;
                if let FocusOutcome::Exhausted = outcome {
                    warn!(tile = index, "focus recovery exhausted, capturing anyway");
                    report.focus_failures.push(index);
                }
            }

            if self.settings.use_auto_astigmatism {
                self.instrument.run_auto_asc()?;
            }

            // Back to the scan magnification for the capture itself.
            self.instrument.set_magnification(magnification)?;

            self.instrument.run_capture(
                self.settings.capture_mode,
                &self.settings.temp_dir,
                TEMP_CAPTURE_BASE,
            )?;
            relocate_captures(
                self.settings.capture_mode,
                &self.settings.temp_dir,
                &self.settings.output_dir,
                &self.settings.file_base,
                index,
            )?;

            self.instrument.run_scan(ScanState::Run)?;
            report.captured += 1;
        }

        self.instrument
            .move_stage(Some(return_point.x), Some(return_point.y))?;
        if self.settings.hv_off_on_end {
            self.instrument.set_hv(false)?;
        }

        info!(
            captured = report.captured,
            skipped = report.skipped,
            focus_failures = report.focus_failures.len(),
            "acquisition complete"
        );

        Ok(report)
    }
}

// =============================================================================
// Tests
// =============================================================================
