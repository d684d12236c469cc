//! In-memory instrument for dry runs and tests.
//!
//! Tracks stage and optics state, and writes placeholder capture files that
//! follow the vendor naming convention so the downstream relocation logic can
//! be exercised end to end without hardware.

use std::fmt::Write as _;
use std::path::Path;

use image::{GrayImage, Luma};
use tracing::debug;

use crate::error::InstrumentError;
use crate::geometry::StagePosition;

use super::{AbcMode, CaptureMode, Instrument, ScanState, DETECTOR_SLOTS};

/// Edge length of the placeholder capture images.
const PLACEHOLDER_IMAGE_SIZE: u32 = 16;

/// Simulated microscope.
///
/// Defaults: stage at the origin, magnification 1000x, photo size factor 4,
/// working distance 10 000 um, no focus drift, detector slot 0 active.
///
/// Autofocus drift is scriptable: each `run_auto_afc` call shifts the working
/// distance by the current drift, then multiplies the drift by the decay
/// factor. A decay of 0 models a single disturbance that the next attempt
/// recovers from; a decay of 1 models terrain the autofocus never settles on.
#[derive(Debug, Clone)]
pub struct SimulatedInstrument {
    position: StagePosition,
    magnification: f64,
    photo_size_factor: f64,
    hv_on: bool,
    focus_coarse: f64,
    working_distance_um: f64,
    focus_drift_um: f64,
    drift_decay: f64,
    active_detectors: Vec<usize>,
    captures: usize,
}

impl Default for SimulatedInstrument {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedInstrument {
    /// Create a simulated instrument with default state.
    pub fn new() -> Self {
        Self {
            position: StagePosition::new(0, 0),
            magnification: 1_000.0,
            photo_size_factor: 4.0,
            hv_on: false,
            focus_coarse: 0.5,
            working_distance_um: 10_000.0,
            focus_drift_um: 0.0,
            drift_decay: 0.0,
            active_detectors: vec![0],
            captures: 0,
        }
    }

    /// Start the stage at `position`.
    pub fn with_position(mut self, position: StagePosition) -> Self {
        self.position = position;
        self
    }

    /// Start at the given magnification.
    pub fn with_magnification(mut self, magnification: f64) -> Self {
        self.magnification = magnification;
        self
    }

    /// Report the given photo frame-size factor.
    pub fn with_photo_size_factor(mut self, factor: f64) -> Self {
        self.photo_size_factor = factor;
        self
    }

    /// Script autofocus drift: each autofocus shifts the working distance by
    /// `drift_um`, then scales the drift by `decay`.
    pub fn with_focus_drift(mut self, drift_um: f64, decay: f64) -> Self {
        self.focus_drift_um = drift_um;
        self.drift_decay = decay;
        self
    }

    /// Mark the given detector slots as active.
    pub fn with_active_detectors(mut self, slots: &[usize]) -> Self {
        self.active_detectors = slots.to_vec();
        self
    }

    /// Whether the high voltage is currently on.
    pub fn hv_on(&self) -> bool {
        self.hv_on
    }

    /// Number of captures performed so far.
    pub fn capture_count(&self) -> usize {
        self.captures
    }

    fn write_capture_pair(&self, dir: &Path, stem: &str) -> Result<(), InstrumentError> {
        let image_path = dir.join(format!("{stem}.bmp"));
        let shade = (self.captures % 256) as u8;
        let image = GrayImage::from_pixel(
            PLACEHOLDER_IMAGE_SIZE,
            PLACEHOLDER_IMAGE_SIZE,
            Luma([shade]),
        );
        image.save(&image_path).map_err(|e| InstrumentError::Command {
            command: "RunCapture",
            message: e.to_string(),
        })?;

        let mut metadata = String::new();
        let _ = writeln!(metadata, "PositionX={}", self.position.x);
        let _ = writeln!(metadata, "PositionY={}", self.position.y);
        let _ = writeln!(metadata, "Magnification={}", self.magnification);
        let _ = writeln!(metadata, "WorkingDistance={}", self.working_distance_um);
        std::fs::write(dir.join(format!("{stem}.txt")), metadata).map_err(|e| {
            InstrumentError::Command {
                command: "RunCapture",
                message: e.to_string(),
            }
        })
    }
}

impl Instrument for SimulatedInstrument {
    fn stage_position(&mut self) -> Result<StagePosition, InstrumentError> {
        Ok(self.position)
    }

    fn move_stage(&mut self, x: Option<i64>, y: Option<i64>) -> Result<(), InstrumentError> {
        if let Some(x) = x {
            self.position.x = x;
        }
        if let Some(y) = y {
            self.position.y = y;
        }
        debug!(x = self.position.x, y = self.position.y, "stage moved");
        Ok(())
    }

    fn magnification(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.magnification)
    }

    fn set_magnification(&mut self, value: f64) -> Result<(), InstrumentError> {
        self.magnification = value;
        Ok(())
    }

    fn photo_size_factor(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.photo_size_factor)
    }

    fn set_hv(&mut self, on: bool) -> Result<(), InstrumentError> {
        self.hv_on = on;
        Ok(())
    }

    fn run_auto_abc(&mut self, _mode: AbcMode, _bm: u8) -> Result<(), InstrumentError> {
        Ok(())
    }

    fn run_auto_afc(&mut self) -> Result<(), InstrumentError> {
        let applied = self.focus_drift_um;
        self.working_distance_um += applied;
        // The autofocus also settles the coarse value on the new plane.
        self.focus_coarse += applied / 1_000_000.0;
        self.focus_drift_um *= self.drift_decay;
        Ok(())
    }

    fn run_auto_asc(&mut self) -> Result<(), InstrumentError> {
        Ok(())
    }

    fn focus(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.focus_coarse)
    }

    fn set_focus(&mut self, coarse: f64) -> Result<(), InstrumentError> {
        self.focus_coarse = coarse;
        Ok(())
    }

    fn working_distance(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.working_distance_um)
    }

    fn run_capture(
        &mut self,
        mode: CaptureMode,
        dir: &Path,
        base_name: &str,
    ) -> Result<(), InstrumentError> {
        match mode {
            CaptureMode::Single => self.write_capture_pair(dir, base_name)?,
            CaptureMode::All => {
                for &slot in &self.active_detectors {
                    debug_assert!(slot < DETECTOR_SLOTS);
                    self.write_capture_pair(dir, &format!("{base_name}_0{slot}"))?;
                }
            }
        }
        self.captures += 1;
        Ok(())
    }

    fn run_scan(&mut self, _state: ScanState) -> Result<(), InstrumentError> {
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
