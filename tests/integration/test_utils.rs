//! Test utilities for integration tests.
//!
//! Provides a recording mock instrument and settings helpers shared across
//! the integration test modules.

use std::path::{Path, PathBuf};

use sem_montage::error::InstrumentError;
use sem_montage::geometry::StagePosition;
use sem_montage::instrument::{AbcMode, CaptureMode, Instrument, ScanState};
use sem_montage::AcquisitionSettings;

// =============================================================================
// Recording Mock Instrument
// =============================================================================

/// One recorded instrument operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Move { x: Option<i64>, y: Option<i64> },
    SetMagnification(f64),
    SetHv(bool),
    AutoAbc,
    AutoAfc,
    AutoAsc,
    SetFocus(f64),
    Capture,
    Scan(u8),
}

/// A mock instrument that records every command it receives.
///
/// Autofocus behavior is scripted as a list of working-distance deltas, one
/// per invocation (the last entry repeats). Captures write real placeholder
/// files so the relocation step can be exercised.
pub struct RecordingInstrument {
    pub ops: Vec<Op>,
    position: StagePosition,
    magnification: f64,
    focus_coarse: f64,
    wd_um: f64,
    afc_deltas: Vec<f64>,
    afc_calls: usize,
    active_detectors: Vec<usize>,
}

impl RecordingInstrument {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            position: StagePosition::new(0, 0),
            magnification: 1_000.0,
            focus_coarse: 0.5,
            wd_um: 10_000.0,
            afc_deltas: vec![0.0],
            afc_calls: 0,
            active_detectors: vec![0],
        }
    }

    pub fn with_position(mut self, position: StagePosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_afc_deltas(mut self, deltas: &[f64]) -> Self {
        self.afc_deltas = deltas.to_vec();
        self
    }

    pub fn with_active_detectors(mut self, slots: &[usize]) -> Self {
        self.active_detectors = slots.to_vec();
        self
    }

    /// X coordinates of every move that specified an X axis.
    pub fn move_xs(&self) -> Vec<i64> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Move { x: Some(x), .. } => Some(*x),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matcher: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| matcher(op)).count()
    }

    pub fn current_focus(&self) -> f64 {
        self.focus_coarse
    }

    pub fn current_position(&self) -> StagePosition {
        self.position
    }
}

impl Default for RecordingInstrument {
    fn default() -> Self {
        Self::new()
    }
}

impl Instrument for RecordingInstrument {
    fn stage_position(&mut self) -> Result<StagePosition, InstrumentError> {
        Ok(self.position)
    }

    fn move_stage(&mut self, x: Option<i64>, y: Option<i64>) -> Result<(), InstrumentError> {
        self.ops.push(Op::Move { x, y });
        if let Some(x) = x {
            self.position.x = x;
        }
        if let Some(y) = y {
            self.position.y = y;
        }
        Ok(())
    }

    fn magnification(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.magnification)
    }

    fn set_magnification(&mut self, value: f64) -> Result<(), InstrumentError> {
        self.ops.push(Op::SetMagnification(value));
        self.magnification = value;
        Ok(())
    }

    fn photo_size_factor(&mut self) -> Result<f64, InstrumentError> {
        Ok(4.0)
    }

    fn set_hv(&mut self, on: bool) -> Result<(), InstrumentError> {
        self.ops.push(Op::SetHv(on));
        Ok(())
    }

    fn run_auto_abc(&mut self, _mode: AbcMode, _bm: u8) -> Result<(), InstrumentError> {
        self.ops.push(Op::AutoAbc);
        Ok(())
    }

    fn run_auto_afc(&mut self) -> Result<(), InstrumentError> {
        self.ops.push(Op::AutoAfc);
        let delta = self
            .afc_deltas
            .get(self.afc_calls)
            .or(self.afc_deltas.last())
            .copied()
            .unwrap_or(0.0);
        self.wd_um += delta;
        // Autofocus settles the coarse value on whatever plane it found.
        self.focus_coarse += delta / 1_000.0;
        self.afc_calls += 1;
        Ok(())
    }

    fn run_auto_asc(&mut self) -> Result<(), InstrumentError> {
        self.ops.push(Op::AutoAsc);
        Ok(())
    }

    fn focus(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.focus_coarse)
    }

    fn set_focus(&mut self, coarse: f64) -> Result<(), InstrumentError> {
        self.ops.push(Op::SetFocus(coarse));
        self.focus_coarse = coarse;
        Ok(())
    }

    fn working_distance(&mut self) -> Result<f64, InstrumentError> {
        Ok(self.wd_um)
    }

    fn run_capture(
        &mut self,
        mode: CaptureMode,
        dir: &Path,
        base_name: &str,
    ) -> Result<(), InstrumentError> {
        self.ops.push(Op::Capture);
        let stems: Vec<String> = match mode {
            CaptureMode::Single => vec![base_name.to_string()],
            CaptureMode::All => self
                .active_detectors
                .iter()
                .map(|slot| format!("{base_name}_0{slot}"))
                .collect(),
        };
        for stem in stems {
            std::fs::write(dir.join(format!("{stem}.bmp")), b"img").unwrap();
            std::fs::write(dir.join(format!("{stem}.txt")), b"meta").unwrap();
        }
        Ok(())
    }

    fn run_scan(&mut self, state: ScanState) -> Result<(), InstrumentError> {
        self.ops.push(Op::Scan(state.code()));
        Ok(())
    }
}

// =============================================================================
// Settings Helpers
// =============================================================================

/// Settings for a 2x2 grid at the mock's defaults (508 x 381 nm tiles), with
/// focus recovery off and single-detector captures.
pub fn small_montage_settings(temp_dir: &Path, output_dir: &Path) -> AcquisitionSettings {
    let mut settings = AcquisitionSettings::for_montage(1_016, 1_016);
    settings.overlap = 0.0;
    settings.start = Some(StagePosition::new(0, 0));
    settings.capture_mode = CaptureMode::Single;
    settings.use_auto_focus = false;
    settings.temp_dir = PathBuf::from(temp_dir);
    settings.output_dir = PathBuf::from(output_dir);
    settings.file_base = "tile".to_string();
    settings
}
