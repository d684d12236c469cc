//! Capture-file relocation.
//!
//! The instrument always captures into a temp directory under a fixed base
//! name; this module moves the resulting image/metadata pairs into the output
//! directory under their final labeled names:
//!
//! - single-detector: `{base}_{i}.bmp` / `{base}_{i}.txt`
//! - all-detector: `{base}_d{slot}_{i}.bmp` / `{base}_d{slot}_{i}.txt` for
//!   every detector slot that produced a file

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::AcquisitionError;
use crate::instrument::{CaptureMode, DETECTOR_SLOTS};

/// Base name the instrument captures under before relocation.
pub const TEMP_CAPTURE_BASE: &str = "tempfile";

/// Extension of the captured image files.
const IMAGE_EXT: &str = "bmp";

/// Extension of the captured metadata files.
const METADATA_EXT: &str = "txt";

/// Move the capture files for tile `tile_index` into the output directory.
///
/// Returns the destination paths of the files that were moved.
///
/// # Errors
///
/// - [`AcquisitionError::MissingCapture`] in single mode when the expected
///   temp pair is absent
/// - [`AcquisitionError::Output`] when a move fails
///
/// In all-detector mode, slots without files are skipped: the instrument only
/// writes pairs for active detectors.
pub fn relocate_captures(
    mode: CaptureMode,
    temp_dir: &Path,
    output_dir: &Path,
    base: &str,
    tile_index: usize,
) -> Result<Vec<PathBuf>, AcquisitionError> {
    let mut moved = Vec::new();

    match mode {
        CaptureMode::Single => {
            let src_image = temp_dir.join(format!("{TEMP_CAPTURE_BASE}.{IMAGE_EXT}"));
            if !src_image.exists() {
                return Err(AcquisitionError::MissingCapture { path: src_image });
            }
            let stem = format!("{base}_{tile_index}");
            moved.push(move_capture_file(&src_image, output_dir, &stem, IMAGE_EXT)?);
            moved.push(move_capture_file(
                &temp_dir.join(format!("{TEMP_CAPTURE_BASE}.{METADATA_EXT}")),
                output_dir,
                &stem,
                METADATA_EXT,
            )?);
        }
        CaptureMode::All => {
            for slot in 0..DETECTOR_SLOTS {
                let src_image =
                    temp_dir.join(format!("{TEMP_CAPTURE_BASE}_0{slot}.{IMAGE_EXT}"));
                if !src_image.exists() {
                    continue;
                }
                let stem = format!("{base}_d{slot}_{tile_index}");
                moved.push(move_capture_file(&src_image, output_dir, &stem, IMAGE_EXT)?);
                moved.push(move_capture_file(
                    &temp_dir.join(format!("{TEMP_CAPTURE_BASE}_0{slot}.{METADATA_EXT}")),
                    output_dir,
                    &stem,
                    METADATA_EXT,
                )?);
            }
            if moved.is_empty() {
                warn!(tile_index, "capture produced no detector files to relocate");
            }
        }
    }

    debug!(tile_index, files = moved.len(), "relocated capture files");
    Ok(moved)
}

fn move_capture_file(
    src: &Path,
    output_dir: &Path,
    stem: &str,
    ext: &str,
) -> Result<PathBuf, AcquisitionError> {
    let dst = output_dir.join(format!("{stem}.{ext}"));
    move_file(src, &dst).map_err(|source| AcquisitionError::Output {
        path: src.to_path_buf(),
        source,
    })?;
    Ok(dst)
}

/// Rename, falling back to copy + remove when the rename crosses a
/// filesystem boundary.
fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dst)?;
            fs::remove_file(src)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
