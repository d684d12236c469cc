//! Tile-selection masks.
//!
//! A mask is an arbitrary bitmap binarized down to the planned tile grid:
//! bright regions mean "capture this tile", dark regions mean "skip it". The
//! module has two halves:
//!
//! - [`raster`] - resampling a source bitmap to the grid shape and
//!   thresholding it into a [`TileMask`]
//! - [`grid`] - the boolean grid itself, its serpentine flattening, and its
//!   application to a planned scan path
//!
//! Applying a mask whose shape does not match the plan is a fatal
//! precondition failure, detected before any hardware motion.

pub mod grid;
pub mod raster;

pub use grid::{apply_mask, TileMask};
pub use raster::{load_mask, rasterize};
