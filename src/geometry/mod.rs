//! Montage geometry.
//!
//! This module converts physical montage dimensions into a deterministic scan
//! path. It has two halves:
//!
//! - [`planner`] - serpentine (boustrophedon) tile-position generation from a
//!   [`MontageSpec`], with the total span truncated down to a whole number of
//!   effective (overlap-reduced) tiles
//! - [`field_of_view`] - conversion of magnification and the instrument's
//!   photo frame-size factor into the physical tile dimensions
//!
//! All stage coordinates are expressed in nanometres, the canonical internal
//! unit of the crate. Any externally supplied physical unit must be converted
//! before these functions are invoked.

pub mod field_of_view;
pub mod planner;

pub use field_of_view::{
    tile_size, TileSize, FRAME_HEIGHT_NUMERATOR_NM, FRAME_WIDTH_NUMERATOR_NM,
};
pub use planner::{plan_montage, MontagePlan, MontageSpec, StagePosition};
