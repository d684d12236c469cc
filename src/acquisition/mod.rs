//! Acquisition orchestration.
//!
//! The [`AcquisitionController`] ties the core together: it plans the scan
//! path, applies the optional mask, and then drives the instrument through
//! the per-tile loop (move, auto-adjust, focus recovery, capture, file
//! relocation, resume scan), finishing with a return to the start position
//! and an optional HV shutdown.
//!
//! Everything here is orchestration over the [`crate::geometry`],
//! [`crate::mask`], [`crate::focus`] and [`crate::instrument`] modules.

pub mod controller;
pub mod output;
pub mod settings;

pub use controller::{AcquisitionController, AcquisitionReport};
pub use output::{relocate_captures, TEMP_CAPTURE_BASE};
pub use settings::AcquisitionSettings;
