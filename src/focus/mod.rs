//! Focus recovery.
//!
//! The autofocus primitive occasionally locks onto the wrong plane: debris,
//! a void, the edge of the sample. That shows up as a large jump in working
//! distance. Recovery probes sideways: displace the stage by a fraction of
//! the tile width, try again, and keep displacing (cumulatively) until the
//! working distance settles or the attempt budget runs out.
//!
//! The search is a branching-factor-1 recursion along the X axis with
//! position rollback coupled to the call/return structure. It is implemented
//! here as an explicit frame stack: one anchor pushed before each probe move,
//! popped and restored after the search finishes, preserving the exact
//! per-depth LIFO rollback ordering of the recursive formulation without
//! relying on call-stack depth.

use tracing::{debug, warn};

use crate::error::InstrumentError;
use crate::instrument::Instrument;

/// Default focus attempt budget (initial attempt plus this many displaced
/// retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Probe displacement per depth, as a fraction of the tile width.
pub const PROBE_STEP_FRACTION: f64 = 0.1;

/// Result of a focus-recovery search.
///
/// Exhaustion is not an error: acquisition proceeds with best-effort focus,
/// and the caller decides how loudly to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The working distance settled within the threshold
    Locked {
        /// Number of autofocus invocations it took (1 = first try)
        attempts: u32,
    },

    /// Every attempt exceeded the threshold; focus is left at the last
    /// autofocus result
    Exhausted,
}

impl FocusOutcome {
    /// Whether focus was successfully recovered.
    pub fn is_locked(&self) -> bool {
        matches!(self, FocusOutcome::Locked { .. })
    }
}

/// Attempt to focus at `anchor_x`, probing sideways on failure.
///
/// At depth 0 the autofocus runs in place. Each further depth displaces the
/// probe by `0.1 * tile_width_nm` (truncated to whole nanometres) relative to
/// the previous probe (displacement compounds), moves the stage there, and
/// tries again. An attempt succeeds when the working-distance change is at
/// most `threshold_um`; a failed attempt has its coarse focus value reverted
/// before the next probe.
///
/// On the way out, every probe move is unwound in reverse order, one stage
/// move per depth, ending back at `anchor_x`, whether or not focus was
/// recovered. The focus state is deliberately asymmetric: on success the new
/// focus is kept, on exhaustion the focus stays wherever the last autofocus
/// left it, while the position always rolls back fully.
///
/// A total failure therefore issues exactly `max_attempts` forward probe
/// moves, `max_attempts + 1` autofocus calls, and `max_attempts` restore
/// moves; a first-try success issues one autofocus call and no moves at all.
///
/// # Errors
///
/// Any instrument failure aborts the search immediately and propagates. Probe
/// moves already made are not unwound in that case: the instrument is in an
/// unknown state and further motion is the operator's call.
pub fn recover_focus<I: Instrument>(
    instrument: &mut I,
    tile_width_nm: f64,
    threshold_um: f64,
    anchor_x: i64,
    max_attempts: u32,
) -> Result<FocusOutcome, InstrumentError> {
    let step_nm = (PROBE_STEP_FRACTION * tile_width_nm) as i64;

    let mut probe_x = anchor_x;
    let mut restore_stack: Vec<i64> = Vec::new();
    let mut outcome = FocusOutcome::Exhausted;

    for depth in 0..=max_attempts {
        if depth > 0 {
            // Push this frame's entry anchor before displacing the probe.
            restore_stack.push(probe_x);
            probe_x += step_nm;
            debug!(depth, probe_x, "probing for focus at displaced position");
            instrument.move_stage(Some(probe_x), None)?;
        }

        let coarse_before = instrument.focus()?;
        let wd_before = instrument.working_distance()?;
        instrument.run_auto_afc()?;
        let wd_after = instrument.working_distance()?;

        let delta_um = (wd_after - wd_before).abs();
        if delta_um <= threshold_um {
            debug!(depth, delta_um, "focus locked");
            outcome = FocusOutcome::Locked { attempts: depth + 1 };
            break;
        }

        warn!(
            depth,
            delta_um, threshold_um, "working distance jumped, reverting focus"
        );
        instrument.set_focus(coarse_before)?;
    }

    // Unwind the probe moves depth by depth, LIFO, regardless of outcome.
    while let Some(entry_anchor) = restore_stack.pop() {
        instrument.move_stage(Some(entry_anchor), None)?;
    }

    Ok(outcome)
}

// =============================================================================
// Tests
// =============================================================================
