//! Focus-recovery integration tests: move sequencing through the public API.

use sem_montage::focus::{recover_focus, FocusOutcome};
use sem_montage::geometry::StagePosition;

use super::test_utils::{Op, RecordingInstrument};

#[test]
fn test_exhausted_search_rolls_position_back_but_not_focus() {
    // Every autofocus jumps the working distance by 500 um against a 100 um
    // threshold: the search exhausts its budget.
    let mut sem = RecordingInstrument::new()
        .with_position(StagePosition::new(10_000, 0))
        .with_afc_deltas(&[500.0]);
    let focus_before = sem.current_focus();

    let outcome = recover_focus(&mut sem, 5_000.0, 100.0, 10_000, 3).unwrap();
    assert_eq!(outcome, FocusOutcome::Exhausted);

    // Probes advance by 500 nm (0.1 * 5000) three times, then unwind.
    assert_eq!(
        sem.move_xs(),
        vec![10_500, 11_000, 11_500, 11_000, 10_500, 10_000]
    );
    assert_eq!(sem.current_position(), StagePosition::new(10_000, 0));

    // Position rolled back fully; focus is wherever the last failed attempt
    // left it. Each failed attempt reverts to the pre-attempt coarse value,
    // so after the final revert the focus equals its starting value here,
    // but the revert itself must have been issued four times.
    assert_eq!(sem.count(|op| matches!(op, Op::SetFocus(_))), 4);
    assert_eq!(sem.current_focus(), focus_before);
}

#[test]
fn test_deep_success_commits_focus_and_restores_position() {
    // Two bad planes, then a clean lock on the third attempt.
    let mut sem = RecordingInstrument::new().with_afc_deltas(&[500.0, 500.0, 10.0]);
    let focus_before = sem.current_focus();

    let outcome = recover_focus(&mut sem, 5_000.0, 100.0, 0, 5).unwrap();
    assert_eq!(outcome, FocusOutcome::Locked { attempts: 3 });

    // The stage unwinds to the anchor even though focus succeeded away from
    // it; the successful focus survives the unwind.
    assert_eq!(sem.move_xs(), vec![500, 1_000, 500, 0]);
    assert_eq!(sem.current_position(), StagePosition::new(0, 0));
    assert!(
        (sem.current_focus() - (focus_before + 0.01)).abs() < 1e-9,
        "the third attempt's focus shift must be kept"
    );
}

#[test]
fn test_first_try_lock_issues_no_motion() {
    let mut sem = RecordingInstrument::new().with_afc_deltas(&[50.0]);

    let outcome = recover_focus(&mut sem, 5_000.0, 100.0, 7_777, 5).unwrap();

    assert_eq!(outcome, FocusOutcome::Locked { attempts: 1 });
    assert_eq!(sem.count(|op| matches!(op, Op::AutoAfc)), 1);
    assert_eq!(sem.count(|op| matches!(op, Op::Move { .. })), 0);
}
