use pretty_assertions::assert_eq;
use ripple_core::{CancellationToken, RippleProgress};
use ripple_refactor::{related_methods, RippleError, RippleMethodFinder};

use super::marriage::interface_chain;
use super::support::{method, RecordingMonitor};

#[test]
fn cancellation_in_third_marriage_round_aborts() {
    let universe = interface_chain();
    let seed = method(&universe, "p.P", "m");
    let monitor = RecordingMonitor::cancelling_at_round(3);

    let err = RippleMethodFinder::new(&universe, seed)
        .run(&monitor)
        .unwrap_err();
    assert_eq!(err, RippleError::Cancelled);
    assert_eq!(
        monitor.events().last(),
        Some(&RippleProgress::MarriageRound(3))
    );
    assert!(!monitor.events().contains(&RippleProgress::Done));
}

#[test]
fn cancelled_before_start_returns_no_result() {
    let universe = interface_chain();
    let seed = method(&universe, "p.P", "m");
    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(
        related_methods(&universe, &seed, true, &token),
        Err(RippleError::Cancelled)
    );
}

#[test]
fn uncancelled_chain_completes() {
    let universe = interface_chain();
    let seed = method(&universe, "p.P", "m");
    let monitor = RecordingMonitor::cancelling_at_round(5);

    let outcome = RippleMethodFinder::new(&universe, seed).run(&monitor).unwrap();
    assert_eq!(outcome.methods.len(), 4);
    assert_eq!(monitor.events().last(), Some(&RippleProgress::Done));
}
