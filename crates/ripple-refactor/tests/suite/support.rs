use std::cell::{Cell, RefCell};

use ripple_core::{MethodId, ProgressMonitor, RippleProgress};
use ripple_index::{TypeDecl, TypeUniverse};

pub(crate) fn universe(decls: impl IntoIterator<Item = TypeDecl>) -> TypeUniverse {
    TypeUniverse::new(decls).expect("fixture universe is valid")
}

pub(crate) fn method(universe: &TypeUniverse, ty: &str, name: &str) -> MethodId {
    universe
        .method(ty, name, Vec::<&str>::new())
        .unwrap_or_else(|| panic!("fixture declares {ty}#{name}()"))
}

/// `Type#name(..)` strings, sorted, for order-insensitive comparisons.
pub(crate) fn names(methods: &[MethodId]) -> Vec<String> {
    let mut out: Vec<String> = methods.iter().map(ToString::to_string).collect();
    out.sort();
    out
}

/// Records progress events and cancels once a chosen marriage round starts.
#[derive(Default)]
pub(crate) struct RecordingMonitor {
    cancel_at_round: Option<u32>,
    cancelled: Cell<bool>,
    events: RefCell<Vec<RippleProgress>>,
}

impl RecordingMonitor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancelling_at_round(round: u32) -> Self {
        Self {
            cancel_at_round: Some(round),
            ..Self::default()
        }
    }

    pub(crate) fn events(&self) -> Vec<RippleProgress> {
        self.events.borrow().clone()
    }
}

impl ProgressMonitor for RecordingMonitor {
    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn report(&self, progress: RippleProgress) {
        if let RippleProgress::MarriageRound(round) = progress {
            if Some(round) == self.cancel_at_round {
                self.cancelled.set(true);
            }
        }
        self.events.borrow_mut().push(progress);
    }
}
