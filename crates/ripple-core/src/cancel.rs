use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Coarse milestones of one ripple computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RippleProgress {
    SearchFinished { matches: usize },
    PartitionsBuilt { partitions: usize },
    MarriageRound(u32),
    Done,
}

/// Cooperative cancellation plus progress reporting, polled by long-running computations.
pub trait ProgressMonitor {
    fn is_cancelled(&self) -> bool;

    fn report(&self, _progress: RippleProgress) {}
}

#[derive(Debug, Default, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl ProgressMonitor for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}
