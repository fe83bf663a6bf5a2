//! Configuration for a precalculation run.

use std::time::Duration;

use crate::analysis::dataflow::WorklistPolicy;

/// Default interval at which a paused worker re-checks its controller.
pub const DEFAULT_PAUSE_POLL: Duration = Duration::from_millis(50);

/// Configuration for one [`DfaExecution`](super::DfaExecution).
///
/// Only affects how the fixpoint is reached, never which fixpoint: every policy
/// and seed yields the same final block states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Order in which queued blocks are visited (default: FIFO).
    pub worklist: WorklistPolicy,

    /// Seed for [`WorklistPolicy::Random`]. `None` draws from system entropy.
    pub seed: Option<u64>,

    /// How often a paused worker wakes up to re-check its state (default: 50ms).
    ///
    /// Overridden by the `wait_time` passed to
    /// [`Controller::pause_precalc`](super::Controller::pause_precalc).
    pub pause_poll: Duration,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            worklist: WorklistPolicy::Naive,
            seed: None,
            pause_poll: DEFAULT_PAUSE_POLL,
        }
    }
}

impl ExecutionConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the worklist policy.
    #[must_use]
    pub fn with_worklist(mut self, worklist: WorklistPolicy) -> Self {
        self.worklist = worklist;
        self
    }

    /// Fixes the random seed, making [`WorklistPolicy::Random`] runs reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the pause poll interval.
    #[must_use]
    pub fn with_pause_poll(mut self, pause_poll: Duration) -> Self {
        self.pause_poll = pause_poll;
        self
    }
}
