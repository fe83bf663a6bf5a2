//! Worklist policies deciding the order blocks are (re)visited.
//!
//! The policy changes only the visible step sequence of a run. Since every join is
//! commutative, associative and idempotent and every transfer is monotone over a
//! finite-height lattice, all policies reach the same fixpoint.

use std::{collections::VecDeque, fmt::Debug};

use rand::{rngs::StdRng, Rng, SeedableRng};
use strum::{Display, EnumIter};

use crate::analysis::cfg::BlockId;

/// A set of blocks awaiting processing, with a policy-defined removal order.
///
/// A block is never queued twice.
pub trait Worklist: Debug + Send {
    /// Queues `block`. Returns `false` if it was already queued.
    fn add(&mut self, block: BlockId) -> bool;

    /// Removes and returns the next block, or `None` if empty.
    fn poll(&mut self) -> Option<BlockId>;

    /// Returns the block the next [`poll`](Self::poll) will return.
    fn peek(&self) -> Option<BlockId>;

    /// Returns `true` if `block` is queued.
    fn contains(&self, block: BlockId) -> bool;

    /// Returns the queued blocks.
    fn iter(&self) -> Box<dyn Iterator<Item = BlockId> + '_>;

    /// Returns the number of queued blocks.
    fn len(&self) -> usize;

    /// Returns `true` if no block is queued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an independent deep copy.
    fn box_clone(&self) -> Box<dyn Worklist>;
}

impl Clone for Box<dyn Worklist> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// First-in first-out worklist.
#[derive(Debug, Clone, Default)]
pub struct NaiveWorklist {
    queue: VecDeque<BlockId>,
}

impl NaiveWorklist {
    /// Creates an empty worklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Worklist for NaiveWorklist {
    fn add(&mut self, block: BlockId) -> bool {
        if self.queue.contains(&block) {
            return false;
        }
        self.queue.push_back(block);
        true
    }

    fn poll(&mut self) -> Option<BlockId> {
        self.queue.pop_front()
    }

    fn peek(&self) -> Option<BlockId> {
        self.queue.front().copied()
    }

    fn contains(&self, block: BlockId) -> bool {
        self.queue.contains(&block)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = BlockId> + '_> {
        Box::new(self.queue.iter().copied())
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn box_clone(&self) -> Box<dyn Worklist> {
        Box::new(self.clone())
    }
}

/// Worklist removing a uniformly random queued block.
///
/// The next block is drawn ahead of time, so [`peek`](Worklist::peek) reports
/// exactly what [`poll`](Worklist::poll) returns. Adding a block keeps the draw
/// uniform over all queued blocks.
#[derive(Debug, Clone)]
pub struct RandomWorklist {
    items: Vec<BlockId>,
    next: Option<usize>,
    rng: StdRng,
}

impl RandomWorklist {
    /// Creates an empty worklist with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Creates an empty worklist seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            next: None,
            rng,
        }
    }
}

impl Worklist for RandomWorklist {
    fn add(&mut self, block: BlockId) -> bool {
        if self.items.contains(&block) {
            return false;
        }
        self.items.push(block);
        let count = self.items.len();
        // Replace the pending draw with probability 1/count
        if self.next.is_none() || self.rng.gen_range(0..count) == count - 1 {
            self.next = Some(count - 1);
        }
        true
    }

    fn poll(&mut self) -> Option<BlockId> {
        let index = self.next.take()?;
        let block = self.items.swap_remove(index);
        if !self.items.is_empty() {
            self.next = Some(self.rng.gen_range(0..self.items.len()));
        }
        Some(block)
    }

    fn peek(&self) -> Option<BlockId> {
        self.next.map(|index| self.items[index])
    }

    fn contains(&self, block: BlockId) -> bool {
        self.items.contains(&block)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = BlockId> + '_> {
        Box::new(self.items.iter().copied())
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn box_clone(&self) -> Box<dyn Worklist> {
        Box::new(self.clone())
    }
}

/// Selects a worklist implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter)]
pub enum WorklistPolicy {
    /// [`NaiveWorklist`]
    #[default]
    Naive,
    /// [`RandomWorklist`]
    Random,
}

/// Creates an empty worklist for `policy`.
///
/// `seed` fixes the random order of [`WorklistPolicy::Random`]; without one the
/// order differs between runs. FIFO ignores it.
#[must_use]
pub fn create_worklist(policy: WorklistPolicy, seed: Option<u64>) -> Box<dyn Worklist> {
    match (policy, seed) {
        (WorklistPolicy::Naive, _) => Box::new(NaiveWorklist::new()),
        (WorklistPolicy::Random, Some(seed)) => Box::new(RandomWorklist::with_seed(seed)),
        (WorklistPolicy::Random, None) => Box::new(RandomWorklist::from_entropy()),
    }
}
