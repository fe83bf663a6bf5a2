//! Immutable per-step snapshots.

use std::sync::Arc;

use strum::{Display, EnumIter};

use crate::analysis::{cfg::BlockId, dataflow::BlockState};

/// How a block is displayed in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BlockColor {
    /// The block being processed.
    Current,
    /// Never dequeued so far.
    NotVisited,
    /// Waiting on the worklist.
    OnWorklist,
    /// Processed at least once and not queued.
    VisitedNotOnWorklist,
}

/// Position of a snapshot inside the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// The block being processed.
    pub block: BlockId,
    /// Index of the elementary block inside `block`, in program order.
    pub elementary: usize,
}

/// One history entry: the complete analysis state after one elementary step.
///
/// Block states are shared with neighbouring snapshots through [`Arc`]; a
/// snapshot is never modified after it was recorded.
#[derive(Debug, Clone)]
pub struct AnalysisState<E> {
    worklist: Vec<BlockId>,
    colors: Vec<BlockColor>,
    states: Vec<Arc<BlockState<E>>>,
    cursor: Cursor,
}

impl<E> AnalysisState<E> {
    pub(crate) fn new(
        worklist: Vec<BlockId>,
        colors: Vec<BlockColor>,
        states: Vec<Arc<BlockState<E>>>,
        cursor: Cursor,
    ) -> Self {
        Self {
            worklist,
            colors,
            states,
            cursor,
        }
    }

    /// Worklist contents in polling order (for a random worklist, the order of
    /// its backing store).
    pub fn worklist(&self) -> &[BlockId] {
        &self.worklist
    }

    /// Color of `block`, or `None` if it is not part of the graph.
    pub fn color(&self, block: BlockId) -> Option<BlockColor> {
        self.colors.get(block.index()).copied()
    }

    /// Colors of all blocks, indexed by block id.
    pub fn colors(&self) -> &[BlockColor] {
        &self.colors
    }

    /// State pair of `block`, or `None` if it is not part of the graph.
    pub fn block_state(&self, block: BlockId) -> Option<&BlockState<E>> {
        self.states.get(block.index()).map(Arc::as_ref)
    }

    /// State pairs of all blocks, indexed by block id.
    pub fn block_states(&self) -> impl Iterator<Item = &BlockState<E>> + '_ {
        self.states.iter().map(Arc::as_ref)
    }

    /// The block and instruction this snapshot was taken at.
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// State pair of the block under the cursor. The engine only records cursors
    /// that point into `states`.
    pub fn current(&self) -> &BlockState<E> {
        &self.states[self.cursor.block.index()]
    }
}
