//! The recorded history of a run and a cursor over it.
//!
//! A [`History`] holds one [`AnalysisState`] per elementary step plus the indices at
//! which each block step begins. A [`Navigator`] moves two linked cursors over it:
//! an elementary cursor and the block step enclosing it.

use std::sync::Arc;

use crate::analysis::{
    cfg::ControlFlowGraph,
    dataflow::Direction,
    engine::state::AnalysisState,
};

/// Every snapshot recorded by one run.
#[derive(Debug)]
pub struct History<E> {
    name: &'static str,
    direction: Direction,
    cfg: Arc<ControlFlowGraph>,
    states: Vec<AnalysisState<E>>,
    block_starts: Vec<usize>,
}

impl<E> History<E> {
    pub(crate) fn new(
        name: &'static str,
        direction: Direction,
        cfg: Arc<ControlFlowGraph>,
        states: Vec<AnalysisState<E>>,
        block_starts: Vec<usize>,
    ) -> Self {
        Self {
            name,
            direction,
            cfg,
            states,
            block_starts,
        }
    }

    /// Name of the analysis that produced this history.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direction of the analysis that produced this history.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The analysed graph.
    pub fn cfg(&self) -> &ControlFlowGraph {
        &self.cfg
    }

    /// Number of elementary steps.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no step was recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of block steps (dequeues).
    pub fn block_step_count(&self) -> usize {
        self.block_starts.len()
    }

    /// The snapshot after elementary step `step`.
    pub fn state(&self, step: usize) -> Option<&AnalysisState<E>> {
        self.states.get(step)
    }

    /// All snapshots in recording order.
    pub fn states(&self) -> &[AnalysisState<E>] {
        &self.states
    }

    /// The last snapshot, holding the fixpoint of a completed run.
    pub fn last(&self) -> Option<&AnalysisState<E>> {
        self.states.last()
    }

    /// First elementary step of block step `block_step`.
    pub fn block_start(&self, block_step: usize) -> Option<usize> {
        self.block_starts.get(block_step).copied()
    }

    /// The block step enclosing elementary step `step`.
    pub fn block_step_of(&self, step: usize) -> usize {
        self.block_starts
            .partition_point(|&start| start <= step)
            .saturating_sub(1)
    }
}

/// Two linked cursors over a [`History`].
///
/// Setters clamp to the recorded range. Moving one cursor moves the other: an
/// elementary step selects its enclosing block step, and a block step selects its
/// first elementary step.
#[derive(Debug, Clone)]
pub struct Navigator<E> {
    history: Arc<History<E>>,
    elementary: usize,
    block: usize,
}

impl<E> Navigator<E> {
    /// Creates a navigator positioned on the first step.
    pub fn new(history: Arc<History<E>>) -> Self {
        Self {
            history,
            elementary: 0,
            block: 0,
        }
    }

    /// The navigated history.
    pub fn history(&self) -> &Arc<History<E>> {
        &self.history
    }

    /// Index of the current elementary step.
    pub fn current_elementary_step(&self) -> usize {
        self.elementary
    }

    /// Index of the current block step.
    pub fn current_block_step(&self) -> usize {
        self.block
    }

    /// Moves to elementary step `step`, clamped to the recorded range.
    pub fn set_current_elementary_step(&mut self, step: usize) {
        self.elementary = step.min(self.history.len().saturating_sub(1));
        self.block = self.history.block_step_of(self.elementary);
    }

    /// Moves to the first elementary step of block step `step`, clamped to the
    /// recorded range.
    pub fn set_current_block_step(&mut self, step: usize) {
        self.block = step.min(self.history.block_step_count().saturating_sub(1));
        self.elementary = self.history.block_start(self.block).unwrap_or(0);
    }

    /// Advances one elementary step. Returns `false` at the end.
    pub fn next_elementary_step(&mut self) -> bool {
        let before = self.elementary;
        self.set_current_elementary_step(before.saturating_add(1));
        self.elementary != before
    }

    /// Goes back one elementary step. Returns `false` at the start.
    pub fn previous_elementary_step(&mut self) -> bool {
        let before = self.elementary;
        self.set_current_elementary_step(before.saturating_sub(1));
        self.elementary != before
    }

    /// Advances to the start of the next block step. Returns `false` at the end.
    pub fn next_block_step(&mut self) -> bool {
        let before = self.block;
        self.set_current_block_step(before.saturating_add(1));
        self.block != before
    }

    /// Goes back to the start of the previous block step. Returns `false` at the
    /// start.
    pub fn previous_block_step(&mut self) -> bool {
        let before = self.block;
        self.set_current_block_step(before.saturating_sub(1));
        self.block != before
    }

    /// The snapshot under the cursor, `None` for an empty history.
    pub fn current_state(&self) -> Option<&AnalysisState<E>> {
        self.history.state(self.elementary)
    }

    /// Returns `true` if the instruction under the cursor carries a breakpoint.
    ///
    /// Breakpoints are read live, so toggling one affects recorded histories too.
    pub fn is_at_breakpoint(&self) -> bool {
        self.current_state()
            .and_then(|state| {
                let cursor = state.cursor();
                self.history
                    .cfg()
                    .block(cursor.block)?
                    .elementary(cursor.elementary)
                    .map(|block| block.breakpoint())
            })
            .unwrap_or(false)
    }

    /// Advances at least one elementary step, then keeps going until a breakpoint
    /// or the last step. Returns `true` if it stopped on a breakpoint.
    pub fn run_to_breakpoint(&mut self) -> bool {
        while self.next_elementary_step() {
            if self.is_at_breakpoint() {
                return true;
            }
        }
        false
    }
}
