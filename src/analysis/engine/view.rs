//! Type-erased access to a navigated history.

use crate::analysis::{
    cfg::{BlockId, ControlFlowGraph},
    dataflow::{Direction, LatticeElement},
    engine::{
        history::Navigator,
        state::{BlockColor, Cursor},
    },
};

/// Navigation and rendering over a history, independent of its element type.
///
/// This is what a presentation layer holds after picking an analysis through
/// [`AnalysisKind`](crate::analysis::AnalysisKind). Every state is exposed through
/// its rendered form.
pub trait StepView: Send + Sync {
    /// Name of the analysis.
    fn name(&self) -> &'static str;

    /// Direction of the analysis.
    fn direction(&self) -> Direction;

    /// The analysed graph.
    fn cfg(&self) -> &ControlFlowGraph;

    /// Number of elementary steps.
    fn elementary_step_count(&self) -> usize;

    /// Number of block steps.
    fn block_step_count(&self) -> usize;

    /// See [`Navigator::current_elementary_step`].
    fn current_elementary_step(&self) -> usize;

    /// See [`Navigator::current_block_step`].
    fn current_block_step(&self) -> usize;

    /// See [`Navigator::set_current_elementary_step`].
    fn set_current_elementary_step(&mut self, step: usize);

    /// See [`Navigator::set_current_block_step`].
    fn set_current_block_step(&mut self, step: usize);

    /// See [`Navigator::next_elementary_step`].
    fn next_elementary_step(&mut self) -> bool;

    /// See [`Navigator::previous_elementary_step`].
    fn previous_elementary_step(&mut self) -> bool;

    /// See [`Navigator::next_block_step`].
    fn next_block_step(&mut self) -> bool;

    /// See [`Navigator::previous_block_step`].
    fn previous_block_step(&mut self) -> bool;

    /// See [`Navigator::is_at_breakpoint`].
    fn is_at_breakpoint(&self) -> bool;

    /// See [`Navigator::run_to_breakpoint`].
    fn run_to_breakpoint(&mut self) -> bool;

    /// Position of the current snapshot.
    fn cursor(&self) -> Option<Cursor>;

    /// Worklist contents of the current snapshot.
    fn worklist(&self) -> Vec<BlockId>;

    /// Color of `block` in the current snapshot.
    fn color(&self, block: BlockId) -> Option<BlockColor>;

    /// Rendered in-state of the block under the cursor.
    fn render_in_state(&self) -> String;

    /// Rendered (partial) out-state of the block under the cursor.
    fn render_out_state(&self) -> String;

    /// Rendered in- and out-state of `block` in the current snapshot.
    fn render_block_state(&self, block: BlockId) -> Option<(String, String)>;
}

impl<E: LatticeElement> StepView for Navigator<E> {
    fn name(&self) -> &'static str {
        self.history().name()
    }

    fn direction(&self) -> Direction {
        self.history().direction()
    }

    fn cfg(&self) -> &ControlFlowGraph {
        self.history().cfg()
    }

    fn elementary_step_count(&self) -> usize {
        self.history().len()
    }

    fn block_step_count(&self) -> usize {
        self.history().block_step_count()
    }

    fn current_elementary_step(&self) -> usize {
        Navigator::current_elementary_step(self)
    }

    fn current_block_step(&self) -> usize {
        Navigator::current_block_step(self)
    }

    fn set_current_elementary_step(&mut self, step: usize) {
        Navigator::set_current_elementary_step(self, step);
    }

    fn set_current_block_step(&mut self, step: usize) {
        Navigator::set_current_block_step(self, step);
    }

    fn next_elementary_step(&mut self) -> bool {
        Navigator::next_elementary_step(self)
    }

    fn previous_elementary_step(&mut self) -> bool {
        Navigator::previous_elementary_step(self)
    }

    fn next_block_step(&mut self) -> bool {
        Navigator::next_block_step(self)
    }

    fn previous_block_step(&mut self) -> bool {
        Navigator::previous_block_step(self)
    }

    fn is_at_breakpoint(&self) -> bool {
        Navigator::is_at_breakpoint(self)
    }

    fn run_to_breakpoint(&mut self) -> bool {
        Navigator::run_to_breakpoint(self)
    }

    fn cursor(&self) -> Option<Cursor> {
        self.current_state().map(|state| state.cursor())
    }

    fn worklist(&self) -> Vec<BlockId> {
        self.current_state()
            .map(|state| state.worklist().to_vec())
            .unwrap_or_default()
    }

    fn color(&self, block: BlockId) -> Option<BlockColor> {
        self.current_state()?.color(block)
    }

    fn render_in_state(&self) -> String {
        self.current_state()
            .map(|state| state.current().in_state.render())
            .unwrap_or_default()
    }

    fn render_out_state(&self) -> String {
        self.current_state()
            .map(|state| state.current().out_state.render())
            .unwrap_or_default()
    }

    fn render_block_state(&self, block: BlockId) -> Option<(String, String)> {
        let state = self.current_state()?.block_state(block)?;
        Some((state.in_state.render(), state.out_state.render()))
    }
}
