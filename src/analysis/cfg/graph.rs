//! Control Flow Graph implementation.
//!
//! This module provides the main [`ControlFlowGraph`] structure that wraps basic blocks
//! with graph semantics: a single entry, at most one exit, and read-only adjacency
//! once construction has finished.

use crate::{
    analysis::cfg::{BasicBlock, BlockId, ElementaryBlock},
    ir::Local,
    utils::graph::DirectedGraph,
    Result,
};

/// A normalized control flow graph of one procedure.
///
/// Graphs are created through [`CfgBuilder`](crate::analysis::cfg::CfgBuilder),
/// which guarantees exactly one entry block and at most one exit block. A graph
/// without an exit (every path ends in an infinite loop) can still be analyzed by
/// forward analyses.
///
/// # Thread Safety
///
/// `ControlFlowGraph` is [`Send`] and [`Sync`]. The only interior mutability is the
/// per-instruction breakpoint flag, which is atomic.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    /// The underlying directed graph structure.
    graph: DirectedGraph<BasicBlock>,
    /// The unique block without predecessors.
    entry: BlockId,
    /// The unique block without successors, if any.
    exit: Option<BlockId>,
    /// Every local declared or mentioned by an instruction, in name order.
    universe: Vec<Local>,
    /// Number of instructions over all blocks; ids are `0..instruction_count`.
    instruction_count: usize,
}

impl ControlFlowGraph {
    pub(crate) fn new(
        graph: DirectedGraph<BasicBlock>,
        entry: BlockId,
        exit: Option<BlockId>,
        universe: Vec<Local>,
        instruction_count: usize,
    ) -> Self {
        Self {
            graph,
            entry,
            exit,
            universe,
            instruction_count,
        }
    }

    /// Returns the entry block.
    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.entry
    }

    /// Returns the exit block, or `None` if no block is without successors.
    #[must_use]
    pub const fn exit(&self) -> Option<BlockId> {
        self.exit
    }

    /// Returns the block with the given id.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.graph.node(id)
    }

    /// Returns the block with the given id, failing for an unknown id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if the block does not belong to this graph.
    pub fn try_block(&self, id: BlockId) -> Result<&BasicBlock> {
        self.block(id).ok_or_else(|| {
            invalid_argument!(
                "block {} does not exist in graph with {} blocks",
                id,
                self.block_count()
            )
        })
    }

    /// Returns an iterator over all blocks in id order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> + '_ {
        self.graph.nodes().map(|(_, block)| block)
    }

    /// Returns an iterator over all block ids.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.node_ids()
    }

    /// Returns the number of blocks, including synthetic ones.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the successors of `id`.
    pub fn successors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.successors(id)
    }

    /// Returns the predecessors of `id`.
    pub fn predecessors(&self, id: BlockId) -> impl Iterator<Item = BlockId> + '_ {
        self.graph.predecessors(id)
    }

    /// Returns the locals of the procedure, ordered by name.
    #[must_use]
    pub fn universe(&self) -> &[Local] {
        &self.universe
    }

    /// Returns the number of instructions over all blocks.
    #[must_use]
    pub const fn instruction_count(&self) -> usize {
        self.instruction_count
    }

    /// Looks up the elementary block with the given global instruction id.
    #[must_use]
    pub fn instruction(&self, id: usize) -> Option<&ElementaryBlock> {
        self.blocks()
            .flat_map(BasicBlock::elementary_blocks)
            .find(|elementary| elementary.id() == id)
    }

    /// Sets or clears the breakpoint on the instruction with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if no instruction has this id.
    pub fn set_breakpoint(&self, instruction: usize, enabled: bool) -> Result<()> {
        let elementary = self.instruction(instruction).ok_or_else(|| {
            invalid_argument!(
                "instruction {} does not exist in graph with {} instructions",
                instruction,
                self.instruction_count
            )
        })?;
        elementary.set_breakpoint(enabled);
        Ok(())
    }
}
