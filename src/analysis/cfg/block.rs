//! Basic and elementary blocks.
//!
//! A [`BasicBlock`] is one maximal straight-line region of a procedure. It owns one
//! [`ElementaryBlock`] per instruction; elementary blocks are the unit the history
//! engine records a step for, and the unit a breakpoint is attached to.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{ir::Instruction, utils::graph::NodeId};

/// Identifier of a basic block within its control flow graph.
pub type BlockId = NodeId;

/// A single instruction wrapped with its global id and a breakpoint flag.
///
/// The breakpoint flag is atomic so a presentation thread can toggle it while a
/// precalculation on another thread reads the graph.
#[derive(Debug)]
pub struct ElementaryBlock {
    id: usize,
    instruction: Instruction,
    breakpoint: AtomicBool,
}

impl ElementaryBlock {
    pub(crate) fn new(id: usize, instruction: Instruction) -> Self {
        Self {
            id,
            instruction,
            breakpoint: AtomicBool::new(false),
        }
    }

    /// Returns the global instruction id, unique within the procedure.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Returns the wrapped instruction.
    #[must_use]
    pub const fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    /// Returns `true` if a breakpoint is set on this instruction.
    #[must_use]
    pub fn breakpoint(&self) -> bool {
        self.breakpoint.load(Ordering::Relaxed)
    }

    /// Sets or clears the breakpoint on this instruction.
    pub fn set_breakpoint(&self, enabled: bool) {
        self.breakpoint.store(enabled, Ordering::Relaxed);
    }

    /// Flips the breakpoint and returns the new setting.
    pub fn toggle_breakpoint(&self) -> bool {
        !self.breakpoint.fetch_xor(true, Ordering::Relaxed)
    }
}

impl Clone for ElementaryBlock {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            instruction: self.instruction.clone(),
            breakpoint: AtomicBool::new(self.breakpoint()),
        }
    }
}

impl fmt::Display for ElementaryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instruction)
    }
}

/// A maximal straight-line sequence of instructions.
///
/// Synthetic entry and exit blocks inserted during normalization are empty.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    id: BlockId,
    elementary: Vec<ElementaryBlock>,
    synthetic: bool,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId, elementary: Vec<ElementaryBlock>) -> Self {
        Self {
            id,
            elementary,
            synthetic: false,
        }
    }

    pub(crate) fn synthetic(id: BlockId) -> Self {
        Self {
            id,
            elementary: Vec::new(),
            synthetic: true,
        }
    }

    /// Returns the block id.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Returns the elementary blocks in program order.
    #[must_use]
    pub fn elementary_blocks(&self) -> &[ElementaryBlock] {
        &self.elementary
    }

    /// Returns the elementary block at `index`, if any.
    #[must_use]
    pub fn elementary(&self, index: usize) -> Option<&ElementaryBlock> {
        self.elementary.get(index)
    }

    /// Returns the number of instructions in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elementary.len()
    }

    /// Returns `true` for a block without instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elementary.is_empty()
    }

    /// Returns `true` if this block was inserted by normalization.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Returns an iterator over the instructions in program order.
    pub fn instructions(&self) -> impl DoubleEndedIterator<Item = &Instruction> + '_ {
        self.elementary.iter().map(ElementaryBlock::instruction)
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.id)?;
        for elementary in &self.elementary {
            write!(f, "\n  {elementary}")?;
        }
        Ok(())
    }
}
