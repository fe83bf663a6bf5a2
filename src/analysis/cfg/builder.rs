//! Construction and normalization of control flow graphs.

use std::collections::BTreeSet;

use crate::{
    analysis::cfg::{BasicBlock, BlockId, ControlFlowGraph, ElementaryBlock},
    ir::{Instruction, Local},
    utils::graph::DirectedGraph,
    Result,
};

/// Incremental builder for a [`ControlFlowGraph`].
///
/// Blocks receive ids in the order they are added, and instructions receive global
/// ids in the same order. [`build`](Self::build) normalizes the graph:
///
/// - several blocks without predecessors get a synthetic empty entry block whose
///   successors are the original entries
/// - several blocks without successors get a synthetic empty exit block whose
///   predecessors are the original exits
///
/// # Examples
///
/// ```rust
/// use dfa_replay::analysis::CfgBuilder;
/// use dfa_replay::ir::{Instruction, Local, LocalType, Operand};
///
/// let x = Local::new("x", LocalType::Int);
/// let mut builder = CfgBuilder::new();
/// let first = builder.block([Instruction::assign(&x, Operand::int(1))]);
/// let second = builder.block([Instruction::Return(Some(Operand::from(&x)))]);
/// builder.edge(first, second)?;
///
/// let cfg = builder.build()?;
/// assert_eq!(cfg.entry(), first);
/// assert_eq!(cfg.exit(), Some(second));
/// assert_eq!(cfg.universe(), &[x]);
/// # Ok::<(), dfa_replay::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CfgBuilder {
    graph: DirectedGraph<BasicBlock>,
    declared: BTreeSet<Local>,
    next_instruction: usize,
}

impl CfgBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a basic block holding `instructions` and returns its id.
    pub fn block(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> BlockId {
        let id = BlockId::new(self.graph.node_count());
        let elementary = instructions
            .into_iter()
            .map(|instruction| {
                let elementary = ElementaryBlock::new(self.next_instruction, instruction);
                self.next_instruction += 1;
                elementary
            })
            .collect();
        self.graph.add_node(BasicBlock::new(id, elementary))
    }

    /// Adds a control flow edge. Adding the same edge twice has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if either block was not added to
    /// this builder.
    pub fn edge(&mut self, from: BlockId, to: BlockId) -> Result<&mut Self> {
        self.graph.add_edge(from, to)?;
        Ok(self)
    }

    /// Adds a local to the variable universe even if no instruction mentions it.
    pub fn declare_local(&mut self, local: Local) -> &mut Self {
        self.declared.insert(local);
        self
    }

    /// Finishes construction and returns the normalized graph.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalState`] if no block was added, or if every
    /// block has a predecessor so that no entry can be determined.
    pub fn build(self) -> Result<ControlFlowGraph> {
        let Self {
            mut graph,
            mut declared,
            next_instruction,
        } = self;

        if graph.is_empty() {
            return Err(illegal_state!("cannot build a control flow graph without blocks"));
        }

        let entries: Vec<BlockId> = graph
            .node_ids()
            .filter(|&id| graph.in_degree(id) == 0)
            .collect();
        let exits: Vec<BlockId> = graph
            .node_ids()
            .filter(|&id| graph.out_degree(id) == 0)
            .collect();

        let entry = match entries.as_slice() {
            [] => {
                return Err(illegal_state!(
                    "every block has a predecessor, the graph has no entry"
                ))
            }
            [single] => *single,
            several => {
                let synthetic = BasicBlock::synthetic(BlockId::new(graph.node_count()));
                let entry = graph.add_node(synthetic);
                for &target in several {
                    graph.add_edge(entry, target)?;
                }
                entry
            }
        };

        let exit = match exits.as_slice() {
            [] => None,
            [single] => Some(*single),
            several => {
                let synthetic = BasicBlock::synthetic(BlockId::new(graph.node_count()));
                let exit = graph.add_node(synthetic);
                for &source in several {
                    graph.add_edge(source, exit)?;
                }
                Some(exit)
            }
        };

        for (_, block) in graph.nodes() {
            for instruction in block.instructions() {
                declared.extend(instruction.locals().into_iter().cloned());
            }
        }

        Ok(ControlFlowGraph::new(
            graph,
            entry,
            exit,
            declared.into_iter().collect(),
            next_instruction,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{LocalType, Operand},
        Error,
    };

    #[test]
    fn test_single_entry_single_exit() {
        let mut builder = CfgBuilder::new();
        let a = builder.block([Instruction::Nop, Instruction::Goto]);
        let b = builder.block([Instruction::Return(None)]);
        builder.edge(a, b).unwrap();

        let cfg = builder.build().unwrap();
        assert_eq!(cfg.block_count(), 2);
        assert_eq!(cfg.entry(), a);
        assert_eq!(cfg.exit(), Some(b));
        assert_eq!(cfg.instruction_count(), 3);
        assert_eq!(cfg.block(b).unwrap().elementary_blocks()[0].id(), 2);
    }

    #[test]
    fn test_multiple_entries_normalized() {
        let mut builder = CfgBuilder::new();
        let a = builder.block([Instruction::Nop]);
        let b = builder.block([Instruction::Nop]);
        let c = builder.block([Instruction::Return(None)]);
        builder.edge(a, c).unwrap().edge(b, c).unwrap();

        let cfg = builder.build().unwrap();
        assert_eq!(cfg.block_count(), 4);
        let entry = cfg.entry();
        assert!(cfg.block(entry).unwrap().is_synthetic());
        assert_eq!(cfg.successors(entry).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(cfg.exit(), Some(c));
    }

    #[test]
    fn test_multiple_exits_normalized() {
        let mut builder = CfgBuilder::new();
        let a = builder.block([Instruction::branch(Operand::int(1))]);
        let b = builder.block([Instruction::Return(None)]);
        let c = builder.block([Instruction::Return(None)]);
        builder.edge(a, b).unwrap().edge(a, c).unwrap();

        let cfg = builder.build().unwrap();
        let exit = cfg.exit().unwrap();
        assert!(cfg.block(exit).unwrap().is_empty());
        assert_eq!(cfg.predecessors(exit).collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_loop_without_exit() {
        let mut builder = CfgBuilder::new();
        let a = builder.block([Instruction::Nop]);
        let b = builder.block([Instruction::Goto]);
        builder.edge(a, b).unwrap().edge(b, b).unwrap();

        let cfg = builder.build().unwrap();
        assert_eq!(cfg.exit(), None);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            CfgBuilder::new().build(),
            Err(Error::IllegalState { .. })
        ));

        let mut builder = CfgBuilder::new();
        let a = builder.block([Instruction::Goto]);
        assert!(matches!(
            builder.edge(a, BlockId::new(9)),
            Err(Error::InvalidArgument { .. })
        ));
        builder.edge(a, a).unwrap();
        assert!(matches!(builder.build(), Err(Error::IllegalState { .. })));
    }

    #[test]
    fn test_universe_collects_locals() {
        let x = Local::new("x", LocalType::Int);
        let s = Local::new("s", LocalType::Reference);
        let unused = Local::new("unused", LocalType::Long);

        let mut builder = CfgBuilder::new();
        builder.block([
            Instruction::assign(&x, Operand::int(1)),
            Instruction::assign(&s, Operand::from(&x)),
        ]);
        builder.declare_local(unused.clone());

        let cfg = builder.build().unwrap();
        assert_eq!(cfg.universe(), &[s, unused, x]);
    }

    #[test]
    fn test_set_breakpoint() {
        let mut builder = CfgBuilder::new();
        builder.block([Instruction::Nop, Instruction::Nop]);
        let cfg = builder.build().unwrap();

        cfg.set_breakpoint(1, true).unwrap();
        assert!(cfg.instruction(1).unwrap().breakpoint());
        assert!(!cfg.instruction(0).unwrap().breakpoint());
        assert!(cfg.set_breakpoint(2, true).is_err());
    }
}
