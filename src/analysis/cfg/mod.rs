//! Control Flow Graph (CFG) model and construction.
//!
//! The CFG builds upon the generic [`crate::utils::graph::DirectedGraph`] infrastructure,
//! adding IR-specific node types and the normalization every analysis relies on.
//!
//! # Key Components
//!
//! - [`ControlFlowGraph`] - The normalized graph of one procedure
//! - [`BasicBlock`] - A maximal straight-line region
//! - [`ElementaryBlock`] - One instruction plus its breakpoint flag
//! - [`CfgBuilder`] - Incremental construction with entry/exit normalization
//!
//! # Examples
//!
//! ```rust
//! use dfa_replay::analysis::CfgBuilder;
//! use dfa_replay::ir::Instruction;
//!
//! let mut builder = CfgBuilder::new();
//! let head = builder.block([Instruction::Nop]);
//! let left = builder.block([Instruction::Return(None)]);
//! let right = builder.block([Instruction::Return(None)]);
//! builder.edge(head, left)?.edge(head, right)?;
//!
//! let cfg = builder.build()?;
//! // The two returns are merged into a synthetic exit block
//! assert_eq!(cfg.block_count(), 4);
//! # Ok::<(), dfa_replay::Error>(())
//! ```

mod block;
mod builder;
mod graph;

pub use block::{BasicBlock, BlockId, ElementaryBlock};
pub use builder::CfgBuilder;
pub use graph::ControlFlowGraph;
