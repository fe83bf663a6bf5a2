//! Data flow analysis framework and the built-in abstract domains.
//!
//! This module provides the pieces a worklist fixpoint is assembled from. It
//! supports both forward and backward analyses over a [`ControlFlowGraph`] whose
//! nodes are lists of single-instruction [`ElementaryBlock`]s.
//!
//! # Architecture
//!
//! The framework is built around four abstractions:
//!
//! - **Lattice**: [`LatticeElement`] and [`LatticeValue`], with [`MapElement`]
//!   binding every tracked variable to a value
//! - **Join**: [`Join`] merges the states of neighbouring blocks
//! - **Transfer**: [`Transfer`] gives the effect of one instruction
//! - **Initializer**: [`Initializer`] seeds every block before the first iteration
//!
//! An [`Analysis`] wires the three parts for one graph. The execution engine in
//! [`crate::analysis::engine`] drives them and records every intermediate state.
//!
//! # Analyses Provided
//!
//! - [`ConstantFolding`]: per-variable constants with Java arithmetic
//! - [`ConstantBits`]: per-bit knowledge of integral values
//! - [`ReachingDefinitions`]: which definition sites may reach each point
//! - [`TaintAnalysis`]: taint propagation with sensitive sinks
//! - [`LiveVariables`]: which variables are read later (backward)
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use dfa_replay::{
//!     analysis::{AnalysisKind, CfgBuilder, ExecutionConfig, StepView},
//!     ir::{Instruction, Local, LocalType, Operand},
//! };
//!
//! let x = Local::new("x", LocalType::Int);
//! let mut builder = CfgBuilder::new();
//! builder.block([Instruction::assign(&x, Operand::int(3)), Instruction::Return(None)]);
//! let cfg = Arc::new(builder.build()?);
//!
//! let mut view = AnalysisKind::ConstantFolding.run(cfg, &ExecutionConfig::default())?;
//! view.set_current_elementary_step(view.elementary_step_count() - 1);
//! assert_eq!(view.render_out_state(), "{x: 3}");
//! # Ok::<(), dfa_replay::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are `Send` and `Sync`. Worklists are `Send` only.
//!
//! [`ControlFlowGraph`]: crate::analysis::cfg::ControlFlowGraph
//! [`ElementaryBlock`]: crate::analysis::cfg::ElementaryBlock

pub mod bits;
mod constfold;
mod framework;
mod join;
mod lattice;
mod liveness;
mod reaching;
mod taint;
mod worklist;

pub use bits::{Bit, BitVector, ConstantBits, ConstantBitsTransfer};
pub use constfold::{fold_binary, ConstValue, ConstantFolding, ConstantFoldingTransfer};
pub use framework::{
    analyze_all, boundary_block, Analysis, AnalysisKind, AnalysisParts, BlockState, Direction,
    Initializer, MapInitializer, Transfer,
};
pub use join::{Join, MapJoin};
pub use lattice::{LatticeElement, LatticeValue, MapElement};
pub use liveness::{LiveValue, LiveVariables, LiveVariablesTransfer};
pub use reaching::{DefValue, ReachingDefinitions, ReachingDefinitionsTransfer};
pub use taint::{TaintAnalysis, TaintState, TaintTransfer, TaintValue};
pub use worklist::{create_worklist, NaiveWorklist, RandomWorklist, Worklist, WorklistPolicy};
