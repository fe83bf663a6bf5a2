//! Replayable data flow analysis.
//!
//! This module provides the analysis engine. It builds upon the generic graph
//! infrastructure in [`crate::utils::graph`] and the IR in [`crate::ir`].
//!
//! # Architecture
//!
//! The analysis module is organized into focused sub-modules:
//!
//! - [`cfg`] - Control flow graph model and its builder
//! - [`dataflow`] - Lattices, joins, transfers, worklists and the built-in domains
//! - [`engine`] - Fixpoint execution, history recording, navigation and control
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use dfa_replay::{
//!     analysis::{analyze_all, CfgBuilder, ExecutionConfig, StepView},
//!     ir::{Instruction, Local, LocalType, Operand},
//! };
//!
//! let x = Local::new("x", LocalType::Int);
//! let mut builder = CfgBuilder::new();
//! builder.block([Instruction::assign(&x, Operand::int(1)), Instruction::Return(Some(Operand::from(&x)))]);
//! let cfg = Arc::new(builder.build()?);
//!
//! for (kind, view) in analyze_all(&cfg, &ExecutionConfig::default()) {
//!     let view = view?;
//!     println!("{kind}: {} steps", view.elementary_step_count());
//! }
//! # Ok::<(), dfa_replay::Error>(())
//! ```

pub mod cfg;
pub mod dataflow;
pub mod engine;

// Re-export primary types at module level
pub use cfg::{BasicBlock, BlockId, CfgBuilder, ControlFlowGraph, ElementaryBlock};
pub use dataflow::{
    analyze_all, Analysis, AnalysisKind, ConstantBits, ConstantFolding, Direction, Join,
    LatticeElement, LatticeValue, LiveVariables, MapElement, MapJoin, ReachingDefinitions,
    TaintAnalysis, Worklist, WorklistPolicy,
};
pub use engine::{
    AnalysisState, BlockColor, Controller, DfaExecution, ExecutionConfig, History, Navigator,
    PrecalcState, ResultState, StepView,
};
