//! # dfa-replay Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dfa-replay library. Import this module to get quick access to the essential
//! types for building graphs, running analyses and replaying their histories.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dfa-replay operations
pub use crate::Error;

/// The result type used throughout dfa-replay
pub use crate::Result;

// ================================================================================================
// Intermediate Representation
// ================================================================================================

/// Locals, operands, expressions and instructions
pub use crate::ir::{
    BinOp, Constant, Expr, Instruction, InvokeExpr, InvokeTags, Local, LocalType, Operand, Place,
    UnOp,
};

// ================================================================================================
// Control Flow
// ================================================================================================

/// Graph model and builder
pub use crate::analysis::cfg::{
    BasicBlock, BlockId, CfgBuilder, ControlFlowGraph, ElementaryBlock,
};

// ================================================================================================
// Data Flow Framework
// ================================================================================================

/// Framework traits
pub use crate::analysis::dataflow::{
    Analysis, AnalysisKind, Direction, Join, LatticeElement, LatticeValue, MapElement, Transfer,
};

/// Built-in analyses and their values
pub use crate::analysis::dataflow::{
    BitVector, ConstValue, ConstantBits, ConstantFolding, DefValue, LiveValue, LiveVariables,
    ReachingDefinitions, TaintAnalysis, TaintState, TaintValue,
};

/// Worklists
pub use crate::analysis::dataflow::{create_worklist, Worklist, WorklistPolicy};

// ================================================================================================
// Execution Engine
// ================================================================================================

/// Running, controlling and replaying analyses
pub use crate::analysis::engine::{
    AnalysisState, BlockColor, Controller, DfaExecution, ExecutionConfig, History, Navigator,
    PrecalcState, ResultState, StepView,
};
