//! Replayable fixpoint execution.
//!
//! The engine drives an [`Analysis`](crate::analysis::dataflow::Analysis) to its
//! fixpoint and records an immutable [`AnalysisState`] after every elementary step,
//! so a run can be scrubbed back and forth after (or while) it is computed.
//!
//! # Key Components
//!
//! - [`DfaExecution`] - The worklist loop, run inline or on a background thread
//! - [`Controller`] - Pause, resume and stop, plus the one-shot published result
//! - [`History`] / [`Navigator`] - Recorded snapshots and two linked cursors over them
//! - [`StepView`] - Element-type-erased navigation for presentation layers
//! - [`ExecutionConfig`] - Worklist policy, seed and pause poll interval
//!
//! # Thread Safety
//!
//! A run has exactly one producer thread. The [`Controller`] is the only shared
//! mutable state and is safe to use from any number of consumer threads.

mod config;
mod controller;
mod execution;
mod history;
mod state;
mod view;

pub use config::{ExecutionConfig, DEFAULT_PAUSE_POLL};
pub use controller::{Controller, PrecalcState, ResultState};
pub use execution::DfaExecution;
pub use history::{History, Navigator};
pub use state::{AnalysisState, BlockColor, Cursor};
pub use view::StepView;
