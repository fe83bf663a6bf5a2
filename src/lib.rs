// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dfa-replay
//!
//! A replayable data flow analysis engine for abstract interpretation over a
//! Jimple-like IR. Every analysis run is recorded one instruction at a time, so
//! the path to the fixpoint can be scrubbed forward and backward, stepped block by
//! block, or played until a breakpoint, while the precalculation may still be
//! running on a background thread.
//!
//! ## Features
//!
//! - **🧮 Five built-in domains** - constant folding, constant bits, reaching
//!   definitions, taint, live variables
//! - **⏯️ Controllable runs** - pause, resume and stop a background precalculation
//! - **🎞️ Full history** - an immutable snapshot per elementary step, with
//!   worklist contents and block colors
//! - **🔀 Worklist policies** - FIFO or seeded random order; the fixpoint is the same
//! - **🧩 Extensible** - implement [`analysis::Analysis`] to plug in a new domain
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dfa_replay::prelude::*;
//!
//! let x = Local::new("x", LocalType::Int);
//! let mut builder = CfgBuilder::new();
//! builder.block([
//!     Instruction::assign(&x, Operand::int(6)),
//!     Instruction::assign(&x, Expr::binary(BinOp::Mul, &x, Operand::int(4))),
//! ]);
//! let cfg = Arc::new(builder.build()?);
//!
//! let history = DfaExecution::new(ConstantBits, cfg, ExecutionConfig::default()).run()?;
//! let mut nav = Navigator::new(history);
//! nav.set_current_elementary_step(1);
//!
//! let out = &nav.current_state().unwrap().current().out_state;
//! assert_eq!(out.get(&x)?.to_signed(), Some(24));
//! # Ok::<(), dfa_replay::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] - The instruction set analyses consume
//! - [`analysis::cfg`] - Control flow graph of basic and elementary blocks
//! - [`analysis::dataflow`] - Lattices, joins, transfers, worklists and domains
//! - [`analysis::engine`] - Fixpoint execution, history, navigation and control
//! - [`utils`] - Graph substrate and bit sets
//!
//! ## Logging
//!
//! The engine reports through the [`log`] facade: one `debug!` per dequeued block,
//! one `trace!` per elementary step, `info!` on completion and `warn!` on failure.
//! No logger is installed by the library.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dfa_replay::prelude::*;
///
/// let cfg = {
///     let mut builder = CfgBuilder::new();
///     builder.block([Instruction::Nop]);
///     builder.build()?
/// };
/// assert_eq!(cfg.block_count(), 1);
/// # Ok::<(), dfa_replay::Error>(())
/// ```
pub mod prelude;

pub mod analysis;
pub mod ir;
pub mod utils;

/// `dfa-replay` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dfa-replay` Error type
///
/// The main error type for all operations in this crate. Contract violations carry
/// the source location at which they were detected.
///
/// # Examples
///
/// ```rust
/// use dfa_replay::{analysis::CfgBuilder, Error};
///
/// match CfgBuilder::new().build() {
///     Err(Error::IllegalState { message, .. }) => println!("rejected: {}", message),
///     Err(e) => println!("Error: {}", e),
///     Ok(_) => unreachable!(),
/// }
/// ```
pub use error::Error;
