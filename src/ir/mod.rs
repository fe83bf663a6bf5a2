//! Instruction-level intermediate representation consumed by the analyses.
//!
//! The front end that parses source code is not part of this crate. It hands over
//! procedures expressed in this small, Jimple-like three-address IR:
//!
//! - [`Local`] / [`LocalType`] - typed local variables
//! - [`Operand`] / [`Constant`] - immediates
//! - [`Expr`] - right-hand sides (arithmetic, casts, invokes, heap reads)
//! - [`Place`] - assignment targets (locals, fields, array elements)
//! - [`Instruction`] - the closed set of instruction kinds
//!
//! Every type implements `Display` in a compact textual form, which the presentation
//! layer uses to label elementary blocks.
//!
//! # Example
//!
//! ```rust
//! use dfa_replay::ir::{BinOp, Expr, Instruction, Local, LocalType, Operand};
//!
//! let x = Local::new("x", LocalType::Int);
//! let insn = Instruction::assign(&x, Expr::binary(BinOp::Add, &x, Operand::int(1)));
//! assert_eq!(insn.to_string(), "x = x + 1");
//! ```

mod instruction;
mod types;
mod value;

pub use instruction::{IdentitySource, Instruction};
pub use types::{Local, LocalType};
pub use value::{BinOp, Constant, Expr, InvokeExpr, InvokeTags, Operand, Place, UnOp};
