//! Constant-bits analysis.
//!
//! Tracks every bit of an integral local independently as `0`, `1`, ⊤ (unknown) or
//! ⊥ (unreached). This is more precise than constant folding for code that mixes
//! unknown inputs with masking, shifting and multiplication by constants:
//!
//! ```text
//! x := @parameter0          x = ⊤⊤⊤⊤...⊤⊤⊤⊤
//! y = x * 8                 y = ⊤⊤⊤⊤...⊤000
//! z = y & 15                z = 0000...⊤000
//! ```
//!
//! The arithmetic rules live in [`arith`]; multiplication is the most involved one,
//! combining exact folding, shifts by powers of two, bounded enumeration of unknown
//! bits, and a trailing/leading zero estimate.

pub mod arith;
mod transfer;
mod value;

pub use transfer::{ConstantBits, ConstantBitsTransfer};
pub use value::{Bit, BitVector};
