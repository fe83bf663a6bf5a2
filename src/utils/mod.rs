//! Generic data structures shared by the analysis modules.
//!
//! - [`graph`] - the directed graph substrate underneath the control flow graph
//! - [`BitSet`] - dense set of small integers, used for definition-site sets

mod bitset;
pub mod graph;

pub use bitset::{BitSet, BitSetIter};
