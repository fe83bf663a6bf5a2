//! Directed graph infrastructure.
//!
//! The control flow graph is a thin, domain-specific wrapper around
//! [`DirectedGraph`]. Nodes are addressed by dense [`NodeId`]s, so per-node data
//! (block states, colors) lives in plain vectors indexed by `NodeId::index()`.

mod directed;
mod node;

pub use directed::DirectedGraph;
pub use node::NodeId;
