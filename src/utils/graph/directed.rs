//! Core directed graph implementation.
//!
//! This module provides [`DirectedGraph`], the adjacency-list graph underneath the
//! control flow graph. Node data lives in a single arena indexed by [`NodeId`];
//! edges carry no data and are stored once per direction so that successor and
//! predecessor queries are both O(out-degree) / O(in-degree).

use crate::{utils::graph::NodeId, Result};

/// A directed graph with typed node data and unlabelled edges.
///
/// Parallel edges are collapsed: adding an edge that already exists is a no-op.
/// Edge insertion order is preserved, which keeps successor and predecessor
/// iteration deterministic.
///
/// # Examples
///
/// ```rust,ignore
/// use dfa_replay::utils::graph::DirectedGraph;
///
/// let mut graph: DirectedGraph<&str> = DirectedGraph::new();
/// let a = graph.add_node("A");
/// let b = graph.add_node("B");
/// graph.add_edge(a, b)?;
///
/// assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![b]);
/// assert_eq!(graph.predecessors(b).collect::<Vec<_>>(), vec![a]);
/// ```
#[derive(Debug, Clone)]
pub struct DirectedGraph<N> {
    /// Node data storage
    nodes: Vec<N>,
    /// Outgoing edges per node (adjacency list for successors)
    outgoing: Vec<Vec<NodeId>>,
    /// Incoming edges per node (adjacency list for predecessors)
    incoming: Vec<Vec<NodeId>>,
    /// Total number of distinct edges
    edge_count: usize,
}

impl<N> Default for DirectedGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectedGraph<N> {
    /// Creates a new empty directed graph.
    #[must_use]
    pub fn new() -> Self {
        DirectedGraph {
            nodes: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            edge_count: 0,
        }
    }

    /// Creates a new directed graph with pre-allocated node capacity.
    #[must_use]
    pub fn with_capacity(node_capacity: usize) -> Self {
        DirectedGraph {
            nodes: Vec::with_capacity(node_capacity),
            outgoing: Vec::with_capacity(node_capacity),
            incoming: Vec::with_capacity(node_capacity),
            edge_count: 0,
        }
    }

    /// Adds a new node with the given data to the graph.
    ///
    /// The node is assigned the next sequential `NodeId`, starting from 0.
    pub fn add_node(&mut self, data: N) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(data);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds a directed edge from `source` to `target`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if a new edge was added
    /// * `Ok(false)` if the edge already existed
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidArgument`] if either endpoint does not exist.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Result<bool> {
        for (role, node) in [("source", source), ("target", target)] {
            if node.index() >= self.nodes.len() {
                return Err(invalid_argument!(
                    "{} node {} does not exist in graph with {} nodes",
                    role,
                    node,
                    self.nodes.len()
                ));
            }
        }

        if self.outgoing[source.index()].contains(&target) {
            return Ok(false);
        }

        self.outgoing[source.index()].push(target);
        self.incoming[target.index()].push(source);
        self.edge_count += 1;
        Ok(true)
    }

    /// Returns a reference to the data associated with the given node.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&N> {
        self.nodes.get(node.index())
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns `true` if the graph contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all node identifiers, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Returns an iterator over all nodes with their identifiers.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &N)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, data)| (NodeId::new(i), data))
    }

    /// Returns the successors of `node`, in edge insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this graph.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing[node.index()].iter().copied()
    }

    /// Returns the predecessors of `node`, in edge insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `node` does not belong to this graph.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming[node.index()].iter().copied()
    }

    /// Returns the number of successors of `node`.
    #[must_use]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.outgoing.get(node.index()).map_or(0, Vec::len)
    }

    /// Returns the number of predecessors of `node`.
    #[must_use]
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.incoming.get(node.index()).map_or(0, Vec::len)
    }
}
