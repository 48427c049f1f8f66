//! Directed link graph
//!
//! Nodes are references; an edge `a → b` means article `a` links to
//! article `b` from its main content. Storage is ordered so iteration,
//! export and search tie-breaking are deterministic.

mod node_link;

pub use node_link::{from_node_link, to_node_link, NodeLink, NodeLinkEdge, NodeLinkNode};

use crate::reference::{AdjacencySet, Reference};
use crate::ReferenceError;
use std::borrow::Borrow;
use std::collections::BTreeMap;
use thiserror::Error;

/// Graph import errors
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Invalid node id '{id}': {source}")]
    InvalidNode {
        id: String,
        #[source]
        source: ReferenceError,
    },

    #[error("Link {source_id} -> {target_id} references an unlisted node")]
    DanglingLink { source_id: String, target_id: String },

    #[error("Graph document is not directed")]
    Undirected,
}

/// Directed graph of article references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: BTreeMap<Reference, AdjacencySet>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; returns false if it was already present
    pub fn add_node(&mut self, node: Reference) -> bool {
        if self.adjacency.contains_key(&node) {
            return false;
        }
        self.adjacency.insert(node, AdjacencySet::new());
        true
    }

    /// Adds an edge, creating both endpoints as needed
    ///
    /// Returns false if the edge was already present.
    pub fn add_edge(&mut self, source: Reference, target: Reference) -> bool {
        self.add_node(target.clone());
        self.adjacency.entry(source).or_default().insert(target)
    }

    pub fn contains<Q>(&self, node: &Q) -> bool
    where
        Reference: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.adjacency.contains_key(node)
    }

    pub fn has_edge<Q>(&self, source: &Q, target: &Q) -> bool
    where
        Reference: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.adjacency
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    /// Out-neighbours of a node, if the node exists
    pub fn neighbors<Q>(&self, node: &Q) -> Option<&AdjacencySet>
    where
        Reference: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.adjacency.get(node)
    }

    pub fn out_degree<Q>(&self, node: &Q) -> usize
    where
        Reference: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.neighbors(node).map_or(0, AdjacencySet::len)
    }

    /// Number of edges pointing at a node (linear in the edge count)
    pub fn in_degree<Q>(&self, node: &Q) -> usize
    where
        Reference: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.adjacency
            .values()
            .filter(|targets| targets.contains(node))
            .count()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(AdjacencySet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Nodes in reference order
    pub fn nodes(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.adjacency.keys()
    }

    /// Edges in (source, target) order
    pub fn edges(&self) -> impl Iterator<Item = (&Reference, &Reference)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(source, targets)| targets.iter().map(move |target| (source, target)))
    }
}
