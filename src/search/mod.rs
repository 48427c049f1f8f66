//! Path search between articles
//!
//! Searches run over anything that implements [`Neighbors`]: a built
//! [`Graph`](crate::graph::Graph) or a [`LiveAdjacency`] that expands
//! articles on demand. A path is the sequence of references visited,
//! source first and target last.

mod bfs;
mod embedding;
mod greedy;
mod live;

pub use bfs::{all_shortest_paths, shortest_path};
pub use embedding::{cosine_similarity, phrase_vector, EmbeddingError, EmbeddingTable, VectorSource};
pub use greedy::{greedy_walk, Walk, WalkContext, WalkOutcome};
pub use live::LiveAdjacency;

use crate::graph::Graph;
use crate::reference::{AdjacencySet, Reference};
use std::borrow::Cow;
use thiserror::Error;

/// Sequence of references from source to target
pub type ArticlePath = Vec<Reference>;

/// Search errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("{0} is not a node of the graph being searched")]
    UnknownNode(Reference),
}

/// Neighbour lookup used by every search
pub trait Neighbors {
    /// Whether the node can take part in a search at all
    fn contains(&self, node: &Reference) -> bool;

    /// Out-neighbours of a node; empty when it has none or is unknown
    fn neighbors(&self, node: &Reference) -> Cow<'_, AdjacencySet>;
}

impl Neighbors for Graph {
    fn contains(&self, node: &Reference) -> bool {
        Graph::contains(self, node)
    }

    fn neighbors(&self, node: &Reference) -> Cow<'_, AdjacencySet> {
        match Graph::neighbors(self, node) {
            Some(targets) => Cow::Borrowed(targets),
            None => Cow::Owned(AdjacencySet::new()),
        }
    }
}

pub(crate) fn ensure_known<N: Neighbors + ?Sized>(
    adjacency: &N,
    node: &Reference,
) -> Result<(), SearchError> {
    if adjacency.contains(node) {
        Ok(())
    } else {
        Err(SearchError::UnknownNode(node.clone()))
    }
}
