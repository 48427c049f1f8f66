//! Similarity-guided greedy walk
//!
//! From the current article, step to the unvisited neighbour whose title
//! embedding is most similar to the target's. If the target itself is a
//! neighbour the walk steps straight to it. The walk ends at the target or
//! at a dead end (no unvisited neighbours); it never backtracks.

use crate::reference::{AdjacencySet, Corpus, Reference};
use crate::search::embedding::{cosine_similarity, phrase_vector, VectorSource};
use crate::search::{ensure_known, ArticlePath, Neighbors, SearchError};
use std::collections::HashSet;

/// How a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Reached,
    DeadEnd,
}

/// A finished greedy walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    /// Every article visited, source first
    pub path: ArticlePath,
    pub outcome: WalkOutcome,
}

impl Walk {
    pub fn reached(&self) -> bool {
        self.outcome == WalkOutcome::Reached
    }
}

/// Scores candidates against a fixed target
pub struct WalkContext<'a, V: ?Sized> {
    corpus: &'a Corpus,
    vectors: &'a V,
    target: Reference,
    target_vector: Vec<f32>,
}

impl<'a, V: VectorSource + ?Sized> WalkContext<'a, V> {
    pub fn new(corpus: &'a Corpus, vectors: &'a V, target: Reference) -> Self {
        let target_vector = phrase_vector(&corpus.title(&target), vectors);
        Self {
            corpus,
            vectors,
            target,
            target_vector,
        }
    }

    pub fn target(&self) -> &Reference {
        &self.target
    }

    /// Cosine similarity between a candidate's title and the target's
    pub fn score(&self, candidate: &Reference) -> f32 {
        let candidate_vector = phrase_vector(&self.corpus.title(candidate), self.vectors);
        cosine_similarity(&candidate_vector, &self.target_vector)
    }

    /// Picks the next step among `neighbors`
    ///
    /// Returns the target when it is an unvisited neighbour, otherwise the
    /// best-scoring unvisited neighbour (ties go to the first in order), or
    /// `None` at a dead end.
    pub fn next_step(&self, neighbors: &AdjacencySet, visited: &HashSet<Reference>) -> Option<Reference> {
        if neighbors.contains(&self.target) && !visited.contains(&self.target) {
            return Some(self.target.clone());
        }

        let mut best: Option<(&Reference, f32)> = None;
        for candidate in neighbors.iter().filter(|candidate| !visited.contains(*candidate)) {
            let score = self.score(candidate);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best.map(|(candidate, _)| candidate.clone())
    }
}

/// Walks greedily from `source` toward `target`
///
/// # Returns
///
/// * `Ok(Walk)` - The visited path and whether it reached the target
/// * `Err(SearchError::UnknownNode)` - An endpoint is not searchable
pub fn greedy_walk<N, V>(
    adjacency: &N,
    corpus: &Corpus,
    vectors: &V,
    source: &Reference,
    target: &Reference,
) -> Result<Walk, SearchError>
where
    N: Neighbors + ?Sized,
    V: VectorSource + ?Sized,
{
    ensure_known(adjacency, source)?;
    ensure_known(adjacency, target)?;

    let context = WalkContext::new(corpus, vectors, target.clone());
    let mut visited = HashSet::new();
    let mut path = Vec::new();
    let mut current = source.clone();

    loop {
        visited.insert(current.clone());
        path.push(current.clone());

        if &current == target {
            return Ok(Walk {
                path,
                outcome: WalkOutcome::Reached,
            });
        }

        let neighbors = adjacency.neighbors(&current);
        match context.next_step(&neighbors, &visited) {
            Some(next) => {
                tracing::debug!("Walk: {} -> {}", corpus.title(&current), corpus.title(&next));
                current = next;
            }
            None => {
                tracing::debug!("Walk: dead end at {}", corpus.title(&current));
                return Ok(Walk {
                    path,
                    outcome: WalkOutcome::DeadEnd,
                });
            }
        }
    }
}
