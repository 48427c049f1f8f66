//! Bounded-concurrency batch expansion
//!
//! Expanding a batch means fetching every reference and extracting its
//! adjacency set, with at most `max_in_flight` fetches outstanding at any
//! moment. Workers run as tasks in a [`JoinSet`]; the collecting loop is the
//! only writer of the result map. A failed document is logged and reported
//! in [`BatchOutcome::failures`] but never aborts the batch.

use crate::crawler::cache::AdjacencyCache;
use crate::crawler::fetcher::Fetch;
use crate::crawler::parser::extract_links;
use crate::reference::{AdjacencySet, Corpus, Reference};
use crate::{ExtractError, FetchError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Why a single document could not be expanded
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl ExpandError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExpandError::Fetch(_) => FailureKind::Unreachable,
            ExpandError::Extract(_) => FailureKind::NotContent,
        }
    }
}

/// Failure classes recorded per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Transport failure or non-success status
    Unreachable,
    /// Retrieved, but without a main-content section
    NotContent,
}

impl FailureKind {
    /// Converts to the database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            FailureKind::Unreachable => "unreachable",
            FailureKind::NotContent => "not_content",
        }
    }

    /// Parses from the database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "unreachable" => Some(FailureKind::Unreachable),
            "not_content" => Some(FailureKind::NotContent),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// A document that was dropped from a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandFailure {
    pub reference: Reference,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of expanding one batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Every successfully expanded reference and its links
    pub adjacency: HashMap<Reference, AdjacencySet>,
    /// Every reference that could not be expanded
    pub failures: Vec<ExpandFailure>,
}

/// Fetches and extracts one document
pub async fn expand_one<F: Fetch>(
    fetcher: &F,
    corpus: &Corpus,
    reference: &Reference,
) -> Result<AdjacencySet, ExpandError> {
    let content = fetcher.fetch(reference).await?;
    Ok(extract_links(&content, corpus)?)
}

/// Expands batches of references with bounded concurrency
///
/// The expander owns an [`AdjacencyCache`] that lives as long as the
/// expander does, so a reference is fetched at most once per run.
pub struct BatchExpander<F> {
    fetcher: Arc<F>,
    corpus: Arc<Corpus>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    cache: AdjacencyCache,
}

impl<F: Fetch> BatchExpander<F> {
    /// Creates a new expander
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Document source shared by every worker
    /// * `corpus` - Corpus used to recognize article links
    /// * `max_in_flight` - Maximum simultaneous fetches (at least 1)
    pub fn new(fetcher: F, corpus: Corpus, max_in_flight: usize) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            fetcher: Arc::new(fetcher),
            corpus: Arc::new(corpus),
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            cache: AdjacencyCache::new(),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn cache(&self) -> &AdjacencyCache {
        &self.cache
    }

    /// Expands every reference of a batch
    ///
    /// # Returns
    ///
    /// A [`BatchOutcome`] whose adjacency map holds exactly the references
    /// that were retrieved and parsed; the others are listed as failures.
    pub async fn expand<I>(&mut self, references: I) -> BatchOutcome
    where
        I: IntoIterator<Item = Reference>,
    {
        let mut outcome = BatchOutcome::default();
        let mut tasks = JoinSet::new();
        let mut scheduled = HashSet::new();

        for reference in references {
            if !scheduled.insert(reference.clone()) {
                continue;
            }
            if let Some(links) = self.cache.lookup(&reference) {
                outcome.adjacency.insert(reference, links.clone());
                continue;
            }

            // Waits here while max_in_flight fetches are outstanding
            let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                tracing::error!("Fetch permits closed, abandoning remaining batch");
                break;
            };

            let fetcher = Arc::clone(&self.fetcher);
            let corpus = Arc::clone(&self.corpus);
            tasks.spawn(async move {
                let _permit = permit;
                let result = expand_one(fetcher.as_ref(), &corpus, &reference).await;
                (reference, result)
            });

            // Drain whatever already finished so results don't pile up
            while let Some(joined) = tasks.try_join_next() {
                self.collect(joined, &mut outcome);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.collect(joined, &mut outcome);
        }

        tracing::debug!(
            "Batch expanded: {} documents, {} failures",
            outcome.adjacency.len(),
            outcome.failures.len()
        );

        outcome
    }

    fn collect(
        &mut self,
        joined: Result<(Reference, Result<AdjacencySet, ExpandError>), tokio::task::JoinError>,
        outcome: &mut BatchOutcome,
    ) {
        match joined {
            Ok((reference, Ok(links))) => {
                tracing::debug!("Expanded {} ({} links)", reference, links.len());
                self.cache.insert(reference.clone(), links.clone());
                outcome.adjacency.insert(reference, links);
            }
            Ok((reference, Err(error))) => {
                let kind = error.kind();
                tracing::warn!("Skipping {} ({}): {}", reference, kind, error);
                outcome.failures.push(ExpandFailure {
                    reference,
                    kind,
                    message: error.to_string(),
                });
            }
            Err(error) => {
                tracing::warn!("Expansion task failed: {}", error);
            }
        }
    }
}
