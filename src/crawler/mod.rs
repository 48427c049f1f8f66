//! Crawler module for article fetching and graph construction
//!
//! This module contains the core crawling logic, including:
//! - Document retrieval behind the [`Fetch`] seam
//! - Main-content link extraction
//! - Bounded-concurrency batch expansion
//! - Layered breadth-first sprawling

mod cache;
mod expander;
mod fetcher;
mod parser;
mod sprawler;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::AdjacencyCache;
pub use expander::{
    expand_one, BatchExpander, BatchOutcome, ExpandError, ExpandFailure, FailureKind,
};
pub use fetcher::{
    build_blocking_client, build_http_client, BlockingFetcher, Fetch, HttpFetcher,
};
pub use parser::extract_links;
pub use sprawler::{LayerStats, SprawlReport, Sprawler};

use crate::config::Config;
use crate::reference::{AdjacencySet, Corpus, Reference};
use crate::SprawlError;

/// Runs a complete sprawl from a configuration
///
/// This is the main entry point for building a graph. It will:
/// 1. Resolve the corpus and seed references
/// 2. Build the HTTP client
/// 3. Expand the configured number of layers plus the closing pass
///
/// # Arguments
///
/// * `config` - The sprawl configuration
///
/// # Returns
///
/// * `Ok(SprawlReport)` - The graph, per-layer statistics and dropped documents
/// * `Err(SprawlError)` - The configuration could not be turned into a sprawl
pub async fn run_sprawl(config: &Config) -> Result<SprawlReport, SprawlError> {
    let corpus = config.corpus()?;
    let seeds = config.seed_references()?;
    let fetcher =
        HttpFetcher::from_config(&config.user_agent, config.crawler.request_timeout())?;

    let expander = BatchExpander::new(
        fetcher,
        corpus,
        config.crawler.max_concurrent_fetches as usize,
    );
    let mut sprawler = Sprawler::new(expander);

    tracing::info!(
        "Sprawling {} seeds for {} layers ({} fetches in flight)",
        seeds.len(),
        config.sprawl.iterations,
        sprawler.expander().max_in_flight()
    );

    Ok(sprawler.sprawl(seeds, config.sprawl.iterations).await)
}

/// Fetches and extracts one article synchronously
///
/// Blocking counterpart of [`expand_one`] for callers without a runtime.
pub fn expand_blocking(
    fetcher: &BlockingFetcher,
    corpus: &Corpus,
    reference: &Reference,
) -> Result<AdjacencySet, ExpandError> {
    let content = fetcher.fetch(reference)?;
    Ok(extract_links(&content, corpus)?)
}
