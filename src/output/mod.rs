//! Output module for graph files, statistics and sprawl summaries
//!
//! This module handles:
//! - Reading and writing node-link JSON graph files
//! - Printing graph statistics
//! - Generating markdown summaries of sprawl runs

mod graph_file;
mod markdown;
pub mod stats;
mod summary;

pub use graph_file::{read_graph, read_node_link, write_graph};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, SprawlStatistics};
pub use summary::{OutputError, OutputResult, SprawlSummary};

use crate::crawler::FailureKind;
use crate::graph::Graph;
use crate::storage::Storage;
use chrono::{DateTime, Utc};

/// Maximum number of dropped documents listed individually in a summary
pub const FAILURE_LIST_LIMIT: usize = 50;

/// Generates a sprawl summary from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing sprawl data
/// * `run_id` - The run to summarize; `None` selects the latest run
///
/// # Returns
///
/// * `Ok(SprawlSummary)` - Successfully generated summary
/// * `Err(OutputError)` - Failed to generate summary
pub fn generate_summary(storage: &dyn Storage, run_id: Option<i64>) -> OutputResult<SprawlSummary> {
    let run = match run_id {
        Some(id) => storage.get_run(id)?,
        None => storage.get_latest_run()?.ok_or(OutputError::NoRuns)?,
    };

    let duration_seconds = match (
        run.started_at.parse::<DateTime<Utc>>(),
        run.finished_at.as_deref().map(str::parse::<DateTime<Utc>>),
    ) {
        (Ok(started), Some(Ok(finished))) => Some((finished - started).num_seconds().max(0) as u64),
        _ => None,
    };

    let stats = stats::load_statistics(storage, run.id)?;
    let mut failures = storage.load_failures(run.id)?;
    failures.truncate(FAILURE_LIST_LIMIT);

    Ok(SprawlSummary {
        run_id: run.id,
        started_at: run.started_at,
        finished_at: run.finished_at,
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash,
        base_url: run.base_url,
        path_prefix: run.path_prefix,
        iterations: run.iterations,
        seeds: run.seeds,
        total_nodes: stats.total_nodes,
        total_edges: stats.total_edges,
        dead_ends: stats.dead_ends,
        unreachable: stats.failures(FailureKind::Unreachable),
        not_content: stats.failures(FailureKind::NotContent),
        layers: stats.layers,
        top_linked: stats.top_linked,
        failures,
    })
}

/// Loads the graph stored for a run
///
/// # Arguments
///
/// * `storage` - The storage backend containing sprawl data
/// * `run_id` - The run to load; `None` selects the latest run
///
/// # Returns
///
/// * `Ok((run_id, graph))` - The resolved run and its graph
/// * `Err(OutputError)` - No such run, or the stored graph is unreadable
pub fn load_run_graph(storage: &dyn Storage, run_id: Option<i64>) -> OutputResult<(i64, Graph)> {
    let run_id = match run_id {
        Some(id) => storage.get_run(id)?.id,
        None => storage.get_latest_run()?.ok_or(OutputError::NoRuns)?.id,
    };

    let graph = storage.load_graph(run_id)?;
    tracing::info!(
        "Loaded run {}: {} nodes, {} edges",
        run_id,
        graph.node_count(),
        graph.edge_count()
    );
    Ok((run_id, graph))
}
