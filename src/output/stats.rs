//! Statistics generation from the sprawl database
//!
//! This module provides functionality for extracting and displaying
//! graph statistics from the storage layer.

use crate::crawler::{FailureKind, LayerStats};
use crate::output::summary::OutputResult;
use crate::storage::{NodeDegree, Storage};
use std::collections::HashMap;

/// Number of most-linked articles reported
pub const TOP_LINKED_LIMIT: usize = 10;

/// Graph statistics for one run
#[derive(Debug, Clone)]
pub struct SprawlStatistics {
    pub run_id: i64,

    /// Total number of nodes
    pub total_nodes: u64,

    /// Total number of directed edges
    pub total_edges: u64,

    /// Nodes without outgoing edges
    pub dead_ends: u64,

    /// Dropped documents per failure kind
    pub failures_by_kind: HashMap<FailureKind, u64>,

    /// Per-layer expansion statistics
    pub layers: Vec<LayerStats>,

    /// Most-linked articles, highest in-degree first
    pub top_linked: Vec<NodeDegree>,
}

impl SprawlStatistics {
    pub fn failures(&self, kind: FailureKind) -> u64 {
        self.failures_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `run_id` - The run to describe
///
/// # Returns
///
/// * `Ok(SprawlStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage, run_id: i64) -> OutputResult<SprawlStatistics> {
    Ok(SprawlStatistics {
        run_id,
        total_nodes: storage.count_nodes(run_id)?,
        total_edges: storage.count_edges(run_id)?,
        dead_ends: storage.count_dead_ends(run_id)?,
        failures_by_kind: storage.count_failures_by_kind(run_id)?,
        layers: storage.load_layers(run_id)?,
        top_linked: storage.top_by_in_degree(run_id, TOP_LINKED_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &SprawlStatistics) {
    println!("=== Sprawl Statistics (run {}) ===\n", stats.run_id);

    println!("Overview:");
    println!("  Nodes: {}", stats.total_nodes);
    println!("  Edges: {}", stats.total_edges);
    let average = if stats.total_nodes > 0 {
        stats.total_edges as f64 / stats.total_nodes as f64
    } else {
        0.0
    };
    println!("  Average out-degree: {:.2}", average);
    println!("  Nodes without outgoing links: {}", stats.dead_ends);
    println!();

    if !stats.layers.is_empty() {
        println!("Layers:");
        for layer in &stats.layers {
            let label = if layer.closing {
                "closing".to_string()
            } else {
                layer.layer.to_string()
            };
            println!(
                "  {:>7}: {} requested, {} expanded, {} failed, {} new edges",
                label,
                layer.requested,
                layer.expanded,
                layer.unreachable + layer.not_content,
                layer.edges_added
            );
        }
        println!();
    }

    if !stats.failures_by_kind.is_empty() {
        println!("Dropped Documents:");
        println!("  Unreachable: {}", stats.failures(FailureKind::Unreachable));
        println!("  Not content: {}", stats.failures(FailureKind::NotContent));
        println!();
    }

    if !stats.top_linked.is_empty() {
        println!("Most Linked Articles:");
        for node in &stats.top_linked {
            println!("  {} ({} in-links)", node.title, node.in_degree);
        }
    }
}
