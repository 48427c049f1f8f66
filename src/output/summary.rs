//! Summary data shared by the output formats

use crate::crawler::{ExpandFailure, LayerStats};
use crate::graph::GraphError;
use crate::storage::{NodeDegree, StorageError};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("No sprawl runs found in database")]
    NoRuns,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary of one sprawl run
#[derive(Debug, Clone, Default)]
pub struct SprawlSummary {
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,

    pub base_url: String,
    pub path_prefix: String,
    pub iterations: u32,
    pub seeds: Vec<String>,

    pub total_nodes: u64,
    pub total_edges: u64,
    /// Nodes without outgoing edges
    pub dead_ends: u64,
    pub unreachable: u64,
    pub not_content: u64,

    pub layers: Vec<LayerStats>,
    pub top_linked: Vec<NodeDegree>,
    /// Dropped documents (possibly truncated)
    pub failures: Vec<ExpandFailure>,
}

impl SprawlSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total documents dropped during expansion
    pub fn total_failures(&self) -> u64 {
        self.unreachable + self.not_content
    }

    /// Mean out-degree over all nodes
    pub fn average_out_degree(&self) -> f64 {
        if self.total_nodes == 0 {
            return 0.0;
        }
        self.total_edges as f64 / self.total_nodes as f64
    }

    /// Percentage of expansion attempts that failed
    pub fn failure_rate(&self) -> f64 {
        let attempts: usize = self.layers.iter().map(|layer| layer.requested).sum();
        if attempts == 0 {
            return 0.0;
        }
        (self.total_failures() as f64 / attempts as f64) * 100.0
    }
}
