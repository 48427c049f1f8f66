//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::{ExpandFailure, FailureKind, LayerStats};
use crate::graph::Graph;
use crate::reference::{Corpus, Reference};
use crate::storage::{NodeDegree, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every record is scoped to a run, so one database can hold many graphs.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new sprawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `corpus` - Corpus the run crawls
    /// * `seeds` - Seed references
    /// * `iterations` - Configured number of layers
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        config_hash: &str,
        corpus: &Corpus,
        seeds: &[Reference],
        iterations: u32,
    ) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Graph =====

    /// Stores every node and edge of a graph in one transaction
    fn save_graph(&mut self, run_id: i64, graph: &Graph, corpus: &Corpus) -> StorageResult<()>;

    /// Rebuilds the graph stored for a run, isolated nodes included
    fn load_graph(&self, run_id: i64) -> StorageResult<Graph>;

    // ===== Sprawl Bookkeeping =====

    fn save_layers(&mut self, run_id: i64, layers: &[LayerStats]) -> StorageResult<()>;

    fn load_layers(&self, run_id: i64) -> StorageResult<Vec<LayerStats>>;

    fn record_failures(&mut self, run_id: i64, failures: &[ExpandFailure]) -> StorageResult<()>;

    fn load_failures(&self, run_id: i64) -> StorageResult<Vec<ExpandFailure>>;

    // ===== Statistics =====

    /// Counts nodes of a run
    fn count_nodes(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts edges of a run
    fn count_edges(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts nodes without outgoing edges
    fn count_dead_ends(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts dropped documents per failure kind
    fn count_failures_by_kind(&self, run_id: i64) -> StorageResult<HashMap<FailureKind, u64>>;

    /// Most-linked nodes, highest in-degree first
    fn top_by_in_degree(&self, run_id: i64, limit: usize) -> StorageResult<Vec<NodeDegree>>;
}
