//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::{ExpandFailure, FailureKind, LayerStats};
use crate::graph::Graph;
use crate::reference::{Corpus, Reference};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{NodeDegree, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, status, base_url, path_prefix, iterations, seeds";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn ensure_run(&self, run_id: i64) -> StorageResult<()> {
        self.get_run(run_id).map(|_| ())
    }

    fn count(&self, sql: &str, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![run_id], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Reads a run row; the seeds column is returned raw for JSON decoding
fn read_run(row: &Row<'_>) -> rusqlite::Result<(RunRecord, String)> {
    let run = RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        base_url: row.get(5)?,
        path_prefix: row.get(6)?,
        iterations: row.get(7)?,
        seeds: Vec::new(),
    };
    Ok((run, row.get(8)?))
}

fn decode_run((mut run, seeds): (RunRecord, String)) -> StorageResult<RunRecord> {
    run.seeds = serde_json::from_str(&seeds)?;
    Ok(run)
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        corpus: &Corpus,
        seeds: &[Reference],
        iterations: u32,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let seeds = serde_json::to_string(seeds)?;
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status, base_url, path_prefix, iterations, seeds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                now,
                config_hash,
                RunStatus::Running.to_db_string(),
                corpus.base_url().as_str(),
                corpus.path_prefix(),
                iterations,
                seeds
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        let run = self
            .conn
            .query_row(&sql, params![run_id], read_run)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?;

        decode_run(run)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, [], read_run)
            .optional()?
            .map(decode_run)
            .transpose()
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Completed.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Graph =====

    fn save_graph(&mut self, run_id: i64, graph: &Graph, corpus: &Corpus) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_node = tx.prepare(
                "INSERT OR IGNORE INTO nodes (run_id, reference, title) VALUES (?1, ?2, ?3)",
            )?;
            let mut select_node =
                tx.prepare("SELECT id FROM nodes WHERE run_id = ?1 AND reference = ?2")?;

            let mut node_ids: HashMap<&Reference, i64> = HashMap::new();
            for node in graph.nodes() {
                insert_node.execute(params![run_id, node.as_str(), corpus.title(node)])?;
                let id: i64 = select_node.query_row(params![run_id, node.as_str()], |row| row.get(0))?;
                node_ids.insert(node, id);
            }

            let mut insert_edge = tx.prepare(
                "INSERT OR IGNORE INTO edges (run_id, source_id, target_id) VALUES (?1, ?2, ?3)",
            )?;
            for (source, target) in graph.edges() {
                let (Some(source_id), Some(target_id)) = (node_ids.get(source), node_ids.get(target)) else {
                    return Err(StorageError::Corrupt(format!(
                        "edge {} -> {} has an endpoint outside the graph",
                        source, target
                    )));
                };
                insert_edge.execute(params![run_id, source_id, target_id])?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Saved {} nodes and {} edges for run {}",
            graph.node_count(),
            graph.edge_count(),
            run_id
        );
        Ok(())
    }

    fn load_graph(&self, run_id: i64) -> StorageResult<Graph> {
        self.ensure_run(run_id)?;
        let mut graph = Graph::new();

        let mut stmt = self
            .conn
            .prepare("SELECT reference FROM nodes WHERE run_id = ?1")?;
        let nodes = stmt.query_map(params![run_id], |row| row.get::<_, String>(0))?;
        for node in nodes {
            graph.add_node(Reference::from_normalized(node?));
        }

        let mut stmt = self.conn.prepare(
            "SELECT s.reference, t.reference FROM edges e
             JOIN nodes s ON s.id = e.source_id
             JOIN nodes t ON t.id = e.target_id
             WHERE e.run_id = ?1",
        )?;
        let edges = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for edge in edges {
            let (source, target) = edge?;
            graph.add_edge(
                Reference::from_normalized(source),
                Reference::from_normalized(target),
            );
        }

        Ok(graph)
    }

    // ===== Sprawl Bookkeeping =====

    fn save_layers(&mut self, run_id: i64, layers: &[LayerStats]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO layers
                 (run_id, layer, closing, requested, expanded, unreachable, not_content, edges_added, next_frontier)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for layer in layers {
                stmt.execute(params![
                    run_id,
                    layer.layer,
                    layer.closing,
                    layer.requested as i64,
                    layer.expanded as i64,
                    layer.unreachable as i64,
                    layer.not_content as i64,
                    layer.edges_added as i64,
                    layer.next_frontier as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_layers(&self, run_id: i64) -> StorageResult<Vec<LayerStats>> {
        let mut stmt = self.conn.prepare(
            "SELECT layer, closing, requested, expanded, unreachable, not_content, edges_added, next_frontier
             FROM layers WHERE run_id = ?1 ORDER BY layer",
        )?;

        let layers = stmt
            .query_map(params![run_id], |row| {
                Ok(LayerStats {
                    layer: row.get(0)?,
                    closing: row.get(1)?,
                    requested: row.get::<_, i64>(2)? as usize,
                    expanded: row.get::<_, i64>(3)? as usize,
                    unreachable: row.get::<_, i64>(4)? as usize,
                    not_content: row.get::<_, i64>(5)? as usize,
                    edges_added: row.get::<_, i64>(6)? as usize,
                    next_frontier: row.get::<_, i64>(7)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(layers)
    }

    fn record_failures(&mut self, run_id: i64, failures: &[ExpandFailure]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO failures (run_id, reference, kind, message) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for failure in failures {
                stmt.execute(params![
                    run_id,
                    failure.reference.as_str(),
                    failure.kind.to_db_string(),
                    failure.message
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_failures(&self, run_id: i64) -> StorageResult<Vec<ExpandFailure>> {
        let mut stmt = self.conn.prepare(
            "SELECT reference, kind, message FROM failures WHERE run_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(reference, kind, message)| {
                let kind = FailureKind::from_db_string(&kind)
                    .ok_or_else(|| StorageError::Corrupt(format!("unknown failure kind '{}'", kind)))?;
                Ok(ExpandFailure {
                    reference: Reference::from_normalized(reference),
                    kind,
                    message,
                })
            })
            .collect()
    }

    // ===== Statistics =====

    fn count_nodes(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM nodes WHERE run_id = ?1", run_id)
    }

    fn count_edges(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM edges WHERE run_id = ?1", run_id)
    }

    fn count_dead_ends(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM nodes n WHERE n.run_id = ?1
             AND NOT EXISTS (SELECT 1 FROM edges e WHERE e.source_id = n.id)",
            run_id,
        )
    }

    fn count_failures_by_kind(&self, run_id: i64) -> StorageResult<HashMap<FailureKind, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM failures WHERE run_id = ?1 GROUP BY kind")?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = HashMap::new();
        for (kind, count) in rows {
            let kind = FailureKind::from_db_string(&kind)
                .ok_or_else(|| StorageError::Corrupt(format!("unknown failure kind '{}'", kind)))?;
            counts.insert(kind, count as u64);
        }
        Ok(counts)
    }

    fn top_by_in_degree(&self, run_id: i64, limit: usize) -> StorageResult<Vec<NodeDegree>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.reference, n.title, COUNT(e.id) AS in_degree
             FROM nodes n LEFT JOIN edges e ON e.target_id = n.id
             WHERE n.run_id = ?1
             GROUP BY n.id
             ORDER BY in_degree DESC, n.reference ASC
             LIMIT ?2",
        )?;

        let nodes = stmt
            .query_map(params![run_id, limit as i64], |row| {
                Ok(NodeDegree {
                    reference: row.get(0)?,
                    title: row.get(1)?,
                    in_degree: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }
}
