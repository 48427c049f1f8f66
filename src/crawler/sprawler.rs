//! Layered breadth-first graph construction
//!
//! A sprawl expands the seed set layer by layer for a fixed number of
//! iterations, then runs one closing pass over the final frontier. The
//! closing pass only adds edges between nodes already in the graph, so
//! the node set is exactly what the expanded layers discovered.

use crate::crawler::expander::{BatchExpander, BatchOutcome, ExpandFailure, FailureKind};
use crate::crawler::fetcher::Fetch;
use crate::graph::Graph;
use crate::reference::Reference;
use std::collections::{BTreeSet, HashSet};

/// What happened during one expansion layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerStats {
    /// 1-based layer number; the closing pass is numbered after the last layer
    pub layer: u32,
    /// True for the closing pass
    pub closing: bool,
    /// References handed to the expander
    pub requested: usize,
    /// References successfully expanded
    pub expanded: usize,
    /// References that could not be retrieved
    pub unreachable: usize,
    /// References retrieved but without main content
    pub not_content: usize,
    /// New edges added to the graph
    pub edges_added: usize,
    /// Size of the frontier handed to the next layer
    pub next_frontier: usize,
}

/// Result of a complete sprawl
#[derive(Debug, Default)]
pub struct SprawlReport {
    pub graph: Graph,
    pub layers: Vec<LayerStats>,
    pub failures: Vec<ExpandFailure>,
}

/// Builds a bounded-depth link graph around a seed set
pub struct Sprawler<F> {
    expander: BatchExpander<F>,
}

impl<F: Fetch> Sprawler<F> {
    pub fn new(expander: BatchExpander<F>) -> Self {
        Self { expander }
    }

    pub fn expander(&self) -> &BatchExpander<F> {
        &self.expander
    }

    /// Runs a sprawl
    ///
    /// # Algorithm
    ///
    /// 1. Expand the current frontier (minus already processed references)
    /// 2. Add every expanded source and all of its out-edges to the graph
    /// 3. Targets not yet processed form the next frontier
    /// 4. Repeat for `iterations` layers or until the frontier is empty
    /// 5. Expand the final frontier once more, keeping only edges whose
    ///    target is already a node
    ///
    /// # Arguments
    ///
    /// * `seeds` - Starting references
    /// * `iterations` - Number of expansion layers; 0 yields an empty graph
    pub async fn sprawl<I>(&mut self, seeds: I, iterations: u32) -> SprawlReport
    where
        I: IntoIterator<Item = Reference>,
    {
        let mut report = SprawlReport::default();
        let mut processed: HashSet<Reference> = HashSet::new();
        let mut frontier: BTreeSet<Reference> = seeds.into_iter().collect();

        for layer in 1..=iterations {
            if frontier.is_empty() {
                tracing::info!("Frontier exhausted after {} layers", layer - 1);
                break;
            }

            let batch: Vec<Reference> = frontier
                .iter()
                .filter(|reference| !processed.contains(*reference))
                .cloned()
                .collect();

            tracing::info!("Layer {}: expanding {} articles", layer, batch.len());
            let outcome = self.expander.expand(batch.iter().cloned()).await;
            let requested = batch.len();
            processed.extend(batch);

            let mut next_frontier = BTreeSet::new();
            let mut edges_added = 0;
            for (source, targets) in &outcome.adjacency {
                report.graph.add_node(source.clone());
                for target in targets {
                    if report.graph.add_edge(source.clone(), target.clone()) {
                        edges_added += 1;
                    }
                    if !processed.contains(target) {
                        next_frontier.insert(target.clone());
                    }
                }
            }

            let stats = layer_stats(layer, false, requested, &outcome, edges_added, next_frontier.len());
            tracing::info!(
                "Layer {} done: {} expanded, {} failed, {} new edges, {} nodes total",
                layer,
                stats.expanded,
                stats.unreachable + stats.not_content,
                edges_added,
                report.graph.node_count()
            );

            report.layers.push(stats);
            report.failures.extend(outcome.failures);
            frontier = next_frontier;
        }

        // Only a frontier produced by a real layer gets a closing pass
        if !report.layers.is_empty() && !frontier.is_empty() {
            self.close(frontier, iterations + 1, &mut report).await;
        }

        tracing::info!(
            "Sprawl complete: {} nodes, {} edges",
            report.graph.node_count(),
            report.graph.edge_count()
        );

        report
    }

    /// Closing pass: connects final-layer nodes to the existing graph
    async fn close(&mut self, frontier: BTreeSet<Reference>, layer: u32, report: &mut SprawlReport) {
        tracing::info!("Closing pass: expanding {} frontier articles", frontier.len());
        let requested = frontier.len();
        let outcome = self.expander.expand(frontier).await;

        let mut edges_added = 0;
        for (source, targets) in &outcome.adjacency {
            for target in targets {
                if report.graph.contains(target) && report.graph.add_edge(source.clone(), target.clone()) {
                    edges_added += 1;
                }
            }
        }

        tracing::info!("Closing pass added {} edges", edges_added);
        report
            .layers
            .push(layer_stats(layer, true, requested, &outcome, edges_added, 0));
        report.failures.extend(outcome.failures);
    }
}

fn layer_stats(
    layer: u32,
    closing: bool,
    requested: usize,
    outcome: &BatchOutcome,
    edges_added: usize,
    next_frontier: usize,
) -> LayerStats {
    let failed_with = |kind: FailureKind| {
        outcome
            .failures
            .iter()
            .filter(|failure| failure.kind == kind)
            .count()
    };

    LayerStats {
        layer,
        closing,
        requested,
        expanded: outcome.adjacency.len(),
        unreachable: failed_with(FailureKind::Unreachable),
        not_content: failed_with(FailureKind::NotContent),
        edges_added,
        next_frontier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fixtures::{corpus, music_corpus, reference, FixtureFetcher};
    use std::sync::Arc;

    fn sprawler(fetcher: FixtureFetcher) -> Sprawler<FixtureFetcher> {
        Sprawler::new(BatchExpander::new(fetcher, corpus(), 4))
    }

    #[tokio::test]
    async fn test_zero_iterations_empty_graph() {
        let fetcher = Arc::new(music_corpus());
        let mut sprawler = Sprawler::new(BatchExpander::new(Arc::clone(&fetcher), corpus(), 4));

        let report = sprawler.sprawl(vec![reference("Europe")], 0).await;

        assert!(report.graph.is_empty());
        assert!(report.layers.is_empty());
        assert_eq!(fetcher.requests(), 0);
    }

    #[tokio::test]
    async fn test_single_layer_with_closing_pass() {
        let mut sprawler = sprawler(music_corpus());
        let report = sprawler.sprawl(vec![reference("Europe")], 1).await;
        let graph = &report.graph;

        // Europe plus its two links
        assert_eq!(graph.node_count(), 3);
        assert!(graph.has_edge(&reference("Europe"), &reference("Pop music")));
        assert!(graph.has_edge(&reference("Europe"), &reference("Étude")));
        // Closing pass: Pop music links back to Europe
        assert!(graph.has_edge(&reference("Pop music"), &reference("Europe")));
        // Closing pass never adds nodes
        assert!(!graph.contains(&reference("Honorific nicknames in popular music")));
        assert!(!graph.contains(&reference("Bülban")));
        assert_eq!(graph.edge_count(), 3);

        assert_eq!(report.layers.len(), 2);
        assert!(report.layers[1].closing);
        assert_eq!(report.layers[1].edges_added, 1);
    }

    #[tokio::test]
    async fn test_two_layers_full_corpus() {
        let mut sprawler = sprawler(music_corpus());
        let report = sprawler.sprawl(vec![reference("Europe")], 2).await;
        let graph = &report.graph;

        assert_eq!(graph.node_count(), 5);
        // Layers: Europe (2 edges), Pop music + Étude (3 edges);
        // closing pass over Honorific nicknames + Bülban (4 edges)
        assert_eq!(graph.edge_count(), 9);
        assert!(graph.has_edge(&reference("Bülban"), &reference("Pop music")));
        assert!(graph.has_edge(
            &reference("Honorific nicknames in popular music"),
            &reference("Étude")
        ));
        assert!(report.failures.is_empty());

        let edges: Vec<usize> = report.layers.iter().map(|layer| layer.edges_added).collect();
        assert_eq!(edges, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_sources_added_without_links() {
        let fetcher = FixtureFetcher::new().article("Island", &[]);
        let mut sprawler = sprawler(fetcher);

        let report = sprawler.sprawl(vec![reference("Island")], 3).await;

        assert_eq!(report.graph.node_count(), 1);
        assert_eq!(report.graph.edge_count(), 0);
        // Frontier exhausted after the first layer; no closing pass
        assert_eq!(report.layers.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_seed_not_a_node() {
        let mut sprawler = sprawler(music_corpus());
        let report = sprawler
            .sprawl(vec![reference("Europe"), reference("Atlantis")], 1)
            .await;

        assert!(!report.graph.contains(&reference("Atlantis")));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Unreachable);
        assert_eq!(report.layers[0].unreachable, 1);
    }

    #[tokio::test]
    async fn test_failed_frontier_node_kept_without_out_edges() {
        // Pop music is linked but cannot be retrieved
        let fetcher = FixtureFetcher::new().article("Europe", &["Pop_music", "Asia"]).article("Asia", &["Europe"]);
        let mut sprawler = sprawler(fetcher);

        let report = sprawler.sprawl(vec![reference("Europe")], 1).await;

        assert!(report.graph.contains(&reference("Pop music")));
        assert_eq!(report.graph.out_degree(&reference("Pop music")), 0);
        assert!(report.graph.has_edge(&reference("Asia"), &reference("Europe")));
    }

    #[tokio::test]
    async fn test_closing_pass_links_only_known_nodes() {
        let fetcher = FixtureFetcher::new()
            .article("Europe", &["Alps", "Danube"])
            .article("Alps", &["Europe", "Danube", "Mont_Blanc"])
            .article("Danube", &["Black_Sea", "Alps"]);
        let mut sprawler = sprawler(fetcher);

        let report = sprawler.sprawl(vec![reference("Europe")], 1).await;
        let graph = &report.graph;

        assert_eq!(graph.node_count(), 3);
        assert!(graph.has_edge(&reference("Alps"), &reference("Europe")));
        assert!(graph.has_edge(&reference("Alps"), &reference("Danube")));
        assert!(graph.has_edge(&reference("Danube"), &reference("Alps")));
        assert!(!graph.contains(&reference("Mont Blanc")));
        assert!(!graph.contains(&reference("Black Sea")));

        let closing = &report.layers[1];
        assert!(closing.closing);
        assert_eq!(closing.layer, 2);
        assert_eq!(closing.requested, 2);
        assert_eq!(closing.edges_added, 3);
        assert_eq!(closing.next_frontier, 0);
    }

    #[tokio::test]
    async fn test_each_reference_expanded_once() {
        let fetcher = Arc::new(music_corpus());
        let mut sprawler = Sprawler::new(BatchExpander::new(Arc::clone(&fetcher), corpus(), 2));

        sprawler.sprawl(vec![reference("Europe")], 4).await;

        // Five articles, each fetched exactly once across layers
        assert_eq!(fetcher.requests(), 5);
    }
}
