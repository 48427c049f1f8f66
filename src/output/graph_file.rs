//! Node-link graph files

use crate::graph::{from_node_link, to_node_link, Graph, NodeLink};
use crate::output::summary::OutputResult;
use crate::reference::Corpus;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes a graph as pretty-printed node-link JSON
///
/// # Arguments
///
/// * `graph` - The graph to export
/// * `corpus` - Corpus used to derive node titles
/// * `attributes` - Graph-level attributes stored under `"graph"`
/// * `path` - Destination file
pub fn write_graph(
    graph: &Graph,
    corpus: &Corpus,
    attributes: BTreeMap<String, String>,
    path: &Path,
) -> OutputResult<()> {
    let document = to_node_link(graph, corpus, attributes);

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "Wrote {} nodes and {} links to {}",
        document.nodes.len(),
        document.links.len(),
        path.display()
    );
    Ok(())
}

/// Reads the raw node-link document
pub fn read_node_link(path: &Path) -> OutputResult<NodeLink> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Reads and validates a node-link graph file
pub fn read_graph(path: &Path, corpus: &Corpus) -> OutputResult<Graph> {
    let document = read_node_link(path)?;
    Ok(from_node_link(&document, corpus)?)
}
