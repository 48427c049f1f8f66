//! Node-link JSON interchange
//!
//! The document shape is the common node-link layout
//! (`{"directed", "multigraph", "graph", "nodes", "links"}`) so exported
//! graphs load directly into other graph tooling. Node ids are normalized
//! references; titles are informational.

use crate::graph::{Graph, GraphError};
use crate::reference::Corpus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLink {
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    /// Free-form graph attributes (corpus, run id, config hash, ...)
    #[serde(default)]
    pub graph: BTreeMap<String, String>,
    pub nodes: Vec<NodeLinkNode>,
    pub links: Vec<NodeLinkEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLinkEdge {
    pub source: String,
    pub target: String,
}

/// Converts a graph into a node-link document
pub fn to_node_link(graph: &Graph, corpus: &Corpus, attributes: BTreeMap<String, String>) -> NodeLink {
    let nodes = graph
        .nodes()
        .map(|node| NodeLinkNode {
            id: node.to_string(),
            title: Some(corpus.title(node)),
        })
        .collect();

    let links = graph
        .edges()
        .map(|(source, target)| NodeLinkEdge {
            source: source.to_string(),
            target: target.to_string(),
        })
        .collect();

    NodeLink {
        directed: true,
        multigraph: false,
        graph: attributes,
        nodes,
        links,
    }
}

/// Rebuilds a graph from a node-link document
///
/// Every id is normalized against the corpus, and every link must join two
/// listed nodes.
pub fn from_node_link(document: &NodeLink, corpus: &Corpus) -> Result<Graph, GraphError> {
    if !document.directed {
        return Err(GraphError::Undirected);
    }

    let mut graph = Graph::new();
    for node in &document.nodes {
        graph.add_node(normalize_id(&node.id, corpus)?);
    }

    for link in &document.links {
        let source = normalize_id(&link.source, corpus)?;
        let target = normalize_id(&link.target, corpus)?;
        if !graph.contains(&source) || !graph.contains(&target) {
            return Err(GraphError::DanglingLink {
                source_id: link.source.clone(),
                target_id: link.target.clone(),
            });
        }
        graph.add_edge(source, target);
    }

    Ok(graph)
}

fn normalize_id(id: &str, corpus: &Corpus) -> Result<crate::reference::Reference, GraphError> {
    corpus.normalize(id).map_err(|source| GraphError::InvalidNode {
        id: id.to_string(),
        source,
    })
}
