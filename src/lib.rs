//! Wiki-Sprawl: link-graph crawling and path search over a linked-document corpus
//!
//! This crate crawls Wikipedia-style articles into a bounded-depth directed
//! graph of article-to-article references, then searches that graph (or the
//! live corpus) for paths between a source and a target article.

pub mod config;
pub mod crawler;
pub mod graph;
pub mod output;
pub mod reference;
pub mod search;
pub mod storage;

use thiserror::Error;

/// Main error type for Wiki-Sprawl operations
#[derive(Debug, Error)]
pub enum SprawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("Embedding error: {0}")]
    Embedding(#[from] search::EmbeddingError),

    #[error("Graph error: {0}")]
    Graph(#[from] graph::GraphError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reference-specific errors
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed reference: {0}")]
    Malformed(String),
}

/// Connectivity failure: a document could not be retrieved
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request for {reference} failed: {source}")]
    Transport {
        reference: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{reference} answered with HTTP {status}")]
    Status { reference: String, status: u16 },
}

/// Structural-parse failure: a document is not a content page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Unable to find the main content section")]
    NoContentSection,
}

/// Result type alias for Wiki-Sprawl operations
pub type Result<T> = std::result::Result<T, SprawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for reference operations
pub type ReferenceResult<T> = std::result::Result<T, ReferenceError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{extract_links, BatchExpander, Sprawler};
pub use graph::Graph;
pub use reference::{AdjacencySet, Corpus, Reference};
pub use search::{all_shortest_paths, greedy_walk, shortest_path};
