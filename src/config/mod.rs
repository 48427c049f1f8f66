//! Configuration module for Wiki-Sprawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wiki_sprawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sprawl.toml")).unwrap();
//! println!("Sprawl will expand {} layers", config.sprawl.iterations);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CorpusConfig, CrawlerConfig, OutputConfig, SprawlConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
