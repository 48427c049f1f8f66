use crate::reference::{Corpus, Reference};
use crate::ConfigError;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

/// Main configuration structure for Wiki-Sprawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub sprawl: SprawlConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Builds the corpus description from the `[corpus]` table
    pub fn corpus(&self) -> Result<Corpus, ConfigError> {
        Corpus::new(&self.corpus.base_url, &self.corpus.path_prefix)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid corpus: {}", e)))
    }

    /// Resolves every configured seed (URL or title) to a reference
    pub fn seed_references(&self) -> Result<BTreeSet<Reference>, ConfigError> {
        let corpus = self.corpus()?;
        self.sprawl
            .seeds
            .iter()
            .map(|seed| {
                corpus
                    .resolve(seed)
                    .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed '{}': {}", seed, e)))
            })
            .collect()
    }
}

/// Where the corpus lives
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// Scheme and host of every article
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Internal document-path prefix
    #[serde(rename = "path-prefix", default = "default_path_prefix")]
    pub path_prefix: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path_prefix: default_path_prefix(),
        }
    }
}

/// Fetching behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Transport-level deadline for one request (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// What to sprawl
#[derive(Debug, Clone, Deserialize)]
pub struct SprawlConfig {
    /// Number of breadth-first layers to expand
    pub iterations: u32,

    /// Seed articles, as URLs or titles
    pub seeds: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the node-link JSON export
    #[serde(rename = "graph-path")]
    pub graph_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

fn default_base_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_path_prefix() -> String {
    "/wiki/".to_string()
}

fn default_max_concurrent_fetches() -> u32 {
    20
}

fn default_request_timeout_secs() -> u64 {
    30
}
