//! Wiki-Sprawl main entry point
//!
//! This is the command-line interface for building article link graphs and
//! searching them for paths between two articles.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wiki_sprawl::config::{load_config_with_hash, Config};
use wiki_sprawl::crawler::{run_sprawl, BlockingFetcher};
use wiki_sprawl::graph::Graph;
use wiki_sprawl::output::{
    generate_markdown_summary, generate_summary, load_run_graph, load_statistics,
    print_statistics, read_graph, write_graph,
};
use wiki_sprawl::reference::{Corpus, Reference};
use wiki_sprawl::search::{
    all_shortest_paths, greedy_walk, shortest_path, EmbeddingTable, LiveAdjacency, Neighbors,
};
use wiki_sprawl::storage::{RunStatus, SqliteStorage, Storage};
use wiki_sprawl::SprawlError;

/// Wiki-Sprawl: article link graphs and path search
///
/// Wiki-Sprawl crawls a Wikipedia-style corpus breadth-first from a set of
/// seed articles, stores the resulting link graph, and finds paths between
/// articles either in a stored graph or by browsing the live corpus.
#[derive(Parser, Debug)]
#[command(name = "wiki-sprawl")]
#[command(version)]
#[command(about = "Article link graphs and path search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the link graph from the configured seeds
    Sprawl {
        /// Validate config and show what would be sprawled without fetching
        #[arg(long)]
        dry_run: bool,
    },

    /// Find one shortest path between two articles
    Shortest(SearchArgs),

    /// Find every shortest path between two articles
    AllShortest(SearchArgs),

    /// Walk toward the target by title similarity
    Walk {
        #[command(flatten)]
        search: SearchArgs,

        /// Word-vector file (word2vec text format)
        #[arg(long, value_name = "FILE")]
        vectors: PathBuf,
    },

    /// Show statistics from the database
    Stats {
        /// Run to describe (defaults to the latest)
        #[arg(long)]
        run: Option<i64>,
    },

    /// Generate markdown summary from existing data
    ExportSummary {
        /// Run to summarize (defaults to the latest)
        #[arg(long)]
        run: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Source article (URL or title)
    from: String,

    /// Target article (URL or title)
    to: String,

    /// Search a node-link graph file instead of the configured graph path
    #[arg(long, value_name = "FILE", conflicts_with_all = ["live", "run"])]
    graph: Option<PathBuf>,

    /// Search the graph stored in the database for a run
    #[arg(long, value_name = "ID", conflicts_with = "live")]
    run: Option<i64>,

    /// Browse the live corpus instead of a stored graph
    #[arg(long)]
    live: bool,
}

/// A search to run once adjacency is available
enum Query {
    Shortest,
    AllShortest,
    Walk(EmbeddingTable),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Sprawl { dry_run: true } => handle_dry_run(&config)?,
        Command::Sprawl { dry_run: false } => handle_sprawl(&config, &config_hash).await?,
        Command::Shortest(search) => handle_search(config, search, Query::Shortest).await?,
        Command::AllShortest(search) => handle_search(config, search, Query::AllShortest).await?,
        Command::Walk { search, vectors } => {
            tracing::info!("Loading word vectors from: {}", vectors.display());
            let table = EmbeddingTable::load(&vectors)
                .with_context(|| format!("failed to load vectors from {}", vectors.display()))?;
            tracing::info!("Loaded {} vectors", table.len());
            handle_search(config, search, Query::Walk(table)).await?
        }
        Command::Stats { run } => handle_stats(&config, run)?,
        Command::ExportSummary { run } => handle_export_summary(&config, run)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_sprawl=info,warn"),
            1 => EnvFilter::new("wiki_sprawl=debug,info"),
            2 => EnvFilter::new("wiki_sprawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles `sprawl --dry-run`: validates config and shows what would be sprawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let corpus = config.corpus()?;
    let seeds = config.seed_references()?;

    println!("=== Wiki-Sprawl Dry Run ===\n");

    println!("Corpus:");
    println!("  Base URL: {}", corpus.base_url());
    println!("  Article root: {}", corpus.article_root());

    println!("\nCrawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Iterations: {}", config.sprawl.iterations);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Graph: {}", config.output.graph_path);
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {} ({})", corpus.title(seed), seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would sprawl {} layers from {} seed articles",
        config.sprawl.iterations,
        seeds.len()
    );

    Ok(())
}

/// Handles `sprawl`: builds the graph, records the run and writes outputs
async fn handle_sprawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let corpus = config.corpus()?;
    let seeds: Vec<Reference> = config.seed_references()?.into_iter().collect();

    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    let run_id = storage.create_run(config_hash, &corpus, &seeds, config.sprawl.iterations)?;
    tracing::info!("Started run {}", run_id);

    let report = match run_sprawl(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Sprawl failed: {}", e);
            storage.update_run_status(run_id, RunStatus::Failed)?;
            return Err(e.into());
        }
    };

    storage.save_graph(run_id, &report.graph, &corpus)?;
    storage.save_layers(run_id, &report.layers)?;
    storage.record_failures(run_id, &report.failures)?;
    storage.complete_run(run_id)?;

    let attributes = BTreeMap::from([
        ("run".to_string(), run_id.to_string()),
        ("iterations".to_string(), config.sprawl.iterations.to_string()),
        ("config_hash".to_string(), config_hash.to_string()),
    ]);
    write_graph(
        &report.graph,
        &corpus,
        attributes,
        Path::new(&config.output.graph_path),
    )?;

    let summary = generate_summary(&storage, Some(run_id))?;
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    tracing::info!(
        "Sprawl completed: {} nodes, {} edges, {} dropped documents",
        report.graph.node_count(),
        report.graph.edge_count(),
        report.failures.len()
    );
    println!("✓ Graph written to: {}", config.output.graph_path);
    println!("✓ Summary written to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the search commands over a stored graph or the live corpus
async fn handle_search(config: Config, args: SearchArgs, query: Query) -> anyhow::Result<()> {
    let corpus = config.corpus()?;
    let source = corpus.resolve(&args.from)?;
    let target = corpus.resolve(&args.to)?;

    if args.live {
        let user_agent = config.user_agent.clone();
        let timeout = config.crawler.request_timeout();

        // The blocking client must be built and used off the async runtime
        tokio::task::spawn_blocking(move || -> Result<(), SprawlError> {
            let fetcher = BlockingFetcher::from_config(&user_agent, timeout)?;
            let live = LiveAdjacency::new(fetcher, corpus);
            let result = run_query(&live, live.corpus(), &query, &source, &target);
            tracing::info!("Expanded {} articles", live.expanded());
            result
        })
        .await??;
        return Ok(());
    }

    let graph: Graph = if let Some(run) = args.run {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))
            .with_context(|| format!("failed to open {}", config.output.database_path))?;
        load_run_graph(&storage, Some(run))?.1
    } else {
        let path = args
            .graph
            .unwrap_or_else(|| PathBuf::from(&config.output.graph_path));
        tracing::info!("Loading graph from: {}", path.display());
        let graph = read_graph(&path, &corpus)
            .with_context(|| format!("failed to read graph {}", path.display()))?;
        tracing::info!(
            "Loaded {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    };

    run_query(&graph, &corpus, &query, &source, &target)?;
    Ok(())
}

/// Runs one query and prints its result
fn run_query<N: Neighbors + ?Sized>(
    adjacency: &N,
    corpus: &Corpus,
    query: &Query,
    source: &Reference,
    target: &Reference,
) -> Result<(), SprawlError> {
    match query {
        Query::Shortest => match shortest_path(adjacency, source, target)? {
            Some(path) => {
                println!("{}", corpus.format_path(&path));
                println!("Length: {} links", path.len() - 1);
            }
            None => println!(
                "No path from {} to {}",
                corpus.title(source),
                corpus.title(target)
            ),
        },
        Query::AllShortest => {
            let paths = all_shortest_paths(adjacency, source, target)?;
            if paths.is_empty() {
                println!(
                    "No path from {} to {}",
                    corpus.title(source),
                    corpus.title(target)
                );
            } else {
                println!(
                    "{} shortest paths of length {}:",
                    paths.len(),
                    paths[0].len() - 1
                );
                for path in &paths {
                    println!("  {}", corpus.format_path(path));
                }
            }
        }
        Query::Walk(vectors) => {
            let walk = greedy_walk(adjacency, corpus, vectors, source, target)?;
            println!("{}", corpus.format_path(&walk.path));
            if walk.reached() {
                println!("Reached target in {} links", walk.path.len() - 1);
            } else {
                println!("Dead end after {} links", walk.path.len() - 1);
            }
        }
    }

    Ok(())
}

/// Handles the `stats` command: shows statistics from the database
fn handle_stats(config: &Config, run: Option<i64>) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    let run_id = match run {
        Some(id) => id,
        None => match storage.get_latest_run()? {
            Some(record) => record.id,
            None => {
                println!("No sprawl runs recorded yet");
                return Ok(());
            }
        },
    };

    // Load statistics
    let stats = load_statistics(&storage, run_id)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the `export-summary` command: generates markdown summary
fn handle_export_summary(config: &Config, run: Option<i64>) -> anyhow::Result<()> {
    println!("=== Exporting Sprawl Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    // Open the database
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    // Generate summary from storage
    tracing::info!("Loading sprawl data from database...");
    let summary = generate_summary(&storage, run)?;

    // Write markdown summary to file
    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}
