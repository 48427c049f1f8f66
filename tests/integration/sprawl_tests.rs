//! Integration tests for sprawling and searching
//!
//! These tests use wiremock to serve a small article corpus and exercise
//! the HTTP fetcher, the batch expander, a full sprawl with persistence and
//! the path searches over both the stored graph and the live corpus.

use std::collections::BTreeMap;
use tempfile::TempDir;
use wiki_sprawl::config::{
    Config, CorpusConfig, CrawlerConfig, OutputConfig, SprawlConfig, UserAgentConfig,
};
use wiki_sprawl::crawler::{run_sprawl, BatchExpander, BlockingFetcher, FailureKind, HttpFetcher};
use wiki_sprawl::output::{generate_summary, read_graph, write_graph};
use wiki_sprawl::reference::{Corpus, Reference};
use wiki_sprawl::search::{all_shortest_paths, shortest_path, LiveAdjacency};
use wiki_sprawl::storage::{SqliteStorage, Storage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Five linked articles; `Honorific_nicknames_in_popular_music` and
/// `B%C3%BClban` are only reached in the second layer
const MUSIC_CORPUS: &[(&str, &[&str])] = &[
    ("Europe", &["Pop_music", "%C3%89tude"]),
    ("Pop_music", &["Honorific_nicknames_in_popular_music", "Europe"]),
    ("%C3%89tude", &["B%C3%BClban"]),
    ("Honorific_nicknames_in_popular_music", &["%C3%89tude", "Europe"]),
    ("B%C3%BClban", &["Europe", "Pop_music"]),
];

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Creates a test configuration pointing at the mock corpus
fn create_test_config(base_url: &str, seeds: Vec<String>, iterations: u32, dir: &TempDir) -> Config {
    let file = |name: &str| dir.path().join(name).to_string_lossy().into_owned();
    Config {
        corpus: CorpusConfig {
            base_url: base_url.to_string(),
            path_prefix: "/wiki/".to_string(),
        },
        crawler: CrawlerConfig {
            max_concurrent_fetches: 3,
            request_timeout_secs: 5,
        },
        sprawl: SprawlConfig { iterations, seeds },
        user_agent: user_agent(),
        output: OutputConfig {
            graph_path: file("graph.json"),
            database_path: file("sprawl.db"),
            summary_path: file("summary.md"),
        },
    }
}

/// Article page with its links in the body and a trailing "See also"
fn article_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|id| format!(r#"<p>Read about <a href="/wiki/{}">{}</a>.</p>"#, id, id))
        .collect();
    format!(
        r#"<html><head><title>Article</title></head><body>
        <div id="mw-content-text"><div class="mw-parser-output">{}
        <p>Also <a href="/wiki/Help:Contents">help</a>.<sup class="reference"><a href="/wiki/Cited">[1]</a></sup></p>
        <h2 id="See_also">See also</h2>
        <ul><li><a href="/wiki/Unrelated">Unrelated</a></li></ul>
        </div></div></body></html>"#,
        anchors
    )
}

async fn mount_article(server: &MockServer, id: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/wiki/{}", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_html(links))
                .insert_header("content-type", "text/html; charset=UTF-8"),
        )
        .mount(server)
        .await;
}

async fn mount_music_corpus(server: &MockServer) {
    for (id, links) in MUSIC_CORPUS {
        mount_article(server, id, links).await;
    }
}

fn titles(corpus: &Corpus, path: &[Reference]) -> Vec<String> {
    path.iter().map(|reference| corpus.title(reference)).collect()
}

#[tokio::test]
async fn test_batch_tolerates_partial_failure() {
    let mock_server = MockServer::start().await;
    let corpus = Corpus::new(&mock_server.uri(), "/wiki/").unwrap();

    mount_article(&mock_server, "Europe", &["Asia#Geography", "Atlantic_Ocean", "Asia"]).await;

    // Disambiguation-style page without a content region
    Mock::given(method("GET"))
        .and(path("/wiki/Mercury"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Mercury may refer to:</p></body></html>"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wiki/Atlantis"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::from_config(&user_agent(), std::time::Duration::from_secs(5)).unwrap();
    let mut expander = BatchExpander::new(fetcher, corpus.clone(), 2);

    let europe = corpus.resolve("Europe").unwrap();
    let mercury = corpus.resolve("Mercury").unwrap();
    let atlantis = corpus.resolve("Atlantis").unwrap();
    let outcome = expander
        .expand(vec![europe.clone(), mercury.clone(), atlantis.clone()])
        .await;

    assert_eq!(outcome.adjacency.len(), 1);
    let links = &outcome.adjacency[&europe];
    assert_eq!(
        links.iter().map(|r| corpus.title(r)).collect::<Vec<_>>(),
        vec!["Asia", "Atlantic Ocean"]
    );

    assert_eq!(outcome.failures.len(), 2);
    let kind_of = |reference: &Reference| {
        outcome
            .failures
            .iter()
            .find(|failure| &failure.reference == reference)
            .map(|failure| failure.kind)
    };
    assert_eq!(kind_of(&mercury), Some(FailureKind::NotContent));
    assert_eq!(kind_of(&atlantis), Some(FailureKind::Unreachable));
}

#[tokio::test]
async fn test_full_sprawl_with_persistence() {
    let mock_server = MockServer::start().await;
    mount_music_corpus(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), vec!["Europe".to_string()], 2, &dir);
    let corpus = config.corpus().unwrap();

    let report = run_sprawl(&config).await.unwrap();

    assert_eq!(report.graph.node_count(), 5);
    assert_eq!(report.graph.edge_count(), 9);
    assert!(report.failures.is_empty());
    assert_eq!(report.layers.len(), 3);
    assert!(report.layers[2].closing);
    assert_eq!(report.layers[2].edges_added, 4);

    // Every endpoint of every edge is a discovered node
    for (source, target) in report.graph.edges() {
        assert!(report.graph.contains(source));
        assert!(report.graph.contains(target));
    }

    // Persist and summarize
    let mut storage = SqliteStorage::new(std::path::Path::new(&config.output.database_path)).unwrap();
    let seeds: Vec<Reference> = config.seed_references().unwrap().into_iter().collect();
    let run_id = storage.create_run("test-hash", &corpus, &seeds, 2).unwrap();
    storage.save_graph(run_id, &report.graph, &corpus).unwrap();
    storage.save_layers(run_id, &report.layers).unwrap();
    storage.record_failures(run_id, &report.failures).unwrap();
    storage.complete_run(run_id).unwrap();

    assert_eq!(storage.load_graph(run_id).unwrap(), report.graph);

    let summary = generate_summary(&storage, None).unwrap();
    assert_eq!(summary.run_id, run_id);
    assert_eq!(summary.total_nodes, 5);
    assert_eq!(summary.total_edges, 9);
    assert_eq!(summary.dead_ends, 0);
    assert_eq!(summary.layers.len(), 3);

    // Export and search the stored graph
    let graph_path = std::path::Path::new(&config.output.graph_path);
    write_graph(&report.graph, &corpus, BTreeMap::new(), graph_path).unwrap();
    let graph = read_graph(graph_path, &corpus).unwrap();

    let europe = corpus.resolve("Europe").unwrap();
    let bulban = corpus.resolve("Bülban").unwrap();
    let path = shortest_path(&graph, &europe, &bulban).unwrap().unwrap();
    assert_eq!(titles(&corpus, &path), vec!["Europe", "Étude", "Bülban"]);

    let pop = corpus.resolve("Pop music").unwrap();
    let paths = all_shortest_paths(&graph, &pop, &bulban).unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(
        titles(&corpus, &paths[0]),
        vec!["Pop music", "Europe", "Étude", "Bülban"]
    );
    assert_eq!(
        titles(&corpus, &paths[1]),
        vec![
            "Pop music",
            "Honorific nicknames in popular music",
            "Étude",
            "Bülban"
        ]
    );
}

#[tokio::test]
async fn test_sprawl_drops_unreachable_seed() {
    let mock_server = MockServer::start().await;
    mount_music_corpus(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        &mock_server.uri(),
        vec!["Europe".to_string(), "Atlantis".to_string()],
        1,
        &dir,
    );

    let report = run_sprawl(&config).await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Unreachable);
    assert_eq!(report.layers[0].requested, 2);
    assert_eq!(report.layers[0].expanded, 1);
    assert_eq!(report.layers[0].unreachable, 1);

    let corpus = config.corpus().unwrap();
    assert!(!report.graph.contains(&corpus.resolve("Atlantis").unwrap()));
    assert!(report.graph.contains(&corpus.resolve("Europe").unwrap()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_live_shortest_path() {
    let mock_server = MockServer::start().await;
    mount_music_corpus(&mock_server).await;

    let corpus = Corpus::new(&mock_server.uri(), "/wiki/").unwrap();
    let europe = corpus.resolve("Europe").unwrap();
    let bulban = corpus.resolve("Bülban").unwrap();

    // The blocking client must run off the async workers
    let (path, expanded) = tokio::task::spawn_blocking(move || {
        let fetcher =
            BlockingFetcher::from_config(&user_agent(), std::time::Duration::from_secs(5)).unwrap();
        let live = LiveAdjacency::new(fetcher, corpus);
        let path = shortest_path(&live, &europe, &bulban).unwrap().unwrap();
        (titles(live.corpus(), &path), live.expanded())
    })
    .await
    .unwrap();

    assert_eq!(path, vec!["Europe", "Étude", "Bülban"]);
    assert!(expanded >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_live_search_treats_missing_article_as_dead_end() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, "Europe", &["Atlantis"]).await;

    let corpus = Corpus::new(&mock_server.uri(), "/wiki/").unwrap();
    let europe = corpus.resolve("Europe").unwrap();
    let target = corpus.resolve("Asia").unwrap();

    let path = tokio::task::spawn_blocking(move || {
        let fetcher =
            BlockingFetcher::from_config(&user_agent(), std::time::Duration::from_secs(5)).unwrap();
        let live = LiveAdjacency::new(fetcher, corpus);
        shortest_path(&live, &europe, &target).unwrap()
    })
    .await
    .unwrap();

    assert!(path.is_none());
}
