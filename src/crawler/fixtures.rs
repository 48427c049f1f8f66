//! In-memory corpus used by crawler and search tests

use crate::crawler::Fetch;
use crate::reference::{Corpus, Reference};
use crate::FetchError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const BASE_URL: &str = "https://en.wikipedia.org";

pub fn corpus() -> Corpus {
    Corpus::new(BASE_URL, "/wiki/").unwrap()
}

pub fn reference(title: &str) -> Reference {
    corpus().resolve(title).unwrap()
}

/// Renders an article page linking to the given article ids
pub fn article_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|id| format!(r#"<li><a href="/wiki/{}">{}</a></li>"#, id, id))
        .collect();
    format!(
        r#"<html><body><div class="mw-parser-output"><ul>{}</ul>
        <h2 id="See_also">See also</h2><a href="/wiki/Not_followed">x</a></div></body></html>"#,
        anchors
    )
}

/// Pages served by article id; unknown ids answer HTTP 404
#[derive(Debug, Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    requests: AtomicUsize,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn article(mut self, id: &str, links: &[&str]) -> Self {
        self.pages.insert(id.to_string(), article_html(links));
        self
    }

    pub fn page(mut self, id: &str, html: &str) -> Self {
        self.pages.insert(id.to_string(), html.to_string());
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Fetch for FixtureFetcher {
    async fn fetch(&self, reference: &Reference) -> Result<Vec<u8>, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let id = reference
            .as_str()
            .trim_start_matches(BASE_URL)
            .trim_start_matches("/wiki/");
        let page = self.pages.get(id).cloned();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        page.map(String::into_bytes).ok_or_else(|| FetchError::Status {
            reference: reference.to_string(),
            status: 404,
        })
    }
}

impl Fetch for Arc<FixtureFetcher> {
    async fn fetch(&self, reference: &Reference) -> Result<Vec<u8>, FetchError> {
        self.as_ref().fetch(reference).await
    }
}

/// Five-article corpus whose sprawl from Europe is fully known
///
/// Europe → {Pop music, Étude}; Pop music → {Honorific nicknames…, Europe};
/// Étude → {Bülban}; Honorific nicknames… → {Étude, Europe};
/// Bülban → {Europe, Pop music}.
pub fn music_corpus() -> FixtureFetcher {
    FixtureFetcher::new()
        .article("Europe", &["Pop_music", "%C3%89tude"])
        .article(
            "Pop_music",
            &["Honorific_nicknames_in_popular_music", "Europe"],
        )
        .article("%C3%89tude", &["B%C3%BClban"])
        .article(
            "Honorific_nicknames_in_popular_music",
            &["%C3%89tude", "Europe"],
        )
        .article("B%C3%BClban", &["Europe", "Pop_music"])
}
