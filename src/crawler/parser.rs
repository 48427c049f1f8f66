//! Link extraction for article pages
//!
//! Turning a page into its adjacency set is a two-stage pipeline:
//!
//! 1. **Structural boundaries**: locate the main-content container
//!    (the `mw-parser-output` div of the article body, not the one page
//!    status indicators render into) and the cutoff, the
//!    first terminal section inside it (See also, References, Further
//!    reading, External links, Notes, Bibliography, or a `reflist`
//!    container). Everything at or after the cutoff is ignored.
//! 2. **Link scanning**: walk the content in document order, skipping
//!    citation markers (`<sup>` elements and spans whose class mentions
//!    `reference`), and keep every href that [`Corpus::article_link`]
//!    accepts.

use crate::reference::{AdjacencySet, Corpus};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// Selector of every parsed-wikitext container
const CONTENT_SELECTOR: &str = "div.mw-parser-output";

/// Id of the wrapper around the article body
const BODY_CONTAINER_ID: &str = "mw-content-text";

/// Class fragment of page status indicators (protection padlock, featured star)
const INDICATOR_CLASS: &str = "mw-indicator";

/// Section anchors that end the article body (compared case-insensitively)
const TERMINAL_SECTION_IDS: &[&str] = &[
    "See_also",
    "References",
    "Further_reading",
    "External_links",
    "Notes",
    "Bibliography",
];

/// Class fragment of the references-list container
const REFERENCE_LIST_CLASS: &str = "reflist";

/// Class fragment of inline citation spans
const CITATION_CLASS: &str = "reference";

/// Class of the legacy heading wrapper that carries the section id
const HEADLINE_CLASS: &str = "mw-headline";

/// Extracts the adjacency set of one article
///
/// The content is decoded lossily, so decoding itself never fails.
///
/// # Arguments
///
/// * `content` - Raw bytes of the fetched page
/// * `corpus` - The corpus whose article links should be kept
///
/// # Returns
///
/// * `Ok(AdjacencySet)` - Normalized references linked from the main content
/// * `Err(ExtractError::NoContentSection)` - The page has no main-content
///   container, so it is not an article
///
/// # Example
///
/// ```
/// use wiki_sprawl::crawler::extract_links;
/// use wiki_sprawl::reference::Corpus;
///
/// let corpus = Corpus::new("https://en.wikipedia.org", "/wiki/").unwrap();
/// let html = r#"<div class="mw-parser-output"><p><a href="/wiki/Clarinet">clarinet</a></p></div>"#;
/// let links = extract_links(html.as_bytes(), &corpus).unwrap();
/// assert!(links.contains("https://en.wikipedia.org/wiki/Clarinet"));
/// ```
pub fn extract_links(content: &[u8], corpus: &Corpus) -> Result<AdjacencySet, ExtractError> {
    let html = String::from_utf8_lossy(content);
    let document = Html::parse_document(&html);

    let main_content = find_main_content(&document).ok_or(ExtractError::NoContentSection)?;

    let mut links = AdjacencySet::new();
    scan_links(main_content, corpus, &mut links);
    Ok(links)
}

/// Collects article links below `element` in document order
///
/// Returns false once a terminal section has been reached, which stops the
/// scan for the rest of the document.
fn scan_links(element: ElementRef<'_>, corpus: &Corpus, links: &mut AdjacencySet) -> bool {
    for child in element.children().filter_map(ElementRef::wrap) {
        if is_terminal_marker(&child) {
            return false;
        }
        if is_citation(&child) {
            continue;
        }

        if child.value().name() == "a" {
            if let Some(reference) = child.value().attr("href").and_then(|href| corpus.article_link(href)) {
                links.insert(reference);
            }
        }

        if !scan_links(child, corpus, links) {
            return false;
        }
    }

    true
}

/// Picks the article body among the parsed-wikitext containers
///
/// Status indicators carry their own container ahead of the body, so those
/// are skipped. A container inside `#mw-content-text` wins; otherwise the
/// first remaining one is used.
fn find_main_content(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(CONTENT_SELECTOR).ok()?;

    let mut fallback = None;
    for container in document.select(&selector) {
        if has_ancestor(&container, |ancestor| class_contains(ancestor, INDICATOR_CLASS)) {
            continue;
        }
        if has_ancestor(&container, |ancestor| ancestor.value().id() == Some(BODY_CONTAINER_ID)) {
            return Some(container);
        }
        fallback.get_or_insert(container);
    }

    fallback
}

fn has_ancestor(element: &ElementRef<'_>, predicate: impl Fn(&ElementRef<'_>) -> bool) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| predicate(&ancestor))
}

/// Start of a section that is not part of the article body
fn is_terminal_marker(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    match value.name() {
        "h2" => value.id().is_some_and(is_terminal_section_id),
        "span" => {
            class_contains(element, HEADLINE_CLASS) && value.id().is_some_and(is_terminal_section_id)
        }
        "div" => class_contains(element, REFERENCE_LIST_CLASS),
        _ => false,
    }
}

fn is_terminal_section_id(id: &str) -> bool {
    TERMINAL_SECTION_IDS
        .iter()
        .any(|terminal| terminal.eq_ignore_ascii_case(id))
}

/// Superscript markers and inline reference spans
fn is_citation(element: &ElementRef<'_>) -> bool {
    match element.value().name() {
        "sup" => true,
        "span" => class_contains(element, CITATION_CLASS),
        _ => false,
    }
}

/// Substring match on the raw class attribute
fn class_contains(element: &ElementRef<'_>, fragment: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| class.contains(fragment))
}
