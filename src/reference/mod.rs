//! Corpus references and titles
//!
//! A [`Reference`] is the canonical (normalized) address of one article in
//! the corpus. A [`Corpus`] knows the base URL and the internal
//! document-path prefix, and is the only place references get minted:
//! normalization, in-corpus link recognition, title derivation and path
//! formatting all live here.

mod normalize;
mod title;

pub use normalize::normalize_reference;
pub use title::{derive_title, encode_title, format_titles, PATH_SEPARATOR};

use crate::{ReferenceError, ReferenceResult};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// Canonical identifier of one document (a normalized absolute URL)
///
/// Equality is exact string equality. References are only created through
/// [`Corpus`] or [`normalize_reference`], so two equal references always
/// denote the same document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub(crate) fn from_normalized(url: String) -> Self {
        Self(url)
    }

    /// The normalized URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Reference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Reference {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The set of references linked from one document's main content
///
/// Ordered so that every consumer (graph construction, search tie-breaking)
/// sees neighbours in the same sequence.
pub type AdjacencySet = BTreeSet<Reference>;

/// A linked-document corpus: where articles live and how they are addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    base_url: Url,
    path_prefix: String,
}

impl Corpus {
    /// Creates a corpus description
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme and host of every article (e.g. `https://en.wikipedia.org`)
    /// * `path_prefix` - Internal document-path prefix (e.g. `/wiki/`)
    ///
    /// # Example
    ///
    /// ```
    /// use wiki_sprawl::reference::Corpus;
    ///
    /// let corpus = Corpus::new("https://en.wikipedia.org", "/wiki/").unwrap();
    /// let europe = corpus.resolve("Europe").unwrap();
    /// assert_eq!(europe.as_str(), "https://en.wikipedia.org/wiki/Europe");
    /// ```
    pub fn new(base_url: &str, path_prefix: &str) -> ReferenceResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ReferenceError::Parse(format!("{}: {}", base_url, e)))?;

        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(ReferenceError::InvalidScheme(base_url.scheme().to_string()));
        }
        if base_url.host_str().is_none() {
            return Err(ReferenceError::MissingHost);
        }
        if !path_prefix.starts_with('/') || !path_prefix.ends_with('/') || path_prefix.len() < 2
        {
            return Err(ReferenceError::Malformed(format!(
                "path prefix must start and end with '/', got '{}'",
                path_prefix
            )));
        }

        Ok(Self {
            base_url,
            path_prefix: path_prefix.to_string(),
        })
    }

    /// Base URL every relative link is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Internal document-path prefix (starts and ends with '/')
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Absolute address under which every article lives,
    /// e.g. `https://en.wikipedia.org/wiki/`
    pub fn article_root(&self) -> String {
        format!(
            "{}{}",
            self.base_url.origin().ascii_serialization(),
            self.path_prefix
        )
    }

    /// Normalizes an absolute URL or a path relative to the corpus base
    pub fn normalize(&self, input: &str) -> ReferenceResult<Reference> {
        normalize_reference(input, &self.base_url)
    }

    /// Resolves user input to a reference
    ///
    /// `http(s)://` URLs and absolute paths are normalized as-is; anything
    /// else is read as an article title.
    pub fn resolve(&self, input: &str) -> ReferenceResult<Reference> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ReferenceError::Malformed("empty article name".to_string()));
        }

        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return self.normalize(trimmed);
        }
        if trimmed.starts_with('/') {
            return self.normalize(trimmed);
        }

        self.normalize(&format!("{}{}", self.path_prefix, encode_title(trimmed)))
    }

    /// Returns true if the reference addresses an article of this corpus
    pub fn is_article(&self, reference: &Reference) -> bool {
        reference
            .as_str()
            .strip_prefix(&self.article_root())
            .is_some_and(|rest| !rest.is_empty())
    }

    /// Recognizes an in-corpus article hyperlink
    ///
    /// The href must begin with the document-path prefix and contain no
    /// namespace separator (':'). Any fragment is dropped, so a
    /// section-anchored link denotes its base document.
    pub fn article_link(&self, href: &str) -> Option<Reference> {
        if !href.starts_with(&self.path_prefix) || href.contains(':') {
            return None;
        }

        let base = href.split('#').next().unwrap_or_default();
        if base.len() <= self.path_prefix.len() {
            return None;
        }

        self.normalize(base).ok()
    }

    /// Human-readable title of a reference
    ///
    /// Strips the article root, percent-decodes the remainder and turns
    /// underscores into spaces. Never fails; foreign references are decoded
    /// whole.
    pub fn title(&self, reference: &Reference) -> String {
        let raw = reference.as_str();
        let article_root = self.article_root();
        derive_title(raw.strip_prefix(&article_root).unwrap_or(raw))
    }

    /// Formats a path as titles joined by [`PATH_SEPARATOR`]
    pub fn format_path(&self, path: &[Reference]) -> String {
        format_titles(path.iter().map(|reference| self.title(reference)))
    }
}
