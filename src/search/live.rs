//! On-demand adjacency over the live corpus
//!
//! Searches that run without a prebuilt graph expand articles as they are
//! visited. Each article is fetched at most once per search; a document
//! that cannot be expanded is treated as having no neighbours.

use crate::crawler::{expand_blocking, AdjacencyCache, BlockingFetcher};
use crate::reference::{AdjacencySet, Corpus, Reference};
use crate::search::Neighbors;
use std::borrow::Cow;
use std::cell::RefCell;

pub struct LiveAdjacency {
    fetcher: BlockingFetcher,
    corpus: Corpus,
    cache: RefCell<AdjacencyCache>,
}

impl LiveAdjacency {
    pub fn new(fetcher: BlockingFetcher, corpus: Corpus) -> Self {
        Self {
            fetcher,
            corpus,
            cache: RefCell::new(AdjacencyCache::new()),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Number of distinct articles expanded so far
    pub fn expanded(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl Neighbors for LiveAdjacency {
    /// Any article of the corpus may be searched
    fn contains(&self, node: &Reference) -> bool {
        self.corpus.is_article(node)
    }

    fn neighbors(&self, node: &Reference) -> Cow<'_, AdjacencySet> {
        if let Some(links) = self.cache.borrow_mut().lookup(node) {
            return Cow::Owned(links.clone());
        }

        let links = match expand_blocking(&self.fetcher, &self.corpus, node) {
            Ok(links) => links,
            Err(error) => {
                tracing::warn!("Treating {} as a dead end ({}): {}", node, error.kind(), error);
                AdjacencySet::new()
            }
        };

        self.cache.borrow_mut().insert(node.clone(), links.clone());
        Cow::Owned(links)
    }
}
