//! Run-scoped cache of expanded articles
//!
//! Entries are kept for the lifetime of the owner (one sprawl run or one
//! live search). Nothing is evicted and nothing persists across runs.

use crate::reference::{AdjacencySet, Reference};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct AdjacencyCache {
    entries: HashMap<Reference, AdjacencySet>,
    hits: u64,
}

impl AdjacencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previously expanded article, counting the hit
    pub fn lookup(&mut self, reference: &Reference) -> Option<&AdjacencySet> {
        let entry = self.entries.get(reference);
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    pub fn insert(&mut self, reference: Reference, links: AdjacencySet) {
        self.entries.insert(reference, links);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Corpus;

    #[test]
    fn test_cache_lookup_counts_hits() {
        let corpus = Corpus::new("https://en.wikipedia.org", "/wiki/").unwrap();
        let europe = corpus.resolve("Europe").unwrap();
        let asia = corpus.resolve("Asia").unwrap();

        let mut cache = AdjacencyCache::new();
        assert!(cache.is_empty());

        cache.insert(europe.clone(), AdjacencySet::from([asia.clone()]));
        assert_eq!(cache.len(), 1);

        assert!(cache.lookup(&asia).is_none());
        assert_eq!(cache.hits(), 0);

        let links = cache.lookup(&europe).unwrap();
        assert!(links.contains(&asia));
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_insert_replaces_entry() {
        let corpus = Corpus::new("https://en.wikipedia.org", "/wiki/").unwrap();
        let europe = corpus.resolve("Europe").unwrap();
        let asia = corpus.resolve("Asia").unwrap();

        let mut cache = AdjacencyCache::new();
        cache.insert(europe.clone(), AdjacencySet::from([asia]));
        cache.insert(europe.clone(), AdjacencySet::new());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.lookup(&europe), Some(&AdjacencySet::new()));
    }
}
