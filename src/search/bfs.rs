//! Breadth-first shortest-path searches
//!
//! Queue entries carry the path walked so far. Neighbours are visited in
//! adjacency-set order, which makes the returned path deterministic.

use crate::reference::Reference;
use crate::search::{ensure_known, ArticlePath, Neighbors, SearchError};
use std::collections::{HashMap, HashSet, VecDeque};

/// Finds one shortest path from `source` to `target`
///
/// # Returns
///
/// * `Ok(Some(path))` - A path with the fewest edges
/// * `Ok(None)` - The target is unreachable
/// * `Err(SearchError::UnknownNode)` - An endpoint is not searchable
pub fn shortest_path<N: Neighbors + ?Sized>(
    adjacency: &N,
    source: &Reference,
    target: &Reference,
) -> Result<Option<ArticlePath>, SearchError> {
    ensure_known(adjacency, source)?;
    ensure_known(adjacency, target)?;

    if source == target {
        return Ok(Some(vec![source.clone()]));
    }

    let mut queue = VecDeque::from([(source.clone(), vec![source.clone()])]);
    let mut visited = HashSet::new();

    while let Some((current, path)) = queue.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }

        for next in adjacency.neighbors(&current).iter() {
            if visited.contains(next) {
                continue;
            }

            let mut extended = path.clone();
            extended.push(next.clone());
            if next == target {
                return Ok(Some(extended));
            }
            queue.push_back((next.clone(), extended));
        }
    }

    Ok(None)
}

/// Finds every shortest path from `source` to `target`
///
/// A node may be entered several times as long as every entry happens at
/// the layer where it was first discovered, so all equal-length routes
/// through it are enumerated. The search stops once the queue reaches
/// paths as long as the optimum.
///
/// # Returns
///
/// * `Ok(paths)` - All shortest paths in discovery order (empty when unreachable)
/// * `Err(SearchError::UnknownNode)` - An endpoint is not searchable
pub fn all_shortest_paths<N: Neighbors + ?Sized>(
    adjacency: &N,
    source: &Reference,
    target: &Reference,
) -> Result<Vec<ArticlePath>, SearchError> {
    ensure_known(adjacency, source)?;
    ensure_known(adjacency, target)?;

    if source == target {
        return Ok(vec![vec![source.clone()]]);
    }

    let mut paths: Vec<ArticlePath> = Vec::new();
    let mut optimal_len: Option<usize> = None;
    let mut discovered_at: HashMap<Reference, usize> = HashMap::from([(source.clone(), 0)]);
    let mut queue = VecDeque::from([(source.clone(), vec![source.clone()])]);

    while let Some((current, path)) = queue.pop_front() {
        if optimal_len.is_some_and(|len| path.len() >= len) {
            break;
        }

        let neighbors = adjacency.neighbors(&current);
        if neighbors.contains(target) {
            let mut found = path.clone();
            found.push(target.clone());

            let len = *optimal_len.get_or_insert(found.len());
            if found.len() == len {
                paths.push(found);
            }
            continue;
        }

        // Layer at which every neighbour of `current` is entered
        let depth = path.len();
        for next in neighbors.iter() {
            match discovered_at.get(next) {
                Some(&layer) if layer != depth => continue,
                Some(_) => {}
                None => {
                    discovered_at.insert(next.clone(), depth);
                }
            }

            let mut extended = path.clone();
            extended.push(next.clone());
            queue.push_back((next.clone(), extended));
        }
    }

    Ok(paths)
}
