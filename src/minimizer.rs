use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::datatype::NodeId;

/// Maps a seed to the set of coverage nodes its execution reaches.
///
/// Calls may be expensive (the oracle usually re-executes the target), so the
/// culling pass queries each live seed exactly once per run. Freshness is only
/// required within a single run; wrap the oracle in [`CachingOracle`] to reuse
/// node sets across runs while seeds are unchanged.
pub trait CoverageOracle<S> {
    fn node_set(&mut self, seed: &S) -> HashSet<NodeId>;
}

/// Memoizes node sets per seed value across culling passes.
pub struct CachingOracle<S, O> {
    inner: O,
    cache: HashMap<S, HashSet<NodeId>>,
}

impl<S, O> CachingOracle<S, O>
where
    S: Eq + Hash + Clone,
    O: CoverageOracle<S>,
{
    pub fn new(inner: O) -> Self {
        CachingOracle {
            inner,
            cache: HashMap::new(),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

impl<S, O> CoverageOracle<S> for CachingOracle<S, O>
where
    S: Eq + Hash + Clone,
    O: CoverageOracle<S>,
{
    fn node_set(&mut self, seed: &S) -> HashSet<NodeId> {
        if let Some(nodes) = self.cache.get(seed) {
            return nodes.clone();
        }
        let nodes = self.inner.node_set(seed);
        self.cache.insert(seed.clone(), nodes.clone());
        nodes
    }
}

// Greedy set cover over the live seeds: repeatedly keep the seed covering the
// most not-yet-covered nodes and sweep out every seed whose remaining nodes
// that choice subsumes. Ties pick the earlier entry, via a stable sort.
// O(n^2 * |nodes|); n is bounded by the durable queue capacity.
pub fn redundant_entries<S>(
    mut working: Vec<(usize, S, HashSet<NodeId>)>,
) -> Vec<(usize, S)> {
    let mut redundant = Vec::new();
    while !working.is_empty() {
        working.sort_by(|a, b| b.2.len().cmp(&a.2.len()));
        let (_, _, cover) = working.remove(0);
        for entry in working.iter_mut() {
            entry.2.retain(|node| !cover.contains(node));
        }
        let mut survivors = Vec::with_capacity(working.len());
        for (idx, seed, nodes) in working {
            if nodes.is_empty() {
                redundant.push((idx, seed));
            } else {
                survivors.push((idx, seed, nodes));
            }
        }
        working = survivors;
    }
    redundant
}
