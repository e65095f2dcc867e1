/// Index set statistics
///
/// The mock never ingests messages, so every index set reports its single
/// active write index and nothing else. Totals are sums over all index sets.
use crate::{
    coordinator::index_sets,
    error::MockResult,
    store::{IndexSet, IndexSetStats, Store},
};
use std::collections::BTreeMap;

fn derive(_index_set: &IndexSet) -> IndexSetStats {
    IndexSetStats {
        indices: 1,
        documents: 0,
        size: 0,
    }
}

pub fn stats_for(store: &Store, id: &str) -> MockResult<IndexSetStats> {
    index_sets::get(store, id).map(derive)
}

/// Stats of every index set, keyed by id in ascending order
pub fn stats_for_all(store: &Store) -> BTreeMap<String, IndexSetStats> {
    store
        .index_sets
        .iter()
        .map(|(id, index_set)| (id.to_string(), derive(index_set)))
        .collect()
}

pub fn total(store: &Store) -> IndexSetStats {
    stats_for_all(store)
        .into_values()
        .fold(IndexSetStats::default(), |sum, stats| sum + stats)
}
