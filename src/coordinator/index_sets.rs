/// Index set rules: unique prefixes and the single writable default
use crate::{
    coordinator::{default_holders, default_index_set, generate_id},
    error::{MockError, MockResult},
    store::{IndexSet, Store},
};
use chrono::Utc;

pub(crate) fn not_found(id: &str) -> MockError {
    MockError::NotFound(format!("No indexSet found with id {}", id))
}

fn not_writable() -> MockError {
    MockError::Conflict("Default index set must be writable.".to_string())
}

pub fn get<'a>(store: &'a Store, id: &str) -> MockResult<&'a IndexSet> {
    store.index_sets.get(id).ok_or_else(|| not_found(id))
}

/// Index sets in insertion order, paged by `skip` and `limit` (0 = no limit)
pub fn list(store: &Store, skip: usize, limit: usize) -> Vec<&IndexSet> {
    let all = store.index_sets.list().into_iter().skip(skip);
    if limit == 0 {
        all.collect()
    } else {
        all.take(limit).collect()
    }
}

fn ensure_prefix_available(store: &Store, prefix: &str, owner: Option<&str>) -> MockResult<()> {
    let taken = store
        .index_sets
        .list()
        .into_iter()
        .any(|other| other.index_prefix == prefix && Some(other.id.as_str()) != owner);

    if taken {
        return Err(MockError::Duplicate(format!(
            "Index prefix \"{}\" would conflict with an existing index set!",
            prefix
        )));
    }
    Ok(())
}

/// Move the default flag to `id`: clear it on every holder, then set it
fn transfer_default(store: &mut Store, id: &str) -> MockResult<()> {
    if !get(store, id)?.writable {
        return Err(not_writable());
    }

    for holder in default_holders(store) {
        if let Some(index_set) = store.index_sets.get_mut(&holder) {
            index_set.default = false;
        }
    }
    if let Some(index_set) = store.index_sets.get_mut(id) {
        index_set.default = true;
    }
    Ok(())
}

/// Create an index set; it becomes the default when asked to or when
/// no default exists yet
pub fn create(store: &mut Store, mut index_set: IndexSet) -> MockResult<IndexSet> {
    if index_set.id.is_empty() {
        index_set.id = generate_id(&store.index_sets);
    } else if store.index_sets.contains(&index_set.id) {
        return Err(MockError::Duplicate(format!(
            "Index set {} already exists.",
            index_set.id
        )));
    }
    ensure_prefix_available(store, &index_set.index_prefix, None)?;

    let make_default = index_set.default || default_index_set(store).is_none();
    if make_default && !index_set.writable {
        return Err(not_writable());
    }

    index_set.default = false;
    index_set.creation_date.get_or_insert_with(Utc::now);
    let id = index_set.id.clone();
    store.index_sets.put(id.clone(), index_set);

    if make_default {
        transfer_default(store, &id)?;
    }
    get(store, &id).cloned()
}

/// Replace an index set; the default flag and creation date are kept
pub fn update(store: &mut Store, id: &str, mut index_set: IndexSet) -> MockResult<IndexSet> {
    let existing = get(store, id)?;
    if existing.default && !index_set.writable {
        return Err(not_writable());
    }

    index_set.id = id.to_string();
    index_set.default = existing.default;
    index_set.creation_date = existing.creation_date;
    ensure_prefix_available(store, &index_set.index_prefix, Some(id))?;

    store.index_sets.put(id, index_set.clone());
    Ok(index_set)
}

pub fn delete(store: &mut Store, id: &str) -> MockResult<()> {
    let index_set = get(store, id)?;
    if index_set.default {
        return Err(MockError::Conflict(format!(
            "Default index set <{}> cannot be deleted!",
            id
        )));
    }
    if let Some(stream) = store
        .streams
        .list()
        .into_iter()
        .find(|stream| stream.index_set_id == id)
    {
        return Err(MockError::Conflict(format!(
            "Index set <{}> is still in use by stream <{}>",
            id, stream.id
        )));
    }

    store.index_sets.delete(id);
    Ok(())
}

pub fn set_default(store: &mut Store, id: &str) -> MockResult<IndexSet> {
    transfer_default(store, id)?;
    get(store, id).cloned()
}
