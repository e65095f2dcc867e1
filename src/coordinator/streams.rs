/// Stream and stream rule rules
///
/// A stream owns its rules: rules are only reachable through their stream,
/// and deleting a stream deletes them too. Streams point at an index set.
use crate::{
    coordinator::generate_id,
    error::{MockError, MockResult},
    store::{Store, Stream, StreamPatch, StreamRule},
};
use chrono::Utc;

fn not_found(id: &str) -> MockError {
    MockError::NotFound(format!("Stream <{}> not found!", id))
}

fn rule_not_found(id: &str) -> MockError {
    MockError::NotFound(format!("Stream rule <{}> not found!", id))
}

fn ensure_index_set_exists(store: &Store, id: &str) -> MockResult<()> {
    if !store.index_sets.contains(id) {
        return Err(MockError::Validation(format!(
            "No indexSet found with id {}",
            id
        )));
    }
    Ok(())
}

pub fn get<'a>(store: &'a Store, id: &str) -> MockResult<&'a Stream> {
    store.streams.get(id).ok_or_else(|| not_found(id))
}

pub fn list_enabled(store: &Store) -> Vec<&Stream> {
    store
        .streams
        .list()
        .into_iter()
        .filter(|stream| !stream.disabled)
        .collect()
}

/// Create a stream with its initial rules; new streams start paused
pub fn create(store: &mut Store, mut stream: Stream, rules: Vec<StreamRule>) -> MockResult<Stream> {
    if stream.id.is_empty() {
        stream.id = generate_id(&store.streams);
    } else if store.streams.contains(&stream.id) {
        return Err(MockError::Duplicate(format!(
            "Stream {} already exists.",
            stream.id
        )));
    }
    ensure_index_set_exists(store, &stream.index_set_id)?;

    stream.disabled = true;
    stream.created_at.get_or_insert_with(Utc::now);
    store.streams.put(stream.id.clone(), stream.clone());

    for rule in rules {
        create_rule(store, &stream.id, rule)?;
    }
    Ok(stream)
}

pub fn update(store: &mut Store, id: &str, patch: StreamPatch) -> MockResult<Stream> {
    let mut stream = get(store, id)?.clone();
    if let Some(index_set_id) = patch.index_set_id.as_deref() {
        ensure_index_set_exists(store, index_set_id)?;
    }

    patch.apply(&mut stream);
    store.streams.put(id, stream.clone());
    Ok(stream)
}

/// Delete a stream and every rule it owns
pub fn delete(store: &mut Store, id: &str) -> MockResult<()> {
    get(store, id)?;

    let owned: Vec<String> = rules(store, id)?
        .into_iter()
        .map(|rule| rule.id.clone())
        .collect();
    for rule_id in owned {
        store.stream_rules.delete(&rule_id);
    }

    store.streams.delete(id);
    Ok(())
}

fn set_disabled(store: &mut Store, id: &str, disabled: bool) -> MockResult<()> {
    let stream = store.streams.get_mut(id).ok_or_else(|| not_found(id))?;
    stream.disabled = disabled;
    Ok(())
}

pub fn pause(store: &mut Store, id: &str) -> MockResult<()> {
    set_disabled(store, id, true)
}

pub fn resume(store: &mut Store, id: &str) -> MockResult<()> {
    set_disabled(store, id, false)
}

/// Rules of a stream in creation order
pub fn rules<'a>(store: &'a Store, stream_id: &str) -> MockResult<Vec<&'a StreamRule>> {
    get(store, stream_id)?;
    Ok(store
        .stream_rules
        .list()
        .into_iter()
        .filter(|rule| rule.stream_id == stream_id)
        .collect())
}

pub fn get_rule<'a>(store: &'a Store, stream_id: &str, rule_id: &str) -> MockResult<&'a StreamRule> {
    get(store, stream_id)?;
    store
        .stream_rules
        .get(rule_id)
        .filter(|rule| rule.stream_id == stream_id)
        .ok_or_else(|| rule_not_found(rule_id))
}

pub fn create_rule(store: &mut Store, stream_id: &str, mut rule: StreamRule) -> MockResult<StreamRule> {
    get(store, stream_id)?;

    rule.id = generate_id(&store.stream_rules);
    rule.stream_id = stream_id.to_string();
    store.stream_rules.put(rule.id.clone(), rule.clone());
    Ok(rule)
}

pub fn update_rule(
    store: &mut Store,
    stream_id: &str,
    rule_id: &str,
    mut rule: StreamRule,
) -> MockResult<StreamRule> {
    get_rule(store, stream_id, rule_id)?;

    rule.id = rule_id.to_string();
    rule.stream_id = stream_id.to_string();
    store.stream_rules.put(rule_id, rule.clone());
    Ok(rule)
}

pub fn delete_rule(store: &mut Store, stream_id: &str, rule_id: &str) -> MockResult<()> {
    get_rule(store, stream_id, rule_id)?;
    store.stream_rules.delete(rule_id);
    Ok(())
}
