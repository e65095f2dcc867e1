/// Consistency coordinator
///
/// Cross-resource rules applied to a working copy of the store: unique keys,
/// the single writable default index set, references between kinds and
/// cascading deletes. Every function here either applies its whole change or
/// returns an error; the caller discards the working copy on error.
pub mod index_sets;
pub mod inputs;
pub mod roles;
pub mod streams;
pub mod users;

use crate::{
    error::{MockError, MockResult},
    store::{IndexSet, Keyed, Role, Store, Table, User},
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;

/// Generate a 24 hex digit identifier not yet used in `table`
pub(crate) fn generate_id<T>(table: &Table<T>) -> String {
    loop {
        let id = hex::encode(rand::random::<[u8; 12]>());
        if !table.contains(&id) {
            return id;
        }
    }
}

/// Ids of index sets flagged default, in ascending order
pub(crate) fn default_holders(store: &Store) -> Vec<String> {
    let mut ids: Vec<String> = store
        .index_sets
        .iter()
        .filter(|(_, index_set)| index_set.default)
        .map(|(id, _)| id.to_string())
        .collect();
    ids.sort();
    ids
}

/// The current default index set
pub fn default_index_set(store: &Store) -> Option<&IndexSet> {
    default_holders(store)
        .first()
        .and_then(|id| store.index_sets.get(id))
}

fn check_keys<T: Keyed>(kind: &str, table: &Table<T>) -> MockResult<()> {
    for (key, value) in table.iter() {
        if value.key() != key {
            return Err(MockError::Internal(format!(
                "{} stored under {} has key {}",
                kind,
                key,
                value.key()
            )));
        }
    }
    Ok(())
}

/// Verify every cross-entry invariant of the store
pub fn check_invariants(store: &Store) -> MockResult<()> {
    check_keys("user", &store.users)?;
    check_keys("role", &store.roles)?;
    check_keys("index set", &store.index_sets)?;
    check_keys("stream", &store.streams)?;
    check_keys("stream rule", &store.stream_rules)?;
    check_keys("input", &store.inputs)?;

    let defaults = default_holders(store);
    if defaults.len() != 1 {
        return Err(MockError::Internal(format!(
            "expected exactly one default index set, found {}",
            defaults.len()
        )));
    }
    if let Some(index_set) = store.index_sets.get(&defaults[0]) {
        if !index_set.writable {
            return Err(MockError::Internal(format!(
                "default index set {} is not writable",
                index_set.id
            )));
        }
    }

    let mut prefixes = HashSet::new();
    for index_set in store.index_sets.list() {
        if !prefixes.insert(index_set.index_prefix.as_str()) {
            return Err(MockError::Internal(format!(
                "index prefix {} is used by more than one index set",
                index_set.index_prefix
            )));
        }
    }

    for rule in store.stream_rules.list() {
        if !store.streams.contains(&rule.stream_id) {
            return Err(MockError::Internal(format!(
                "stream rule {} belongs to missing stream {}",
                rule.id, rule.stream_id
            )));
        }
    }

    for stream in store.streams.list() {
        if !store.index_sets.contains(&stream.index_set_id) {
            return Err(MockError::Internal(format!(
                "stream {} points to missing index set {}",
                stream.id, stream.index_set_id
            )));
        }
    }

    for user in store.users.list() {
        if let Some(role) = user.roles.iter().find(|role| !store.roles.contains(role)) {
            return Err(MockError::Internal(format!(
                "user {} has missing role {}",
                user.username, role
            )));
        }
    }

    Ok(())
}

/// Built-in resources of a fresh server
pub fn seed() -> Store {
    let mut store = Store::default();

    store.roles.put(
        "Admin",
        Role {
            name: "Admin".to_string(),
            description: "Grants all permissions for Graylog administrators (built-in)".to_string(),
            permissions: vec!["*".to_string()],
            read_only: true,
        },
    );
    store.roles.put(
        "Reader",
        Role {
            name: "Reader".to_string(),
            description: "Grants basic permissions for every Graylog user (built-in)".to_string(),
            permissions: [
                "clusterconfigentry:read",
                "indexercluster:read",
                "messagecount:read",
                "journal:read",
                "messages:analyze",
                "metrics:read",
                "fieldnames:read",
                "messages:read",
                "system:read",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
            read_only: true,
        },
    );

    let admin_id = generate_id(&store.users);
    store.users.put(
        "admin",
        User {
            id: admin_id,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            permissions: vec!["*".to_string()],
            full_name: "Administrator".to_string(),
            password: Some("admin".to_string()),
            roles: vec!["Admin".to_string()],
            timezone: Some("UTC".to_string()),
            session_timeout_ms: Some(28_800_000),
            startpage: None,
        },
    );

    let index_set_id = generate_id(&store.index_sets);
    store.index_sets.put(
        index_set_id.clone(),
        IndexSet {
            id: index_set_id,
            title: "Default index set".to_string(),
            description: "The Graylog default index set".to_string(),
            index_prefix: "graylog".to_string(),
            shards: 4,
            replicas: 0,
            rotation_strategy_class:
                "org.graylog2.indexer.rotation.strategies.MessageCountRotationStrategy".to_string(),
            rotation_strategy: json!({
                "type": "org.graylog2.indexer.rotation.strategies.MessageCountRotationStrategyConfig",
                "max_docs_per_index": 20000000
            }),
            retention_strategy_class:
                "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategy".to_string(),
            retention_strategy: json!({
                "type": "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategyConfig",
                "max_number_of_indices": 20
            }),
            creation_date: Some(Utc::now()),
            index_analyzer: "standard".to_string(),
            index_optimization_max_num_segments: 1,
            index_optimization_disabled: false,
            field_type_refresh_interval: 5000,
            writable: true,
            default: true,
        },
    );

    store
}
