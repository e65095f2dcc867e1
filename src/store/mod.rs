/// In-memory resource store
///
/// Plain keyed tables with no validation; the coordinator is responsible
/// for every invariant that spans entries or kinds.
pub mod models;
pub mod shared;

pub use models::{
    IndexSet, IndexSetStats, Input, Keyed, MatchingType, Role, Stream, StreamPatch, StreamRule,
    User, UserPatch,
};
pub use shared::SharedStore;

use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Keyed table that remembers insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    entries: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn put(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push(key);
        }
    }

    pub fn delete(&mut self, key: &str) -> Option<T> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Values in insertion order
    pub fn list(&self) -> Vec<&T> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// (key, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.as_str(), value)))
    }

    /// Mutable access to every value; order is unspecified
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Serialize> Serialize for Table<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TableVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for TableVisitor<T>
where
    T: Deserialize<'de> + Keyed,
{
    type Value = Table<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of resources keyed by identifier")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = Table::default();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            if value.key() != key {
                return Err(de::Error::custom(format!(
                    "resource stored under {:?} has key {:?}",
                    key,
                    value.key()
                )));
            }
            if table.contains(&key) {
                return Err(de::Error::custom(format!("duplicate key {:?}", key)));
            }
            table.put(key, value);
        }
        Ok(table)
    }
}

impl<'de, T> Deserialize<'de> for Table<T>
where
    T: Deserialize<'de> + Keyed,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor(PhantomData))
    }
}

/// Every resource kind the mock server knows about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    #[serde(default)]
    pub users: Table<User>,
    #[serde(default)]
    pub roles: Table<Role>,
    #[serde(default)]
    pub index_sets: Table<IndexSet>,
    #[serde(default)]
    pub streams: Table<Stream>,
    #[serde(default)]
    pub stream_rules: Table<StreamRule>,
    #[serde(default)]
    pub inputs: Table<Input>,
}
