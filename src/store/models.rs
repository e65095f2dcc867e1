/// Resource models shared by the store, the API and the snapshot format
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resources stored in a [`super::Table`] expose the key they are stored under
pub trait Keyed {
    fn key(&self) -> &str;
}

/// User account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startpage: Option<Value>,
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.username
    }
}

/// Partial user update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub session_timeout_ms: Option<u64>,
    pub startpage: Option<Value>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(permissions) = self.permissions {
            user.permissions = permissions;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if self.password.is_some() {
            user.password = self.password;
        }
        if let Some(roles) = self.roles {
            user.roles = roles;
        }
        if self.timezone.is_some() {
            user.timezone = self.timezone;
        }
        if self.session_timeout_ms.is_some() {
            user.session_timeout_ms = self.session_timeout_ms;
        }
        if self.startpage.is_some() {
            user.startpage = self.startpage;
        }
    }
}

/// Authorization role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub permissions: Vec<String>,
    #[serde(default)]
    pub read_only: bool,
}

impl Keyed for Role {
    fn key(&self) -> &str {
        &self.name
    }
}

fn default_true() -> bool {
    true
}

fn default_shards() -> u32 {
    4
}

fn default_one() -> u32 {
    1
}

fn default_index_analyzer() -> String {
    "standard".to_string()
}

fn default_retention_class() -> String {
    "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategy".to_string()
}

fn default_retention_strategy() -> Value {
    serde_json::json!({
        "type": "org.graylog2.indexer.retention.strategies.DeletionRetentionStrategyConfig",
        "max_number_of_indices": 20
    })
}

fn default_field_type_refresh_interval() -> u64 {
    5000
}

/// Index set: rotation and retention configuration for a family of indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSet {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub index_prefix: String,
    #[serde(default = "default_shards")]
    pub shards: u32,
    #[serde(default)]
    pub replicas: u32,
    pub rotation_strategy_class: String,
    pub rotation_strategy: Value,
    #[serde(default = "default_retention_class")]
    pub retention_strategy_class: String,
    #[serde(default = "default_retention_strategy")]
    pub retention_strategy: Value,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default = "default_index_analyzer")]
    pub index_analyzer: String,
    #[serde(default = "default_one")]
    pub index_optimization_max_num_segments: u32,
    #[serde(default)]
    pub index_optimization_disabled: bool,
    #[serde(default = "default_field_type_refresh_interval")]
    pub field_type_refresh_interval: u64,
    #[serde(default = "default_true")]
    pub writable: bool,
    #[serde(default)]
    pub default: bool,
}

impl Keyed for IndexSet {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Derived index set statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSetStats {
    pub indices: u64,
    pub documents: u64,
    pub size: u64,
}

impl std::ops::Add for IndexSetStats {
    type Output = IndexSetStats;

    fn add(self, other: IndexSetStats) -> IndexSetStats {
        IndexSetStats {
            indices: self.indices + other.indices,
            documents: self.documents + other.documents,
            size: self.size + other.size,
        }
    }
}

/// How the rules of a stream combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchingType {
    #[default]
    And,
    Or,
}

/// Stream; its rules live in their own table and point back via `stream_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub index_set_id: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub matching_type: MatchingType,
    #[serde(default)]
    pub remove_matches_from_default_stream: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Keyed for Stream {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Partial stream update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub index_set_id: Option<String>,
    pub matching_type: Option<MatchingType>,
    pub remove_matches_from_default_stream: Option<bool>,
}

impl StreamPatch {
    pub fn apply(self, stream: &mut Stream) {
        if let Some(title) = self.title {
            stream.title = title;
        }
        if let Some(description) = self.description {
            stream.description = description;
        }
        if let Some(index_set_id) = self.index_set_id {
            stream.index_set_id = index_set_id;
        }
        if let Some(matching_type) = self.matching_type {
            stream.matching_type = matching_type;
        }
        if let Some(remove) = self.remove_matches_from_default_stream {
            stream.remove_matches_from_default_stream = remove;
        }
    }
}

/// Stream rule, owned by exactly one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub stream_id: String,
    pub field: String,
    #[serde(rename = "type")]
    pub rule_type: u8,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub inverted: bool,
    #[serde(default)]
    pub description: String,
}

impl Keyed for StreamRule {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Message input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub input_type: String,
    pub configuration: Map<String, Value>,
    #[serde(default)]
    pub global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Keyed for Input {
    fn key(&self) -> &str {
        &self.id
    }
}
