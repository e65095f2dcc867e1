/// Snapshot persistence for the resource store
///
/// The whole store is written as one JSON document after every accepted
/// mutation. Backends must publish a snapshot atomically: a reader sees
/// either the previous document or the new one, never a partial write.
pub mod file;

pub use file::FileSnapshotBackend;

use crate::{
    error::{MockError, MockResult},
    store::Store,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Current snapshot document version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Durable storage for whole-store snapshots
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Durably replace the current snapshot with `store`
    async fn save(&self, store: &Store) -> MockResult<()>;

    /// Read the current snapshot; `None` when nothing was saved yet
    async fn load(&self) -> MockResult<Option<Store>>;
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    resources: &'a Store,
}

#[derive(Deserialize)]
struct SnapshotDocument {
    version: u32,
    resources: Store,
}

/// Encode a store as a snapshot document
pub fn encode_snapshot(store: &Store) -> MockResult<Vec<u8>> {
    let document = SnapshotRef {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        resources: store,
    };
    Ok(serde_json::to_vec_pretty(&document)?)
}

/// Decode a snapshot document back into a store
pub fn decode_snapshot(bytes: &[u8]) -> MockResult<Store> {
    let document: SnapshotDocument = serde_json::from_slice(bytes)
        .map_err(|e| MockError::Persistence(format!("Invalid snapshot document: {}", e)))?;

    if document.version != SNAPSHOT_VERSION {
        return Err(MockError::Persistence(format!(
            "Unsupported snapshot version {} (expected {})",
            document.version, SNAPSHOT_VERSION
        )));
    }

    Ok(document.resources)
}

/// Snapshot backend that keeps the last document in memory
///
/// Used when no data path is configured. Snapshots still go through the
/// encoder so a broken resource fails the same way it would on disk.
#[derive(Default)]
pub struct MemorySnapshotBackend {
    last: Mutex<Option<Vec<u8>>>,
}

#[async_trait]
impl SnapshotBackend for MemorySnapshotBackend {
    async fn save(&self, store: &Store) -> MockResult<()> {
        let bytes = encode_snapshot(store)?;
        let mut last = self
            .last
            .lock()
            .map_err(|_| MockError::Internal("snapshot lock poisoned".to_string()))?;
        *last = Some(bytes);
        Ok(())
    }

    async fn load(&self) -> MockResult<Option<Store>> {
        let last = self
            .last
            .lock()
            .map_err(|_| MockError::Internal("snapshot lock poisoned".to_string()))?;
        last.as_deref().map(decode_snapshot).transpose()
    }
}
