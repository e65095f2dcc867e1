/// Process-wide store handle shared by every request handler
use crate::{
    coordinator,
    error::MockResult,
    persistence::SnapshotBackend,
    store::Store,
};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// Store behind one read-write lock, with write-through snapshots
///
/// Mutations run against a working copy while the write lock is held. The
/// copy replaces the live store only after the invariant check and the
/// snapshot write both succeeded, so a rejected or failed request leaves
/// nothing behind.
pub struct SharedStore {
    inner: RwLock<Store>,
    backend: Arc<dyn SnapshotBackend>,
}

impl SharedStore {
    /// Load the last snapshot, or seed a fresh store when there is none
    pub async fn open(backend: Arc<dyn SnapshotBackend>) -> MockResult<Self> {
        let store = match backend.load().await? {
            Some(store) => {
                coordinator::check_invariants(&store)?;
                info!(
                    users = store.users.len(),
                    index_sets = store.index_sets.len(),
                    streams = store.streams.len(),
                    "Loaded store snapshot"
                );
                store
            }
            None => {
                let store = coordinator::seed();
                backend.save(&store).await?;
                info!("No snapshot found, seeded default resources");
                store
            }
        };

        Ok(Self {
            inner: RwLock::new(store),
            backend,
        })
    }

    /// Shared read access; blocks while a mutation is in flight
    pub async fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.inner.read().await
    }

    /// Run `f` as one atomic read-modify-write step
    pub async fn mutate<T, F>(&self, f: F) -> MockResult<T>
    where
        F: FnOnce(&mut Store) -> MockResult<T>,
    {
        let mut live = self.inner.write().await;
        let mut working = live.clone();

        let output = f(&mut working)?;
        coordinator::check_invariants(&working)?;
        self.backend.save(&working).await?;

        *live = working;
        debug!("Published store mutation");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::MockError,
        persistence::MemorySnapshotBackend,
        store::Role,
    };
    use async_trait::async_trait;

    struct FailingBackend;

    #[async_trait]
    impl SnapshotBackend for FailingBackend {
        async fn save(&self, _store: &Store) -> MockResult<()> {
            Err(MockError::Persistence("disk full".to_string()))
        }

        async fn load(&self) -> MockResult<Option<Store>> {
            Ok(Some(coordinator::seed()))
        }
    }

    fn role(name: &str) -> Role {
        Role {
            name: name.to_string(),
            description: String::new(),
            permissions: vec![],
            read_only: false,
        }
    }

    #[tokio::test]
    async fn test_open_seeds_and_persists() {
        let backend = Arc::new(MemorySnapshotBackend::default());
        let shared = SharedStore::open(backend.clone()).await.unwrap();

        assert_eq!(shared.read().await.index_sets.len(), 1);
        assert!(backend.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mutation_is_published() {
        let shared = SharedStore::open(Arc::new(MemorySnapshotBackend::default()))
            .await
            .unwrap();

        shared
            .mutate(|store| {
                store.roles.put("ops", role("ops"));
                Ok(())
            })
            .await
            .unwrap();

        assert!(shared.read().await.roles.contains("ops"));
    }

    #[tokio::test]
    async fn test_rejected_mutation_leaves_store_untouched() {
        let shared = SharedStore::open(Arc::new(MemorySnapshotBackend::default()))
            .await
            .unwrap();
        let before = shared.read().await.clone();

        let result: MockResult<()> = shared
            .mutate(|store| {
                store.roles.put("ops", role("ops"));
                Err(MockError::Conflict("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*shared.read().await, before);
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back() {
        let shared = SharedStore::open(Arc::new(FailingBackend)).await.unwrap();
        let before = shared.read().await.clone();

        let result = shared
            .mutate(|store| {
                store.roles.put("ops", role("ops"));
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(MockError::Persistence(_))));
        assert_eq!(*shared.read().await, before);
    }

    #[tokio::test]
    async fn test_invariant_violation_is_rejected() {
        let shared = SharedStore::open(Arc::new(MemorySnapshotBackend::default()))
            .await
            .unwrap();

        let result = shared
            .mutate(|store| {
                for index_set in store.index_sets.values_mut() {
                    index_set.default = false;
                }
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(MockError::Internal(_))));
        assert_eq!(
            shared
                .read()
                .await
                .index_sets
                .list()
                .iter()
                .filter(|is| is.default)
                .count(),
            1
        );
    }
}
