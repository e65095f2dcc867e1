/// File-based snapshot backend
use crate::{
    error::{MockError, MockResult},
    persistence::{decode_snapshot, encode_snapshot, SnapshotBackend},
    store::Store,
};
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Stores the snapshot as a single JSON file
///
/// Each save writes a temporary sibling file, syncs it, and renames it over
/// the target path, so the target always holds a complete document. The
/// blocking write and the timeout meet at one commit point: once a save has
/// timed out, its temporary file is removed and the rename never happens.
#[derive(Debug, Clone)]
pub struct FileSnapshotBackend {
    path: PathBuf,
    write_timeout: Duration,
}

/// Progress of one save, shared by the writer thread and the waiting caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Pending,
    Published,
    Abandoned,
}

fn lock(state: &Mutex<WriteState>) -> MutexGuard<'_, WriteState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Give up on a save unless it already published; returns whether it did
fn abandon(state: &Mutex<WriteState>) -> bool {
    let mut current = lock(state);
    if *current == WriteState::Published {
        return true;
    }
    *current = WriteState::Abandoned;
    false
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = ?temp_path, error = %e, "Failed to remove temporary snapshot");
        }
    }
}

/// Write `bytes` to `temp_path`, sync it, then rename it over `target`
/// unless the save was abandoned in the meantime
fn write_atomic(
    directory: &Path,
    temp_path: &Path,
    target: &Path,
    bytes: &[u8],
    state: &Mutex<WriteState>,
) -> io::Result<()> {
    let result = (|| -> io::Result<()> {
        std::fs::create_dir_all(directory)?;

        let mut file = std::fs::File::create(temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        let mut current = lock(state);
        if *current == WriteState::Abandoned {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "snapshot write abandoned after timeout",
            ));
        }
        std::fs::rename(temp_path, target)?;
        *current = WriteState::Published;
        Ok(())
    })();

    if result.is_err() {
        remove_temp(temp_path);
    }
    result
}

impl FileSnapshotBackend {
    pub fn new(path: PathBuf, write_timeout: Duration) -> Self {
        Self {
            path,
            write_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.directory()
            .join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}

#[async_trait]
impl SnapshotBackend for FileSnapshotBackend {
    async fn save(&self, store: &Store) -> MockResult<()> {
        let bytes = encode_snapshot(store)?;
        let size = bytes.len();
        let state = Arc::new(Mutex::new(WriteState::Pending));

        let writer = {
            let directory = self.directory();
            let temp_path = self.temp_path();
            let target = self.path.clone();
            let state = Arc::clone(&state);
            tokio::task::spawn_blocking(move || {
                write_atomic(&directory, &temp_path, &target, &bytes, &state)
            })
        };

        match tokio::time::timeout(self.write_timeout, writer).await {
            Ok(joined) => joined
                .map_err(|e| MockError::Internal(format!("Snapshot writer failed: {}", e)))??,
            // the writer removes its temporary file when it reaches the commit point
            Err(_) if !abandon(&state) => {
                return Err(MockError::Persistence(format!(
                    "Writing snapshot {:?} timed out after {:?}",
                    self.path, self.write_timeout
                )));
            }
            Err(_) => {}
        }

        debug!(path = ?self.path, bytes = size, "Saved store snapshot");
        Ok(())
    }

    async fn load(&self) -> MockResult<Option<Store>> {
        match fs::read(&self.path).await {
            Ok(bytes) => decode_snapshot(&bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator;
    use tempfile::tempdir;

    fn backend(path: PathBuf) -> FileSnapshotBackend {
        FileSnapshotBackend::new(path, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path().join("state.json"));

        assert!(backend.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path().join("nested").join("state.json"));
        let store = coordinator::seed();

        backend.save(&store).await.unwrap();

        assert_eq!(backend.load().await.unwrap(), Some(store));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temporary_files() {
        let dir = tempdir().unwrap();
        let backend = backend(dir.path().join("state.json"));

        backend.save(&coordinator::seed()).await.unwrap();
        backend.save(&coordinator::seed()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["state.json".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        let result = backend(path).load().await;
        assert!(matches!(result, Err(MockError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_unwritable_target_fails() {
        let dir = tempdir().unwrap();
        // the target is a directory, so the final rename cannot replace it
        let path = dir.path().join("state.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        let result = backend(path).save(&coordinator::seed()).await;
        assert!(matches!(result, Err(MockError::Io(_))));
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_timed_out_save_cleans_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let backend = FileSnapshotBackend::new(path, Duration::ZERO);

        let mut store = coordinator::seed();
        let template = coordinator::default_index_set(&store).unwrap().clone();
        for n in 0..5000 {
            let mut index_set = template.clone();
            index_set.id = format!("{:024x}", n + 1);
            index_set.index_prefix = format!("set_{}", n);
            index_set.default = false;
            store.index_sets.put(index_set.id.clone(), index_set);
        }

        for _ in 0..10 {
            let result = backend.save(&store).await;
            if result.is_err() {
                assert!(matches!(result, Err(MockError::Persistence(_))));
            }
        }

        // abandoned writers finish on the blocking pool
        for _ in 0..200 {
            if temp_files(dir.path()).is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(temp_files(dir.path()).is_empty());
    }

    #[test]
    fn test_abandoned_write_never_publishes() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("state.json");
        let temp_path = dir.path().join(".state.json.abandoned.tmp");
        let state = Mutex::new(WriteState::Pending);
        assert!(!abandon(&state));

        let result = write_atomic(dir.path(), &temp_path, &target, b"{}", &state);

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::TimedOut);
        assert!(!target.exists());
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_published_write_is_not_abandoned() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("state.json");
        let temp_path = dir.path().join(".state.json.published.tmp");
        let state = Mutex::new(WriteState::Pending);

        write_atomic(dir.path(), &temp_path, &target, b"{}", &state).unwrap();

        assert!(abandon(&state));
        assert!(target.exists());
    }
}
