/// Snapshot durability and concurrency tests
mod common;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use common::*;
use graylog_mock::{
    coordinator,
    error::{MockError, MockResult},
    persistence::{FileSnapshotBackend, SnapshotBackend},
    store::Store,
};
use serde_json::json;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tempfile::TempDir;

/// Backend that can be told to fail every save
#[derive(Default)]
struct FlakyBackend {
    failing: AtomicBool,
}

#[async_trait]
impl SnapshotBackend for FlakyBackend {
    async fn save(&self, _store: &Store) -> MockResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MockError::Persistence("disk unavailable".to_string()));
        }
        Ok(())
    }

    async fn load(&self) -> MockResult<Option<Store>> {
        Ok(Some(coordinator::seed()))
    }
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let backend = || -> Arc<dyn SnapshotBackend> {
        Arc::new(FileSnapshotBackend::new(path.clone(), Duration::from_secs(5)))
    };

    let app = app_with_backend(backend()).await;
    post(&app, "/api/users", alice()).await;
    let (_, created) = post(&app, "/api/system/indices/index_sets", index_set("Web", "web")).await;
    let id = created["id"].as_str().unwrap().to_string();
    send(&app, Method::PUT, &format!("/api/system/indices/index_sets/{}/default", id), None).await;
    post(
        &app,
        "/api/streams",
        json!({"title": "Web", "index_set_id": id, "rules": [{"field": "source", "type": 1}]}),
    )
    .await;

    let mut before = Vec::new();
    for uri in ["/api/users", "/api/roles", "/api/system/indices/index_sets", "/api/streams"] {
        before.push(get(&app, uri).await);
    }
    drop(app);

    let restarted = app_with_backend(backend()).await;
    for (uri, expected) in ["/api/users", "/api/roles", "/api/system/indices/index_sets", "/api/streams"]
        .into_iter()
        .zip(before)
    {
        assert_eq!(get(&restarted, uri).await, expected, "{} changed across restart", uri);
    }
    assert_eq!(default_index_set_id(&restarted).await, id);
}

#[tokio::test]
async fn test_failed_save_leaves_state_unchanged() {
    let backend = Arc::new(FlakyBackend::default());
    let app = app_with_backend(backend.clone()).await;
    let (_, before) = get(&app, "/api/users").await;

    backend.failing.store(true, Ordering::SeqCst);
    let (status, error) = post(&app, "/api/users", alice()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_api_error(&error);
    assert_eq!(error["message"], "Internal server error");

    let (_, after) = get(&app, "/api/users").await;
    assert_eq!(before, after);

    backend.failing.store(false, Ordering::SeqCst);
    let (status, _) = post(&app, "/api/users", alice()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_corrupt_snapshot_refused_at_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{ not json").unwrap();

    let backend: Arc<dyn SnapshotBackend> =
        Arc::new(FileSnapshotBackend::new(path, Duration::from_secs(5)));
    let result = graylog_mock::store::SharedStore::open(backend).await;

    assert!(matches!(result, Err(MockError::Persistence(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_set_default_keeps_single_default() {
    let app = app().await;
    let mut ids = Vec::new();
    for n in 0..8 {
        let (_, created) = post(
            &app,
            "/api/system/indices/index_sets",
            index_set(&format!("Set {}", n), &format!("set_{}", n)),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let mut handles = Vec::new();
    for id in ids.iter().cloned() {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            send(
                &app,
                Method::PUT,
                &format!("/api/system/indices/index_sets/{}/default", id),
                None,
            )
            .await
            .0
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    let (_, list) = get(&app, "/api/system/indices/index_sets").await;
    let defaults: Vec<&str> = list["index_sets"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|index_set| index_set["default"] == json!(true))
        .map(|index_set| index_set["id"].as_str().unwrap())
        .collect();
    assert_eq!(defaults.len(), 1);
    assert!(ids.iter().any(|id| id == defaults[0]));
}
