// ABOUTME: Tests for snapshot persistence and the single-writer state handle.
// ABOUTME: Covers missing/corrupt files, on-disk format and publish-after-save.

mod support;

use dockscout::state::{STATE_FILENAME, StateError, StateHandle, StateSnapshot, StateStore};
use support::{at, record};

#[tokio::test]
async fn missing_file_loads_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::in_dir(dir.path());

    let snapshot = store.load().await.unwrap();

    assert!(snapshot.images.is_empty());
    assert!(snapshot.last_refresh.is_none());
}

#[tokio::test]
async fn save_then_load_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::in_dir(&dir.path().join("nested"));
    let mut checked = record("b", Some(at(20)));
    checked.update_available = Some(true);
    checked.update_message = Some("digest changed".to_string());
    let snapshot = StateSnapshot {
        images: vec![record("a", None), checked],
        last_refresh: Some(at(30)),
    };

    store.save(&snapshot).await.unwrap();

    assert_eq!(store.load().await.unwrap(), snapshot);
    assert!(!dir.path().join("nested/db.json.tmp").exists());
}

#[tokio::test]
async fn file_uses_camel_case_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::in_dir(dir.path());
    store
        .save(&StateSnapshot {
            images: vec![record("a", None)],
            last_refresh: Some(at(0)),
        })
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join(STATE_FILENAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert!(json.get("lastRefresh").is_some());
    let first = &json["images"][0];
    for field in [
        "id",
        "repo",
        "registry",
        "displayName",
        "source",
        "status",
        "lastSeen",
        "lastUpdateCheck",
        "updateAvailable",
        "updateMessage",
        "composeFile",
    ] {
        assert!(first.get(field).is_some(), "missing field {field}");
    }
    assert_eq!(first["source"], "socket");
    assert_eq!(first["status"], "running");
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(STATE_FILENAME), "{not json").unwrap();

    let err = StateStore::in_dir(dir.path()).load().await.unwrap_err();

    assert!(matches!(err, StateError::Corrupt { .. }));
}

#[tokio::test]
async fn older_file_without_refresh_time_loads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(STATE_FILENAME), r#"{"images":[]}"#).unwrap();

    let snapshot = StateStore::in_dir(dir.path()).load().await.unwrap();
    assert!(snapshot.last_refresh.is_none());
}

#[tokio::test]
async fn mutate_publishes_after_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::in_dir(dir.path());
    let handle = StateHandle::open(store.clone()).await.unwrap();

    let saved = handle
        .mutate(|latest| {
            let mut next = latest.clone();
            next.images.push(record("a", None));
            Ok::<_, StateError>(next)
        })
        .await
        .unwrap();

    assert_eq!(saved.images.len(), 1);
    assert_eq!(handle.snapshot().images.len(), 1);
    assert_eq!(store.load().await.unwrap().images.len(), 1);
}

#[tokio::test]
async fn failed_mutation_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::in_dir(dir.path());
    let handle = StateHandle::open(store.clone()).await.unwrap();

    let result = handle
        .mutate(|_| {
            Err::<StateSnapshot, _>(StateError::Io {
                path: dir.path().to_path_buf(),
                source: std::io::Error::other("boom"),
            })
        })
        .await;

    assert!(result.is_err());
    assert!(handle.snapshot().images.is_empty());
    assert!(!dir.path().join(STATE_FILENAME).exists());
}

#[tokio::test]
async fn failed_save_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the rename fail.
    std::fs::create_dir(dir.path().join(STATE_FILENAME)).unwrap();
    let store = StateStore::in_dir(dir.path());
    let handle = StateHandle::with_snapshot(store, StateSnapshot::default());

    let result = handle
        .mutate(|_| {
            Ok::<_, StateError>(StateSnapshot {
                images: vec![record("a", None)],
                last_refresh: None,
            })
        })
        .await;

    assert!(matches!(result, Err(StateError::Io { .. })));
    assert!(handle.snapshot().images.is_empty());
}

#[tokio::test]
async fn concurrent_mutations_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let handle = std::sync::Arc::new(
        StateHandle::open(StateStore::in_dir(dir.path()))
            .await
            .unwrap(),
    );

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle
                    .mutate(|latest| {
                        let mut next = latest.clone();
                        next.images.push(record(&format!("r{i}"), None));
                        Ok::<_, StateError>(next)
                    })
                    .await
                    .unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(handle.snapshot().images.len(), 8, "no write may be lost");
    let on_disk = StateStore::in_dir(dir.path()).load().await.unwrap();
    assert_eq!(on_disk.images.len(), 8);
}
