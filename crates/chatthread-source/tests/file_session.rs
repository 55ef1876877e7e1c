/// Scrape a comment export that the page writes only after a delay, then
/// persist and reload the store the way the CLI does.

use std::time::Duration;

use chatthread_source::FileSource;
use chatthread_store::{MessageStore, RetryPolicy, SnapshotInput, StoreError};

const EXPORT: &str = r#"[
    {"author": "bo", "isAdmin": false, "message": "@lead_ren thanks!", "timestamp": "var timestamp = \"2024-06-10T08:10:00Z\";"},
    {"author": "lead_ren", "isAdmin": true, "message": "Batch 4 is live.", "timestamp": "var timestamp = \"2024-06-10T08:00:00.25Z\";"}
]"#;

fn quick_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 10,
        base_delay: Duration::from_millis(20),
        final_delay: Duration::from_millis(200),
    }
}

#[tokio::test]
async fn export_written_late_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comment-list.json");

    let writer_path = path.clone();
    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let staging = writer_path.with_extension("partial");
        tokio::fs::write(&staging, EXPORT).await.unwrap();
        tokio::fs::rename(&staging, &writer_path).await.unwrap();
    });

    let source = FileSource::new(&path);
    let mut store = MessageStore::new().with_retry_policy(quick_policy());
    let created = store.ingest_from_page(&source).await.unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].author, "lead_ren");
    assert!(created[0].is_admin);
    assert_eq!(created[0].replies, [1]);
    writer.await.unwrap();
}

#[tokio::test]
async fn export_that_never_appears_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileSource::new(dir.path().join("never.json"));
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        final_delay: Duration::from_millis(5),
    };

    let err = MessageStore::new()
        .with_retry_policy(policy)
        .ingest_from_page(&source)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::SourceUnavailable { attempts: 4 }));
}

#[tokio::test]
async fn snapshot_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let export = dir.path().join("comment-list.json");
    let snapshot_path = dir.path().join("snapshot.json");
    tokio::fs::write(&export, EXPORT).await.unwrap();
    let source = FileSource::new(&export);

    let first = MessageStore::new().restore(SnapshotInput::None, &source).await.unwrap();
    tokio::fs::write(&snapshot_path, first.to_json_pretty().unwrap()).await.unwrap();

    // The export is gone; the second session must come from the snapshot.
    tokio::fs::remove_file(&export).await.unwrap();
    let saved = tokio::fs::read_to_string(&snapshot_path).await.unwrap();
    let second = MessageStore::new()
        .with_retry_policy(quick_policy())
        .restore(SnapshotInput::Text(saved), &source)
        .await
        .unwrap();

    assert_eq!(second.messages(), first.messages());
    assert_eq!(second.messages_by_admins("lead_ren").len(), 1);
}
