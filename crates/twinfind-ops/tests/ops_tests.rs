use std::fs;
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use twinfind_analyze::{DetectionMethod, KeepPolicy, MethodSelection, ScanContext, select_keepers};
use twinfind_core::{DetectionConfig, FileRecord};
use twinfind_ops::{
    DeletionResult, Dispatcher, DryRunProvider, FileListing, JsonListing, deletion_targets,
    start_deletion,
};

const LISTING: &str = r#"[
    {"id":"1","name":"a.jpg","size":1000,"lastModified":"2024-01-01T00:00:00Z"},
    {"id":"2","name":"a.jpg","size":1000,"lastModified":"2024-03-01T00:00:00Z"},
    {"id":"3","name":"b.jpg","size":1000,"lastModified":"2024-02-01T00:00:00Z"},
    {"id":"4","name":"albums","size":0,"lastModified":"2024-02-01T00:00:00Z","isContainer":true}
]"#;

async fn load(temp: &TempDir) -> Vec<FileRecord> {
    fs::write(temp.path().join("records.json"), LISTING).unwrap();
    JsonListing::new(temp.path())
        .list("records.json")
        .await
        .unwrap()
}

#[tokio::test]
async fn test_listing_to_deletion() {
    let temp = TempDir::new().unwrap();
    let records = load(&temp).await;

    let groups = Dispatcher::default()
        .detect(
            records,
            MethodSelection::from_names(&["exact", "size"]),
            ScanContext::new(),
        )
        .await
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].method, DetectionMethod::Exact);
    assert_eq!(groups[1].count(), 3);

    let plan = select_keepers(&groups, KeepPolicy::Newest);
    let targets = deletion_targets(&plan);
    let ids: Vec<_> = targets.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    let mut rx = start_deletion(Arc::new(DryRunProvider), targets);
    let mut freed = None;
    while let Some(result) = rx.recv().await {
        if let DeletionResult::Complete(complete) = result {
            freed = Some(complete.bytes_freed);
        }
    }
    assert_eq!(freed, Some(2000));
}

#[tokio::test]
async fn test_worker_path_matches_inline_path() {
    let temp = TempDir::new().unwrap();
    let records = load(&temp).await;
    let methods = MethodSelection::from_names(&["exact", "similar", "size", "hash"]);

    let worker_config = DetectionConfig::builder()
        .worker_threshold(1usize)
        .build()
        .unwrap();

    let inline = Dispatcher::new(worker_config.clone())
        .inline_only()
        .detect(records.clone(), methods.clone(), ScanContext::new())
        .await
        .unwrap();
    let worker = Dispatcher::new(worker_config)
        .detect(records, methods, ScanContext::new())
        .await
        .unwrap();

    assert_eq!(inline, worker);
}

#[tokio::test]
async fn test_cancelled_worker_scan_is_empty() {
    let temp = TempDir::new().unwrap();
    let records = load(&temp).await;
    let config = DetectionConfig::builder()
        .worker_threshold(1usize)
        .build()
        .unwrap();

    let ctx = ScanContext::new();
    ctx.cancel();
    let groups = Dispatcher::new(config)
        .detect(records, MethodSelection::default(), ctx)
        .await
        .unwrap();

    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_cancel_forwarded_to_running_worker() {
    let records: Vec<FileRecord> = (0..5_000u64)
        .map(|i| {
            FileRecord::file(
                i,
                format!("scan-{i:06}.dat"),
                100,
                DateTime::from_timestamp(0, 0).unwrap(),
            )
        })
        .collect();
    let config = DetectionConfig::builder()
        .worker_threshold(1usize)
        .build()
        .unwrap();

    let messages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&messages);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let ctx = ScanContext::new()
        .with_cancel(cancel)
        .with_callback(move |event| {
            seen.lock().unwrap().push(event.message);
            trigger.cancel();
        });

    let groups = Dispatcher::new(config)
        .detect(records, MethodSelection::from_names(&["similar"]), ctx)
        .await
        .unwrap();

    assert!(groups.is_empty());
    // 5,000 records in chunks of 100: the worker stops well before the last.
    let messages = messages.lock().unwrap();
    assert!(!messages.is_empty());
    assert!(!messages.iter().any(|m| m.contains("chunk 50/50")));
}
