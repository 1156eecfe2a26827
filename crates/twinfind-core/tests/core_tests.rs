use std::sync::Arc;

use chrono::DateTime;
use twinfind_core::{
    DetectionConfig, DetectionMethod, DuplicateGroup, FileRecord, ProgressEvent, RecordId,
};

fn record(id: u64, name: &str, size: u64) -> FileRecord {
    FileRecord::file(id, name, size, DateTime::from_timestamp(1_700_000_000, 0).unwrap())
}

#[test]
fn test_record_id_operations() {
    let id1 = RecordId::new("abc");
    let id2 = RecordId::from("abc");

    assert_eq!(id1, id2);
    assert_eq!(id1.as_str(), "abc");
    assert_ne!(id1, RecordId::from(1u64));
}

#[test]
fn test_record_serialization_round_trip() {
    let original = record(1, "photo.jpg", 2048).with_hash("deadbeef");
    let json = serde_json::to_string(&original).unwrap();

    assert!(json.contains("\"lastModified\""));
    assert!(json.contains("\"contentHash\":\"deadbeef\""));

    let parsed: FileRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_hashless_record_omits_hash_field() {
    let json = serde_json::to_string(&record(1, "a.txt", 1)).unwrap();
    assert!(!json.contains("contentHash"));
}

#[test]
fn test_group_shares_records() {
    let a = Arc::new(record(1, "a.jpg", 1000));
    let b = Arc::new(record(2, "a.jpg", 1000));

    let group = DuplicateGroup::new(DetectionMethod::Exact, vec![a.clone(), b.clone()]);

    assert!(Arc::ptr_eq(&group.members[0], &a));
    assert_eq!(group.total_size, 2000);
    assert_eq!(group.ids(), vec![RecordId::from(1u64), RecordId::from(2u64)]);
}

#[test]
fn test_group_with_container_is_invalid() {
    let file = Arc::new(record(1, "docs", 0));
    let dir = Arc::new(FileRecord::container(
        2u64,
        "docs",
        DateTime::from_timestamp(0, 0).unwrap(),
    ));

    let group = DuplicateGroup::new(DetectionMethod::Exact, vec![file, dir]);
    assert!(!group.is_valid());
}

#[test]
fn test_group_method_serializes_lowercase() {
    let group = DuplicateGroup::new(
        DetectionMethod::Similar,
        vec![Arc::new(record(1, "a", 1)), Arc::new(record(2, "a", 1))],
    );
    let json = serde_json::to_value(&group).unwrap();

    assert_eq!(json["method"], "similar");
    assert_eq!(json["totalSize"], 2);
}

#[test]
fn test_default_methods() {
    assert_eq!(
        DetectionMethod::DEFAULTS,
        [
            DetectionMethod::Exact,
            DetectionMethod::Similar,
            DetectionMethod::Size
        ]
    );
}

#[test]
fn test_config_from_partial_toml_like_json() {
    let config: DetectionConfig = serde_json::from_str(r#"{"chunk_size": 25}"#).unwrap();
    assert_eq!(config.chunk_size, 25);
    assert_eq!(config.similarity_threshold, 0.8);
}

#[test]
fn test_progress_event() {
    let event = ProgressEvent::new(3, 6, "Similar names: chunk 3/6");
    assert_eq!(event.percentage(), 50.0);
    assert!(event.message.contains("chunk"));
}
