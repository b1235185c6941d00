//! Uploading serialized batches into storage.

use std::sync::Arc;

use bytes::Bytes;
use lake_core::PlayerRecord;
use lake_ingest::{parse_jsonl, serialize_records, Uploader};
use lake_storage::{LakeStorage, StorageError};

#[tokio::test]
async fn uploaded_blob_reads_back_as_records() {
    let storage = Arc::new(LakeStorage::memory());
    let uploader = Uploader::new(storage.clone(), "lake");
    let records = vec![
        PlayerRecord::new(1).with_team("A").with_points(10.0),
        PlayerRecord::new(2).with_team("A").with_points(5.0),
    ];

    let uri = uploader
        .upload(serialize_records(&records).unwrap(), "raw-data/nba_player_data.jsonl")
        .await
        .unwrap();

    assert_eq!(uri.to_string(), "s3://lake/raw-data/nba_player_data.jsonl");
    let blob = storage.get(&uri).await.unwrap();
    assert_eq!(parse_jsonl(&blob).unwrap(), records);
}

#[tokio::test]
async fn empty_batch_uploads_empty_object() {
    let storage = Arc::new(LakeStorage::memory());
    let uploader = Uploader::new(storage.clone(), "lake");

    let uri = uploader.upload(serialize_records(&[]).unwrap(), "raw-data/empty.jsonl").await.unwrap();
    assert!(storage.get(&uri).await.unwrap().is_empty());
}

#[tokio::test]
async fn failure_names_the_destination_key() {
    let tmp = tempfile::tempdir().unwrap();
    // A regular file where the bucket directory should be.
    std::fs::write(tmp.path().join("lake"), b"").unwrap();
    let storage = Arc::new(LakeStorage::local(tmp.path()).unwrap());
    let uploader = Uploader::new(storage, "lake");

    let err = uploader
        .upload(Bytes::from_static(b"{}\n"), "raw-data/nba_player_data.jsonl")
        .await
        .unwrap_err();

    assert_eq!(err.key, "raw-data/nba_player_data.jsonl");
    assert!(err.to_string().starts_with("upload to raw-data/nba_player_data.jsonl failed"));
    assert!(matches!(err.source, StorageError::Io(_)));
}
