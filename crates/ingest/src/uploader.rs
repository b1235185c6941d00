use std::sync::Arc;

use bytes::Bytes;
use lake_storage::{LakeStorage, ObjectUri};
use tracing::{error, info};

use crate::error::UploadError;

/// Writes ingestion blobs into one bucket.
pub struct Uploader {
    storage: Arc<LakeStorage>,
    bucket: String,
}

impl Uploader {
    pub fn new(storage: Arc<LakeStorage>, bucket: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Single attempt, no retry.
    pub async fn upload(&self, blob: Bytes, key: &str) -> Result<ObjectUri, UploadError> {
        let size = blob.len();
        match self.storage.put(&self.bucket, key, blob).await {
            Ok(uri) => {
                info!(uri = %uri, bytes = size, "blob uploaded");
                Ok(uri)
            }
            Err(source) => {
                error!(bucket = %self.bucket, key, error = %source, "upload failed");
                Err(UploadError {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }
}
