pub mod backend;
pub mod error;
pub mod uri;

use std::path::Path;

use bytes::Bytes;
use object_store::path::Path as StorePath;
use tracing::{debug, info};

pub use backend::{LocalBackend, MemoryBackend, S3Backend, StorageBackend};
pub use error::{BoxError, StorageError};
pub use uri::ObjectUri;

/// Storage service used by every stage: put/get whole objects by bucket and key.
pub struct LakeStorage {
    backend: StorageBackend,
}

impl LakeStorage {
    pub fn new(backend: StorageBackend) -> Self {
        Self { backend }
    }

    /// In-process storage, used for local runs and tests.
    pub fn memory() -> Self {
        Self::new(StorageBackend::Memory(MemoryBackend::new()))
    }

    pub fn local(root: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(StorageBackend::Local(LocalBackend::new(root)?)))
    }

    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    /// Write `bytes` to `bucket/key` in a single attempt.
    pub async fn put(&self, bucket: &str, key: &str, bytes: Bytes) -> Result<ObjectUri, StorageError> {
        let uri = ObjectUri::new(bucket, key);
        let store = self.backend.store_for(uri.bucket())?;
        let size = bytes.len();
        store.put(&StorePath::from(uri.key()), bytes.into()).await?;
        info!(uri = %uri, bytes = size, "object written");
        Ok(uri)
    }

    /// Read a whole object.
    pub async fn get(&self, uri: &ObjectUri) -> Result<Bytes, StorageError> {
        let store = self.backend.store_for(uri.bucket())?;
        let result = store.get(&StorePath::from(uri.key())).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => StorageError::NotFound { uri: uri.to_string() },
            other => StorageError::ObjectStore(other),
        })?;
        let bytes = result.bytes().await?;
        debug!(uri = %uri, bytes = bytes.len(), "object read");
        Ok(bytes)
    }

    pub async fn exists(&self, uri: &ObjectUri) -> Result<bool, StorageError> {
        let store = self.backend.store_for(uri.bucket())?;
        match store.head(&StorePath::from(uri.key())).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.backend.create_bucket(bucket).await
    }
}
