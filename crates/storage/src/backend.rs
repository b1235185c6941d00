use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use tracing::info;

use lake_core::config::AwsConfig;

use crate::error::StorageError;

/// Unified storage backend wrapping object_store, one store per bucket.
pub enum StorageBackend {
    S3(S3Backend),
    Local(LocalBackend),
    Memory(MemoryBackend),
}

impl StorageBackend {
    /// Get (or lazily build) the ObjectStore serving `bucket`.
    pub fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        match self {
            StorageBackend::S3(b) => b.store_for(bucket),
            StorageBackend::Local(b) => b.store_for(bucket),
            StorageBackend::Memory(b) => Ok(b.store_for(bucket)),
        }
    }

    /// Create a bucket. An existing bucket is reported as [`StorageError::BucketExists`].
    pub async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        match self {
            StorageBackend::S3(b) => b.create_bucket(bucket).await,
            StorageBackend::Local(b) => b.create_bucket(bucket),
            StorageBackend::Memory(b) => b.create_bucket(bucket),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StorageBackend::S3(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::S3(_) => "s3",
            StorageBackend::Local(_) => "local",
            StorageBackend::Memory(_) => "memory",
        }
    }
}

// ── S3 ────────────────────────────────────────────────────────

/// S3 backend: object_store for reads/writes, the S3 SDK for bucket creation.
pub struct S3Backend {
    aws: AwsConfig,
    client: aws_sdk_s3::Client,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl S3Backend {
    pub fn new(aws: &AwsConfig, sdk_config: &aws_types::SdkConfig) -> Self {
        info!(region = %aws.region, "Storage: S3 backend");
        Self {
            aws: aws.clone(),
            client: aws_sdk_s3::Client::new(sdk_config),
            stores: Mutex::new(HashMap::new()),
        }
    }

    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let mut stores = self.stores.lock().unwrap();
        if let Some(store) = stores.get(bucket) {
            return Ok(store.clone());
        }
        let store: Arc<dyn ObjectStore> = Arc::new(self.build_store(bucket)?);
        stores.insert(bucket.to_string(), store.clone());
        Ok(store)
    }

    fn build_store(&self, bucket: &str) -> Result<object_store::aws::AmazonS3, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(&self.aws.region)
            .with_bucket_name(bucket);

        if let Some(ref key) = self.aws.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(ref secret) = self.aws.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(ref token) = self.aws.session_token {
            builder = builder.with_token(token);
        }

        if let Some(ref endpoint) = self.aws.endpoint_url {
            // object_store requires absolute URLs
            let endpoint_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
                endpoint.clone()
            } else {
                format!("https://{}", endpoint)
            };
            builder = builder
                .with_endpoint(&endpoint_url)
                .with_allow_http(endpoint_url.starts_with("http://"));
        }

        Ok(builder.build()?)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut request = self.client.create_bucket().bucket(bucket);

        // us-east-1 rejects an explicit location constraint.
        if self.aws.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.aws.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                info!(bucket = %bucket, region = %self.aws.region, "S3 bucket created");
                Ok(())
            }
            Err(e) => {
                let err = e.into_service_error();
                if err.is_bucket_already_owned_by_you() {
                    return Err(StorageError::BucketExists {
                        bucket: bucket.to_string(),
                    });
                }
                Err(StorageError::Provider {
                    operation: "create_bucket",
                    source: Box::new(err),
                })
            }
        }
    }
}

// ── Local filesystem ──────────────────────────────────────────

/// Local filesystem backend: each bucket is a directory under `root`.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        info!("Storage: local backend at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_for(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let dir = self.root.join(bucket);
        std::fs::create_dir_all(&dir)?;
        Ok(Arc::new(LocalFileSystem::new_with_prefix(&dir)?))
    }

    fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let dir = self.root.join(bucket);
        if dir.is_dir() {
            return Err(StorageError::BucketExists {
                bucket: bucket.to_string(),
            });
        }
        std::fs::create_dir_all(&dir)?;
        info!(bucket = %bucket, path = %dir.display(), "local bucket created");
        Ok(())
    }
}

// ── In-memory ─────────────────────────────────────────────────

/// In-process backend; buckets are created on first use.
#[derive(Default)]
pub struct MemoryBackend {
    stores: Mutex<HashMap<String, Arc<InMemory>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_for(&self, bucket: &str) -> Arc<dyn ObjectStore> {
        let mut stores = self.stores.lock().unwrap();
        stores
            .entry(bucket.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()))
            .clone()
    }

    fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut stores = self.stores.lock().unwrap();
        if stores.contains_key(bucket) {
            return Err(StorageError::BucketExists {
                bucket: bucket.to_string(),
            });
        }
        stores.insert(bucket.to_string(), Arc::new(InMemory::new()));
        Ok(())
    }
}
