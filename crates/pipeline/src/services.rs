use std::sync::Arc;

use lake_athena::{AthenaEngine, QueryEngine};
use lake_catalog::{CatalogService, GlueCatalog};
use lake_core::{Config, StorageKind};
use lake_ingest::FeedClient;
use lake_storage::{LakeStorage, S3Backend, StorageBackend};
use tracing::info;

use crate::aws::load_sdk_config;
use crate::error::ServicesError;

/// The external services a run talks to.
#[derive(Clone)]
pub struct Services {
    pub feed: Arc<FeedClient>,
    pub storage: Arc<LakeStorage>,
    pub catalog: Arc<dyn CatalogService>,
    pub engine: Arc<dyn QueryEngine>,
}

impl Services {
    /// Connect the production clients described by `config`.
    ///
    /// Glue and Athena only see S3, so any other storage kind is refused here
    /// instead of failing later at the query or report stage.
    pub async fn connect(config: &Config) -> Result<Self, ServicesError> {
        if config.lake.storage != StorageKind::S3 {
            return Err(ServicesError::StorageNotQueryable {
                kind: config.lake.storage,
            });
        }
        let sdk_config = load_sdk_config(&config.aws).await;

        let storage = LakeStorage::new(StorageBackend::S3(S3Backend::new(&config.aws, &sdk_config)));
        info!(storage = storage.backend().kind(), "storage ready");

        Ok(Self {
            feed: Arc::new(FeedClient::new(&config.feed)?),
            storage: Arc::new(storage),
            catalog: Arc::new(GlueCatalog::new(&sdk_config)),
            engine: Arc::new(AthenaEngine::new(&sdk_config, config.lake.workgroup.clone())),
        })
    }
}
