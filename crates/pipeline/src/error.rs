use lake_athena::QueryError;
use lake_catalog::CatalogError;
use lake_core::StorageKind;
use lake_ingest::{FetchError, JsonlError, UploadError};
use lake_report::ReportError;
use lake_storage::StorageError;
use thiserror::Error;

use crate::stage::Stage;

/// Failure inside one stage, with the component error as its source.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Encode(#[from] JsonlError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("no result artifact to report on; run the query stage first")]
    NoArtifact,
}

/// A run stopped at `stage`. Rerunning from that stage resumes the pipeline.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Building the service clients failed.
#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("storage kind '{kind}' is not visible to the query engine; use LAKE_STORAGE=s3")]
    StorageNotQueryable { kind: StorageKind },

    #[error("feed client setup failed: {0}")]
    Feed(#[from] FetchError),
}
