//! Stage-by-stage orchestration of a lake run.
//!
//! Provision → Ingest → Register → Query → Report. Each stage logs its own
//! outcome and a failure is tagged with its [`Stage`], so a later run can
//! start from the stage that broke instead of from the beginning.

use std::sync::Arc;

use lake_athena::{AthenaConfig, Clock, QueryExecutor, QueryHandle, ResultArtifact, TokioClock};
use lake_catalog::{CatalogRegistrar, DatabaseDefinition, TableDefinition};
use lake_core::LakeConfig;
use lake_ingest::{serialize_records, FeedClient, Uploader};
use lake_report::{group_totals, load_artifact, GroupTotal, ResultTable};
use lake_storage::{LakeStorage, ObjectUri, StorageError};
use tracing::{error, info, warn};

use crate::error::{PipelineError, StageError};
use crate::services::Services;
use crate::stage::Stage;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Query to run; defaults to selecting team and points from the table.
    pub sql: Option<String>,
    /// Keep going without an upload when the feed fails.
    pub allow_empty_feed: bool,
    /// Artifact of an earlier query, for runs that start at the report stage.
    pub artifact: Option<ResultArtifact>,
    /// Column to group by in the report.
    pub report_key: String,
    /// Numeric column summed per group.
    pub report_value: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            sql: None,
            allow_empty_feed: false,
            artifact: None,
            report_key: "Team".into(),
            report_value: "Points".into(),
        }
    }
}

impl PipelineOptions {
    /// Chart heading for the configured report columns.
    pub fn report_title(&self) -> String {
        report_title(&self.report_key, &self.report_value)
    }
}

/// `Total {value} by {key}`.
pub fn report_title(key: &str, value: &str) -> String {
    format!("Total {value} by {key}")
}

/// What a run produced, stage by stage.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub stages: Vec<Stage>,
    pub uploaded: Option<ObjectUri>,
    pub records: usize,
    pub handle: Option<QueryHandle>,
    pub artifact: Option<ResultArtifact>,
    pub table: Option<ResultTable>,
    pub totals: Vec<GroupTotal>,
}

pub struct Pipeline {
    lake: LakeConfig,
    feed: Arc<FeedClient>,
    storage: Arc<LakeStorage>,
    registrar: CatalogRegistrar,
    executor: QueryExecutor,
    clock: Arc<dyn Clock>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(lake: LakeConfig, services: Services) -> Self {
        Self::with_clock(lake, services, Arc::new(TokioClock))
    }

    /// `clock` paces both the settle wait and query polling.
    pub fn with_clock(lake: LakeConfig, services: Services, clock: Arc<dyn Clock>) -> Self {
        Self {
            lake,
            feed: services.feed,
            storage: services.storage,
            registrar: CatalogRegistrar::new(services.catalog),
            executor: QueryExecutor::with_clock(services.engine, clock.clone()),
            clock,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    pub fn storage(&self) -> &Arc<LakeStorage> {
        &self.storage
    }

    pub fn default_sql(&self) -> String {
        format!("SELECT Team, Points FROM {}", self.lake.table)
    }

    /// Run every stage.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        self.run_from(Stage::Provision).await
    }

    /// Run `from` and every later stage.
    pub async fn run_from(&self, from: Stage) -> Result<RunSummary, PipelineError> {
        self.run_range(from, Stage::Report).await
    }

    /// Run the stages from `from` through `to`, stopping at the first failure.
    pub async fn run_range(&self, from: Stage, to: Stage) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary {
            artifact: self.options.artifact.clone(),
            ..RunSummary::default()
        };

        for stage in Stage::range(from, to) {
            info!(stage = %stage, "stage starting");
            let outcome = match stage {
                Stage::Provision => self.provision().await,
                Stage::Ingest => self.ingest(&mut summary).await,
                Stage::Register => self.register().await,
                Stage::Query => self.query(&mut summary).await,
                Stage::Report => self.report(&mut summary).await,
            };
            if let Err(source) = outcome {
                error!(stage = %stage, error = %source, "stage failed");
                return Err(PipelineError::new(stage, source));
            }
            info!(stage = %stage, "stage complete");
            summary.stages.push(stage);
        }

        Ok(summary)
    }

    async fn provision(&self) -> Result<(), StageError> {
        match self.storage.create_bucket(&self.lake.bucket).await {
            Ok(()) => Ok(()),
            Err(StorageError::BucketExists { bucket }) => {
                warn!(bucket = %bucket, "bucket already exists, reusing it");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ingest(&self, summary: &mut RunSummary) -> Result<(), StageError> {
        let records = match self.feed.fetch().await {
            Ok(records) => records,
            Err(e) if self.options.allow_empty_feed => {
                warn!(error = %e, "feed fetch failed, skipping upload");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if records.is_empty() {
            // Keep the previous batch rather than overwrite it with nothing.
            warn!(endpoint = %self.feed.endpoint(), "feed returned no records, skipping upload");
            return Ok(());
        }

        let blob = serialize_records(&records)?;
        let uploader = Uploader::new(self.storage.clone(), self.lake.bucket.clone());
        let uri = uploader.upload(blob, &self.lake.raw_key()).await?;
        summary.records = records.len();
        summary.uploaded = Some(uri);

        // Uploads are not instantly visible to the query engine.
        let settle = self.lake.settle();
        if !settle.is_zero() {
            info!(settle_secs = settle.as_secs(), "waiting for the upload to settle");
            self.clock.sleep(settle).await;
        }
        Ok(())
    }

    async fn register(&self) -> Result<(), StageError> {
        let database = DatabaseDefinition::new(&self.lake.database).with_description("NBA player statistics");
        if let Err(e) = self.registrar.register_database(&database).await {
            if !e.is_already_exists() {
                return Err(e.into());
            }
            warn!(database = %database.name, "database already registered, continuing");
        }

        let table = TableDefinition::nba_players(&self.lake.table, self.lake.table_location());
        if let Err(e) = self.registrar.register_table(&self.lake.database, &table).await {
            if !e.is_already_exists() {
                return Err(e.into());
            }
            warn!(table = %table.name, "table already registered, continuing");
        }
        Ok(())
    }

    async fn query(&self, summary: &mut RunSummary) -> Result<(), StageError> {
        let athena = AthenaConfig::from_lake(&self.lake);
        let sql = self.options.sql.clone().unwrap_or_else(|| self.default_sql());
        let request = athena.request(&sql)?;

        let handle = self.executor.submit(&request).await?;
        summary.handle = Some(handle.clone());
        let artifact = self.executor.await_completion(&handle, &athena.wait_options()).await?;
        summary.artifact = Some(artifact);
        Ok(())
    }

    async fn report(&self, summary: &mut RunSummary) -> Result<(), StageError> {
        let artifact = summary.artifact.as_ref().ok_or(StageError::NoArtifact)?;
        let table = load_artifact(&self.storage, artifact).await?;
        let totals = group_totals(&table, &self.options.report_key, &self.options.report_value)?;
        info!(
            artifact = %artifact,
            rows = table.row_count(),
            groups = totals.len(),
            "report ready"
        );
        summary.table = Some(table);
        summary.totals = totals;
        Ok(())
    }
}
