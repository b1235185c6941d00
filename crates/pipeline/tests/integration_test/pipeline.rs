//! Full runs against a mock feed, in-memory storage and catalog, and the
//! aggregating engine.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use lake_athena::{ManualClock, QueryError, QueryStatus, ResultArtifact};
use lake_catalog::{CatalogError, InMemoryCatalog};
use lake_core::FeedConfig;
use lake_ingest::{parse_jsonl, FeedClient, FetchError};
use lake_pipeline::{Pipeline, PipelineOptions, Services, Stage, StageError};
use lake_storage::{LakeStorage, ObjectUri};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::fakes::{lake_config, AggregatingEngine};

const FEED_PATH: &str = "/v3/nba/scores/json/Players";
const SUM_SQL: &str = "SELECT Team, SUM(Points) AS Points FROM nba_players GROUP BY Team";

struct Harness {
    storage: Arc<LakeStorage>,
    catalog: Arc<InMemoryCatalog>,
    engine: Arc<AggregatingEngine>,
    clock: Arc<ManualClock>,
    services: Services,
}

impl Harness {
    fn new(server: &MockServer) -> Self {
        let storage = Arc::new(LakeStorage::memory());
        let engine = AggregatingEngine::new(storage.clone(), &lake_config());
        Self::with_engine(server, storage, engine)
    }

    fn with_engine(server: &MockServer, storage: Arc<LakeStorage>, engine: AggregatingEngine) -> Self {
        let feed = FeedClient::new(&FeedConfig {
            endpoint: format!("{}{FEED_PATH}", server.uri()),
            api_key: "test-key".into(),
            timeout_secs: 5,
        })
        .unwrap();
        let catalog = Arc::new(InMemoryCatalog::new());
        let engine = Arc::new(engine);
        let services = Services {
            feed: Arc::new(feed),
            storage: storage.clone(),
            catalog: catalog.clone(),
            engine: engine.clone(),
        };
        Self {
            storage,
            catalog,
            engine,
            clock: Arc::new(ManualClock::new()),
            services,
        }
    }

    fn pipeline(&self, options: PipelineOptions) -> Pipeline {
        Pipeline::with_clock(lake_config(), self.services.clone(), self.clock.clone()).with_options(options)
    }
}

fn sum_options() -> PipelineOptions {
    PipelineOptions {
        sql: Some(SUM_SQL.into()),
        ..PipelineOptions::default()
    }
}

async fn mount_feed(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

fn example_feed() -> serde_json::Value {
    json!([
        {"PlayerID": 1, "Team": "A", "Points": 10},
        {"PlayerID": 2, "Team": "A", "Points": 5}
    ])
}

#[tokio::test]
async fn full_run_reports_summed_points() {
    let server = MockServer::start().await;
    mount_feed(&server, 200, example_feed()).await;
    let h = Harness::new(&server);

    let summary = h.pipeline(sum_options()).run().await.unwrap();

    assert_eq!(summary.stages, Stage::ALL.to_vec());

    // Upload blob is two JSON lines in feed order.
    let raw = ObjectUri::new("lake", "raw-data/nba_player_data.jsonl");
    assert_eq!(summary.uploaded.as_ref(), Some(&raw));
    assert_eq!(summary.records, 2);
    let blob = h.storage.get(&raw).await.unwrap();
    let text = std::str::from_utf8(&blob).unwrap();
    assert_eq!(
        text,
        "{\"PlayerID\":1,\"Team\":\"A\",\"Points\":10}\n{\"PlayerID\":2,\"Team\":\"A\",\"Points\":5}\n"
    );
    assert_eq!(parse_jsonl(&blob).unwrap().len(), 2);

    // Catalog points the table at the raw prefix.
    assert!(h.catalog.has_database("glue_nba_data_lake"));
    let table = h.catalog.table("glue_nba_data_lake", "nba_players").unwrap();
    assert_eq!(table.location, "s3://lake/raw-data/");

    // One row: Team A, Points 15.
    let handle = summary.handle.as_ref().unwrap();
    assert_eq!(
        summary.artifact,
        Some(ResultArtifact::from_uri(format!("s3://lake/athena-results/{}.csv", handle.id())))
    );
    let result = summary.table.as_ref().unwrap();
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.get_value(0, "Team"), Some("A"));
    assert_eq!(result.get_value(0, "Points"), Some("15"));
    assert_eq!(summary.totals.len(), 1);
    assert_eq!(summary.totals[0].total, 15.0);

    // Settle wait, then one poll interval before SUCCEEDED.
    assert_eq!(h.clock.elapsed(), Duration::from_secs(5 + 2));
    assert_eq!(h.engine.starts.load(Ordering::SeqCst), 1);
    assert_eq!(h.engine.polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_feed_key_stops_at_ingest() {
    let server = MockServer::start().await;
    mount_feed(&server, 401, json!({"message": "invalid key"})).await;
    let h = Harness::new(&server);

    let err = h.pipeline(sum_options()).run().await.unwrap_err();

    assert_eq!(err.stage, Stage::Ingest);
    assert!(matches!(err.source, StageError::Fetch(FetchError::Unauthorized { status: 401 })));
    assert!(err.to_string().starts_with("ingest stage failed"));
    assert!(!h
        .storage
        .exists(&ObjectUri::new("lake", "raw-data/nba_player_data.jsonl"))
        .await
        .unwrap());
    assert!(!h.catalog.has_database("glue_nba_data_lake"));
    assert_eq!(h.engine.starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn allow_empty_feed_skips_the_upload() {
    let server = MockServer::start().await;
    mount_feed(&server, 503, json!({"message": "maintenance"})).await;
    let h = Harness::new(&server);
    let options = PipelineOptions {
        allow_empty_feed: true,
        ..sum_options()
    };

    let summary = h.pipeline(options).run_range(Stage::Provision, Stage::Register).await.unwrap();

    assert_eq!(summary.stages, vec![Stage::Provision, Stage::Ingest, Stage::Register]);
    assert!(summary.uploaded.is_none());
    assert!(h.catalog.table("glue_nba_data_lake", "nba_players").is_some());
    // No upload, so no settle wait.
    assert_eq!(h.clock.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn rerun_tolerates_existing_bucket_and_catalog() {
    let server = MockServer::start().await;
    mount_feed(&server, 200, example_feed()).await;
    let h = Harness::new(&server);

    h.pipeline(sum_options()).run().await.unwrap();
    let again = h.pipeline(sum_options()).run().await.unwrap();

    assert_eq!(again.stages.len(), 5);
    assert_eq!(again.totals[0].total, 15.0);
    assert_eq!(h.engine.starts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn resume_from_query_skips_the_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(example_feed()))
        .expect(1)
        .mount(&server)
        .await;
    let h = Harness::new(&server);

    h.pipeline(sum_options()).run_range(Stage::Provision, Stage::Register).await.unwrap();
    let summary = h.pipeline(sum_options()).run_from(Stage::Query).await.unwrap();

    assert_eq!(summary.stages, vec![Stage::Query, Stage::Report]);
    assert!(summary.uploaded.is_none());
    assert_eq!(summary.totals[0].key, "A");
}

#[tokio::test]
async fn failed_query_is_tagged_with_query_stage() {
    let server = MockServer::start().await;
    mount_feed(&server, 200, example_feed()).await;
    let storage = Arc::new(LakeStorage::memory());
    let engine = AggregatingEngine::new(storage.clone(), &lake_config()).failing("SYNTAX_ERROR: line 1:8");
    let h = Harness::with_engine(&server, storage, engine);

    let err = h.pipeline(sum_options()).run().await.unwrap_err();

    assert_eq!(err.stage, Stage::Query);
    match err.source {
        StageError::Query(QueryError::Execution { status, reason, .. }) => {
            assert_eq!(status, QueryStatus::Failed);
            assert_eq!(reason.as_deref(), Some("SYNTAX_ERROR: line 1:8"));
        }
        other => panic!("expected query execution error, got {other:?}"),
    }
    // Earlier stages completed and can be skipped on the next attempt.
    assert!(h.catalog.table("glue_nba_data_lake", "nba_players").is_some());
}

#[tokio::test]
async fn blank_sql_never_reaches_the_engine() {
    let server = MockServer::start().await;
    let h = Harness::new(&server);
    let options = PipelineOptions {
        sql: Some("   ".into()),
        ..PipelineOptions::default()
    };

    let err = h.pipeline(options).run_from(Stage::Query).await.unwrap_err();

    assert_eq!(err.stage, Stage::Query);
    assert!(matches!(err.source, StageError::Query(QueryError::InvalidQuery { .. })));
    assert_eq!(h.engine.starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn report_alone_needs_an_artifact() {
    let server = MockServer::start().await;
    let h = Harness::new(&server);

    let err = h.pipeline(PipelineOptions::default()).run_from(Stage::Report).await.unwrap_err();
    assert_eq!(err.stage, Stage::Report);
    assert!(matches!(err.source, StageError::NoArtifact));
}

#[tokio::test]
async fn report_alone_reads_a_given_artifact() {
    let server = MockServer::start().await;
    let h = Harness::new(&server);
    h.storage
        .put(
            "lake",
            "athena-results/old.csv",
            bytes::Bytes::from_static(b"\"Team\",\"Points\"\n\"B\",\"7\"\n\"A\",\"15\"\n"),
        )
        .await
        .unwrap();
    let options = PipelineOptions {
        artifact: Some(ResultArtifact::from_uri("s3://lake/athena-results/old.csv")),
        ..PipelineOptions::default()
    };

    let summary = h.pipeline(options).run_from(Stage::Report).await.unwrap();

    let keys: Vec<&str> = summary.totals.iter().map(|t| t.key.as_str()).collect();
    assert_eq!(keys, vec!["A", "B"]);
}

#[tokio::test]
async fn duplicate_table_is_still_an_error_for_the_registrar() {
    let registrar = lake_catalog::CatalogRegistrar::new(Arc::new(InMemoryCatalog::new()));
    let lake = lake_config();
    registrar
        .register_database(&lake_catalog::DatabaseDefinition::new(&lake.database))
        .await
        .unwrap();
    let table = lake_catalog::TableDefinition::nba_players(&lake.table, lake.table_location());
    registrar.register_table(&lake.database, &table).await.unwrap();

    let err = registrar.register_table(&lake.database, &table).await.unwrap_err();
    assert!(matches!(err, CatalogError::AlreadyExists { .. }));
}

#[tokio::test]
async fn empty_feed_keeps_the_previous_batch() {
    let full = MockServer::start().await;
    mount_feed(&full, 200, example_feed()).await;
    let h = Harness::new(&full);
    h.pipeline(sum_options()).run_range(Stage::Ingest, Stage::Ingest).await.unwrap();
    let raw = ObjectUri::new("lake", "raw-data/nba_player_data.jsonl");
    let before = h.storage.get(&raw).await.unwrap();

    let empty = MockServer::start().await;
    mount_feed(&empty, 200, json!([])).await;
    let engine = AggregatingEngine::new(h.storage.clone(), &lake_config());
    let again = Harness::with_engine(&empty, h.storage.clone(), engine);
    let summary = again.pipeline(sum_options()).run_range(Stage::Ingest, Stage::Ingest).await.unwrap();

    assert_eq!(summary.stages, vec![Stage::Ingest]);
    assert!(summary.uploaded.is_none());
    assert_eq!(summary.records, 0);
    assert_eq!(h.storage.get(&raw).await.unwrap(), before);
    assert!(!before.is_empty());
    // Nothing uploaded, so no settle wait.
    assert_eq!(again.clock.elapsed(), Duration::ZERO);
}
