mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use lake_athena::{AthenaConfig, QueryHandle, ResultArtifact};
use lake_core::config::load_dotenv;
use lake_core::Config;
use lake_pipeline::{report_title, Pipeline, PipelineError, PipelineOptions, RunSummary, Services, Stage};
use lake_report::{group_totals, load_artifact, render_bar_chart, GroupTotal, ResultTable};
use serde_json::json;
use tracing::{info, warn};

use crate::cli::{CliArgs, Command};

const CHART_WIDTH: usize = 50;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    load_dotenv();
    let config = Config::from_env().context("invalid configuration")?;
    config.log_summary();

    let services = Services::connect(&config).await.context("failed to connect services")?;
    let athena = AthenaConfig::from_lake(&config.lake);

    match args.command {
        Command::Run { from, sql, allow_empty_feed, artifact } => {
            let options = PipelineOptions {
                sql,
                allow_empty_feed,
                artifact: artifact.map(ResultArtifact::from_uri),
                ..PipelineOptions::default()
            };
            let pipeline = Pipeline::new(config.lake.clone(), services).with_options(options);
            let summary = interruptible(pipeline.run_from(from)).await?;
            print_summary(&pipeline, &summary);
        }
        Command::Setup { allow_empty_feed } => {
            let options = PipelineOptions {
                allow_empty_feed,
                ..PipelineOptions::default()
            };
            let pipeline = Pipeline::new(config.lake.clone(), services).with_options(options);
            let summary = interruptible(pipeline.run_range(Stage::Provision, Stage::Register)).await?;
            print_summary(&pipeline, &summary);
        }
        Command::Ingest => {
            let pipeline = Pipeline::new(config.lake.clone(), services);
            let summary = interruptible(pipeline.run_range(Stage::Ingest, Stage::Ingest)).await?;
            print_summary(&pipeline, &summary);
        }
        Command::Register => {
            let pipeline = Pipeline::new(config.lake.clone(), services);
            let summary = interruptible(pipeline.run_range(Stage::Register, Stage::Register)).await?;
            print_summary(&pipeline, &summary);
        }
        Command::Query { sql, no_wait } => {
            let pipeline = Pipeline::new(config.lake.clone(), services);
            let executor = pipeline.executor();
            let request = athena.request(&sql)?;
            let handle = executor.submit(&request).await?;
            println!("query id: {}", handle.id());
            if !no_wait {
                wait_for(&pipeline, &handle, &athena).await?;
            }
        }
        Command::Status { query_id, output_location } => {
            let pipeline = Pipeline::new(config.lake.clone(), services);
            let handle = resume_handle(&query_id, output_location.as_deref(), &athena);
            let report = pipeline.executor().poll_report(&handle).await?;
            println!("{}: {}", handle.id(), report.status);
            if let Some(reason) = &report.reason {
                println!("reason: {reason}");
            }
            println!(
                "scanned: {} bytes, engine time: {}ms",
                report.statistics.bytes_scanned, report.statistics.engine_time_ms
            );
        }
        Command::Wait { query_id, output_location } => {
            let pipeline = Pipeline::new(config.lake.clone(), services);
            let handle = resume_handle(&query_id, output_location.as_deref(), &athena);
            wait_for(&pipeline, &handle, &athena).await?;
        }
        Command::Cancel { query_id } => {
            let pipeline = Pipeline::new(config.lake.clone(), services);
            let handle = resume_handle(&query_id, None, &athena);
            pipeline.executor().cancel(&handle).await?;
            println!("cancellation requested for {}", handle.id());
        }
        Command::Report { artifact, key, value, json } => {
            let storage = services.storage.clone();
            let artifact = ResultArtifact::from_uri(artifact);
            let table = load_artifact(&storage, &artifact).await?;
            let totals = group_totals(&table, &key, &value)?;
            if json {
                print_json(&table, &totals)?;
            } else {
                println!("{table}\n");
                print!("{}", render_bar_chart(&report_title(&key, &value), &totals, CHART_WIDTH));
            }
        }
    }

    Ok(())
}

fn resume_handle(query_id: &str, output_location: Option<&str>, athena: &AthenaConfig) -> QueryHandle {
    QueryHandle::new(query_id, output_location.unwrap_or(&athena.output_location))
}

/// Wait for `handle`; Ctrl-C stops waiting but leaves the query running.
async fn wait_for(pipeline: &Pipeline, handle: &QueryHandle, athena: &AthenaConfig) -> Result<()> {
    let options = athena.wait_options();
    let wait = pipeline.executor().await_completion(handle, &options);
    tokio::select! {
        result = wait => {
            let artifact = result?;
            println!("result: {artifact}");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!(query_id = %handle, "interrupted; the query keeps running remotely");
            println!("stopped waiting; resume with `nba-lake wait --query-id {}`", handle.id());
        }
    }
    Ok(())
}

/// Run a pipeline future until it finishes or Ctrl-C arrives.
async fn interruptible(
    run: impl std::future::Future<Output = Result<RunSummary, PipelineError>>,
) -> Result<RunSummary> {
    tokio::select! {
        result = run => result.map_err(|e| {
            let stage = e.stage;
            anyhow::Error::new(e).context(format!("pipeline stopped; resume with `nba-lake run --from {stage}`"))
        }),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; any submitted query keeps running remotely");
            anyhow::bail!("interrupted")
        }
    }
}

fn print_summary(pipeline: &Pipeline, summary: &RunSummary) {
    let stages: Vec<&str> = summary.stages.iter().map(|s| s.as_str()).collect();
    info!(stages = %stages.join(","), "run finished");

    if let Some(uri) = &summary.uploaded {
        println!("uploaded {} records to {uri}", summary.records);
    }
    if let Some(handle) = &summary.handle {
        println!("query id: {}", handle.id());
    }
    if let Some(artifact) = &summary.artifact {
        println!("result: {artifact}");
    }
    if let Some(table) = &summary.table {
        println!("\n{table}\n");
        print!("{}", render_bar_chart(&pipeline.options().report_title(), &summary.totals, CHART_WIDTH));
    }
}

fn print_json(table: &ResultTable, totals: &[GroupTotal]) -> Result<()> {
    let doc = json!({
        "columns": table.columns,
        "rows": table.to_json_rows(),
        "totals": totals,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
