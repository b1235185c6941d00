//! AWS Athena implementation of [`QueryEngine`].
//!
//! Thin mapping over `StartQueryExecution`, `GetQueryExecution` and
//! `StopQueryExecution`. Polling and timeouts live in [`crate::poller`].

use async_trait::async_trait;
use aws_sdk_athena::types::{QueryExecution, QueryExecutionContext, QueryExecutionState, ResultConfiguration};
use tracing::{debug, info, warn};

use crate::engine::QueryEngine;
use crate::error::QueryError;
use crate::query::{QueryHandle, QueryRequest, QueryStatistics, QueryStatus, StatusReport};

pub struct AthenaEngine {
    client: aws_sdk_athena::Client,
    workgroup: String,
}

impl AthenaEngine {
    pub fn new(sdk_config: &aws_types::SdkConfig, workgroup: impl Into<String>) -> Self {
        let workgroup = workgroup.into();
        info!(
            region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("(default)"),
            workgroup = %workgroup,
            "AthenaEngine initialised"
        );
        Self {
            client: aws_sdk_athena::Client::new(sdk_config),
            workgroup,
        }
    }

    fn map_state(query_id: &str, state: Option<&QueryExecutionState>) -> QueryStatus {
        match state {
            None | Some(QueryExecutionState::Queued) => QueryStatus::Submitted,
            Some(QueryExecutionState::Running) => QueryStatus::Running,
            Some(QueryExecutionState::Succeeded) => QueryStatus::Succeeded,
            Some(QueryExecutionState::Failed) => QueryStatus::Failed,
            Some(QueryExecutionState::Cancelled) => QueryStatus::Cancelled,
            Some(other) => {
                warn!(query_id = %query_id, state = ?other, "Unknown Athena state, treating as running");
                QueryStatus::Running
            }
        }
    }

    fn status_report(query_id: &str, qe: &QueryExecution) -> StatusReport {
        let status = qe.status();
        let stats = qe.statistics();

        StatusReport {
            status: Self::map_state(query_id, status.and_then(|s| s.state())),
            reason: status
                .and_then(|s| s.state_change_reason())
                .map(|s| s.to_string()),
            statistics: QueryStatistics {
                bytes_scanned: stats
                    .and_then(|s| s.data_scanned_in_bytes())
                    .unwrap_or(0)
                    .max(0) as u64,
                engine_time_ms: stats
                    .and_then(|s| s.engine_execution_time_in_millis())
                    .unwrap_or(0)
                    .max(0) as u64,
            },
        }
    }
}

#[async_trait]
impl QueryEngine for AthenaEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle, QueryError> {
        let resp = self
            .client
            .start_query_execution()
            .query_string(request.sql())
            .query_execution_context(QueryExecutionContext::builder().database(request.database()).build())
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(request.output_location())
                    .build(),
            )
            .work_group(&self.workgroup)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_invalid_request_exception() {
                    QueryError::InvalidQuery {
                        reason: err.meta().message().unwrap_or("rejected by Athena").to_string(),
                    }
                } else {
                    QueryError::Engine {
                        operation: "start_query",
                        source: Box::new(err),
                    }
                }
            })?;

        let query_id = resp.query_execution_id().ok_or_else(|| QueryError::Engine {
            operation: "start_query",
            source: "no query execution ID returned".into(),
        })?;

        Ok(QueryHandle::new(query_id, request.output_location()))
    }

    async fn get_status(&self, handle: &QueryHandle) -> Result<StatusReport, QueryError> {
        let resp = self
            .client
            .get_query_execution()
            .query_execution_id(handle.id())
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                // Athena answers InvalidRequest for ids it has no record of.
                if err.is_invalid_request_exception() {
                    QueryError::UnknownHandle {
                        handle: handle.id().to_string(),
                    }
                } else {
                    QueryError::Engine {
                        operation: "get_status",
                        source: Box::new(err),
                    }
                }
            })?;

        let qe = resp.query_execution().ok_or_else(|| QueryError::Engine {
            operation: "get_status",
            source: "no query execution in response".into(),
        })?;

        let report = Self::status_report(handle.id(), qe);
        debug!(query_id = %handle, state = %report.status, "Athena status");
        Ok(report)
    }

    async fn stop_query(&self, handle: &QueryHandle) -> Result<(), QueryError> {
        self.client
            .stop_query_execution()
            .query_execution_id(handle.id())
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_invalid_request_exception() {
                    QueryError::UnknownHandle {
                        handle: handle.id().to_string(),
                    }
                } else {
                    QueryError::Engine {
                        operation: "stop_query",
                        source: Box::new(err),
                    }
                }
            })?;
        Ok(())
    }

    fn name(&self) -> &str {
        "athena"
    }
}

// ---------------------------------------------------------------------------
// Tests: state mapping only, no AWS calls
// ---------------------------------------------------------------------------
