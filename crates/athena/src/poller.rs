//! Query submission and completion polling.
//!
//! [`QueryExecutor`] submits a [`QueryRequest`] once, then observes the
//! engine-owned status until it is terminal. Only the status read is ever
//! repeated; a failed submission is returned to the caller as-is.
//!
//! The wait in [`QueryExecutor::await_completion`] is cancellable by dropping
//! the future. That abandons the local wait only; the remote query keeps
//! running and can be resumed with [`QueryHandle::new`] or stopped with
//! [`QueryExecutor::cancel`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::clock::{Clock, TokioClock};
use crate::engine::QueryEngine;
use crate::error::QueryError;
use crate::query::{QueryHandle, QueryRequest, QueryStatus, ResultArtifact, StatusReport};

/// How `await_completion` paces its status reads.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitOptions {
    /// Sleep between two status reads.
    pub poll_interval: Duration,
    /// Give up waiting after this long. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Multiplier applied to the interval after each non-terminal read.
    pub backoff_factor: f64,
    /// Upper bound for the interval when backing off.
    pub max_interval: Duration,
}

impl WaitOptions {
    /// Constant interval, no timeout.
    pub fn fixed(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            timeout: None,
            backoff_factor: 1.0,
            max_interval: poll_interval,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff_factor = factor.max(1.0);
        self.max_interval = max_interval.max(self.poll_interval);
        self
    }

    fn next_interval(&self, current: Duration) -> Duration {
        if self.backoff_factor <= 1.0 {
            return current;
        }
        current.mul_f64(self.backoff_factor).min(self.max_interval)
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(2)).with_timeout(Some(Duration::from_secs(300)))
    }
}

/// Submits queries and waits for them. Holds no per-query state.
pub struct QueryExecutor {
    engine: Arc<dyn QueryEngine>,
    clock: Arc<dyn Clock>,
}

impl QueryExecutor {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self::with_clock(engine, Arc::new(TokioClock))
    }

    pub fn with_clock(engine: Arc<dyn QueryEngine>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }

    /// Start asynchronous execution. Never retried.
    pub async fn submit(&self, request: &QueryRequest) -> Result<QueryHandle, QueryError> {
        info!(
            engine = self.engine.name(),
            database = %request.database(),
            output_location = %request.output_location(),
            sql = %request.sql(),
            "Submitting query"
        );

        match self.engine.start_query(request).await {
            Ok(handle) => {
                info!(query_id = %handle, "Query submitted");
                Ok(handle)
            }
            Err(e) => {
                error!(error = %e, "Query submission failed");
                Err(e)
            }
        }
    }

    /// Current status straight from the engine.
    pub async fn poll(&self, handle: &QueryHandle) -> Result<QueryStatus, QueryError> {
        Ok(self.poll_report(handle).await?.status)
    }

    /// Current status plus failure reason and statistics.
    pub async fn poll_report(&self, handle: &QueryHandle) -> Result<StatusReport, QueryError> {
        self.engine.get_status(handle).await
    }

    /// Poll until the query is terminal, sleeping between reads.
    ///
    /// Returns the result artifact on SUCCEEDED, [`QueryError::Execution`] on
    /// FAILED or CANCELLED, and [`QueryError::Timeout`] when the budget runs
    /// out first. A timeout does not cancel the remote query.
    pub async fn await_completion(
        &self,
        handle: &QueryHandle,
        options: &WaitOptions,
    ) -> Result<ResultArtifact, QueryError> {
        let started = self.clock.now();
        let mut interval = options.poll_interval;
        let mut last_status: Option<QueryStatus> = None;
        let mut polls: u32 = 0;

        loop {
            let report = self.poll_report(handle).await?;
            polls += 1;

            let elapsed = self.clock.now().saturating_duration_since(started);

            if let Some(prev) = last_status {
                if report.status.rank() < prev.rank() {
                    warn!(
                        query_id = %handle,
                        previous = %prev,
                        current = %report.status,
                        "Engine reported a status regression"
                    );
                }
            }

            debug!(
                query_id = %handle,
                state = %report.status,
                polls,
                elapsed_ms = elapsed.as_millis() as u64,
                "Polling query status"
            );

            match report.status {
                QueryStatus::Succeeded => {
                    let artifact = ResultArtifact::for_handle(handle);
                    info!(
                        query_id = %handle,
                        polls,
                        bytes_scanned = report.statistics.bytes_scanned,
                        engine_time_ms = report.statistics.engine_time_ms,
                        artifact = %artifact,
                        "Query succeeded"
                    );
                    return Ok(artifact);
                }
                QueryStatus::Failed | QueryStatus::Cancelled => {
                    error!(
                        query_id = %handle,
                        state = %report.status,
                        reason = report.reason.as_deref().unwrap_or("unknown"),
                        "Query did not succeed"
                    );
                    return Err(QueryError::Execution {
                        handle: handle.id().to_string(),
                        status: report.status,
                        reason: report.reason,
                    });
                }
                QueryStatus::Submitted | QueryStatus::Running => {}
            }

            last_status = Some(report.status);

            let mut sleep_for = interval;
            if let Some(timeout) = options.timeout {
                if elapsed >= timeout {
                    warn!(
                        query_id = %handle,
                        state = %report.status,
                        timeout_ms = timeout.as_millis() as u64,
                        "Stopped waiting for query; it keeps running remotely"
                    );
                    return Err(QueryError::Timeout {
                        handle: handle.id().to_string(),
                        elapsed,
                        last_status: report.status,
                    });
                }
                sleep_for = sleep_for.min(timeout - elapsed);
            }

            self.clock.sleep(sleep_for).await;
            interval = options.next_interval(interval);
        }
    }

    /// Submit then wait.
    pub async fn execute(
        &self,
        request: &QueryRequest,
        options: &WaitOptions,
    ) -> Result<(QueryHandle, ResultArtifact), QueryError> {
        let handle = self.submit(request).await?;
        let artifact = self.await_completion(&handle, options).await?;
        Ok((handle, artifact))
    }

    /// Explicitly cancel the remote query.
    pub async fn cancel(&self, handle: &QueryHandle) -> Result<(), QueryError> {
        info!(query_id = %handle, "Cancelling query");
        self.engine.stop_query(handle).await?;
        info!(query_id = %handle, "Query cancellation requested");
        Ok(())
    }
}
