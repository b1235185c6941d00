use async_trait::async_trait;

use crate::error::QueryError;
use crate::query::{QueryHandle, QueryRequest, StatusReport};

/// An asynchronous SQL engine. It owns every status transition; callers only observe.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Begin execution and return the engine-issued handle.
    async fn start_query(&self, request: &QueryRequest) -> Result<QueryHandle, QueryError>;

    /// Live status read. Must not have side effects.
    async fn get_status(&self, handle: &QueryHandle) -> Result<StatusReport, QueryError>;

    /// Ask the engine to cancel a running query.
    async fn stop_query(&self, handle: &QueryHandle) -> Result<(), QueryError>;

    /// Human-readable name for logs (e.g. "athena").
    fn name(&self) -> &str;
}
