use std::time::Duration;

use crate::query::QueryStatus;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from submitting, polling or awaiting a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Rejected before anything was sent to the engine.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// The engine reported FAILED or CANCELLED.
    #[error("query {handle} ended {status}: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Execution {
        handle: String,
        status: QueryStatus,
        reason: Option<String>,
    },

    /// No terminal state within the caller's budget. The query keeps running remotely.
    #[error("query {handle} still {last_status} after {}ms", .elapsed.as_millis())]
    Timeout {
        handle: String,
        elapsed: Duration,
        last_status: QueryStatus,
    },

    /// The engine no longer recognizes the handle (e.g. history purged).
    #[error("query engine does not recognize handle {handle}")]
    UnknownHandle { handle: String },

    /// Transport or provider failure talking to the engine.
    #[error("query engine {operation} failed: {source}")]
    Engine {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl QueryError {
    /// Handle the error refers to, when there is one.
    pub fn handle(&self) -> Option<&str> {
        match self {
            QueryError::Execution { handle, .. }
            | QueryError::Timeout { handle, .. }
            | QueryError::UnknownHandle { handle } => Some(handle),
            QueryError::InvalidQuery { .. } | QueryError::Engine { .. } => None,
        }
    }
}
