use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Extension of the result object the engine writes for a SELECT.
pub const RESULT_EXTENSION: &str = "csv";

/// A SQL statement bound to a database and a result prefix. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    sql: String,
    database: String,
    output_location: String,
}

impl QueryRequest {
    /// Validate and build a request.
    ///
    /// Blank SQL or database names are rejected here, before any engine call.
    /// `output_location` is normalized to end in `/`.
    pub fn new(
        sql: impl Into<String>,
        database: impl Into<String>,
        output_location: impl Into<String>,
    ) -> Result<Self, QueryError> {
        let sql = sql.into();
        let database = database.into();
        let output_location = output_location.into();

        if sql.trim().is_empty() {
            return Err(QueryError::InvalidQuery {
                reason: "SQL text is empty".into(),
            });
        }
        if database.trim().is_empty() {
            return Err(QueryError::InvalidQuery {
                reason: "database name is empty".into(),
            });
        }
        if output_location.trim().is_empty() {
            return Err(QueryError::InvalidQuery {
                reason: "output location is empty".into(),
            });
        }

        Ok(Self {
            sql,
            database,
            output_location: normalize_prefix(&output_location),
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn output_location(&self) -> &str {
        &self.output_location
    }
}

fn normalize_prefix(location: &str) -> String {
    let trimmed = location.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

/// Engine-issued identifier of one submitted query.
///
/// Carries the output prefix the query was submitted with so the result
/// artifact can be derived from the handle alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryHandle {
    id: String,
    output_location: String,
}

impl QueryHandle {
    /// Also used to resume a query submitted by an earlier process.
    pub fn new(id: impl Into<String>, output_location: &str) -> Self {
        Self {
            id: id.into(),
            output_location: normalize_prefix(output_location),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn output_location(&self) -> &str {
        &self.output_location
    }
}

impl fmt::Display for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Lifecycle state of a query, owned by the engine.
///
/// ```text
/// SUBMITTED → RUNNING → SUCCEEDED | FAILED
///           → CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Submitted,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Position in the lifecycle; terminal states share the last rank.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::Running => 1,
            Self::Succeeded | Self::Failed | Self::Cancelled => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatistics {
    pub bytes_scanned: u64,
    pub engine_time_ms: u64,
}

/// One live status observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: QueryStatus,
    /// Engine-provided detail, usually set on FAILED.
    pub reason: Option<String>,
    pub statistics: QueryStatistics,
}

impl StatusReport {
    pub fn new(status: QueryStatus) -> Self {
        Self {
            status,
            reason: None,
            statistics: QueryStatistics::default(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Location of a SUCCEEDED query's materialized rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultArtifact {
    uri: String,
}

impl ResultArtifact {
    /// `output_location + handle + ".csv"`. Only valid once the query SUCCEEDED.
    pub(crate) fn for_handle(handle: &QueryHandle) -> Self {
        Self {
            uri: format!("{}{}.{}", handle.output_location(), handle.id(), RESULT_EXTENSION),
        }
    }

    /// Wrap the URI of an artifact produced by an earlier, succeeded run.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for ResultArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}
