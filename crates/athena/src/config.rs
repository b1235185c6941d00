use std::time::Duration;

use serde::{Deserialize, Serialize};

use lake_core::config::LakeConfig;

use crate::error::QueryError;
use crate::poller::WaitOptions;
use crate::query::QueryRequest;

/// Query-side view of the lake configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthenaConfig {
    /// Database queries run against.
    pub database: String,
    /// Athena workgroup.
    pub workgroup: String,
    /// URI prefix for query results.
    pub output_location: String,
    /// Sleep between status reads.
    pub poll_interval: Duration,
    /// Wait budget per query (`None` = wait forever).
    pub timeout: Option<Duration>,
}

impl AthenaConfig {
    pub fn from_lake(lake: &LakeConfig) -> Self {
        Self {
            database: lake.database.clone(),
            workgroup: lake.workgroup.clone(),
            output_location: lake.output_location.clone(),
            poll_interval: lake.poll_interval(),
            timeout: lake.query_timeout(),
        }
    }

    /// Build a request against the configured database and output prefix.
    pub fn request(&self, sql: &str) -> Result<QueryRequest, QueryError> {
        QueryRequest::new(sql, &self.database, &self.output_location)
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::fixed(self.poll_interval).with_timeout(self.timeout)
    }
}
