use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Create the bucket.
    Provision,
    /// Fetch the feed and upload the batch.
    Ingest,
    /// Create the database and table.
    Register,
    /// Run the query and wait for its artifact.
    Query,
    /// Load the artifact and aggregate it.
    Report,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Provision,
        Stage::Ingest,
        Stage::Register,
        Stage::Query,
        Stage::Report,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Provision => "provision",
            Stage::Ingest => "ingest",
            Stage::Register => "register",
            Stage::Query => "query",
            Stage::Report => "report",
        }
    }

    /// Stages from `from` through `to`, inclusive.
    pub fn range(from: Stage, to: Stage) -> impl Iterator<Item = Stage> {
        Self::ALL.into_iter().filter(move |s| *s >= from && *s <= to)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown stage '{s}' (expected one of: {})", names.join(", "))
            })
    }
}
