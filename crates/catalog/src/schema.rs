use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Hadoop text input format: one record per line.
pub const TEXT_INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
pub const TEXT_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
/// OpenX SerDe: each line is one JSON object.
pub const JSON_SERDE: &str = "org.openx.data.jsonserde.JsonSerDe";
pub const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDefinition {
    pub name: String,
    pub description: Option<String>,
}

impl DatabaseDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A column within a table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Table metadata mapping raw files at `location` onto typed columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    /// URI prefix of the data files, e.g. `s3://bucket/raw-data/`.
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub serialization_library: String,
    pub table_type: String,
}

impl TableDefinition {
    /// External table over newline-delimited JSON objects.
    pub fn json_lines(name: impl Into<String>, columns: Vec<ColumnDef>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            location: location.into(),
            input_format: TEXT_INPUT_FORMAT.to_string(),
            output_format: TEXT_OUTPUT_FORMAT.to_string(),
            serialization_library: JSON_SERDE.to_string(),
            table_type: EXTERNAL_TABLE.to_string(),
        }
    }

    /// Player statistics table over the ingested JSON lines.
    pub fn nba_players(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::json_lines(
            name,
            vec![
                ColumnDef::new("PlayerID", "int"),
                ColumnDef::new("FirstName", "string"),
                ColumnDef::new("LastName", "string"),
                ColumnDef::new("Team", "string"),
                ColumnDef::new("Position", "string"),
                ColumnDef::new("Points", "int"),
            ],
            location,
        )
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Reject definitions the engine could never query.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidDefinition {
            kind: "table",
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("empty table name"));
        }
        if self.columns.is_empty() {
            return Err(invalid("no columns"));
        }
        if self.location.trim().is_empty() {
            return Err(invalid("empty location"));
        }
        let mut seen = std::collections::HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name.to_ascii_lowercase()) {
                return Err(invalid(&format!("duplicate column {}", col.name)));
            }
        }
        Ok(())
    }
}
