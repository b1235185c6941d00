use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Catalog rejections. A duplicate name is an error, never a silent success.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{kind} {name} already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("database {database} does not exist")]
    DatabaseNotFound { database: String },

    #[error("invalid {kind} definition {name}: {reason}")]
    InvalidDefinition {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("catalog rejected {operation} for {name}: {source}")]
    Rejected {
        operation: &'static str,
        name: String,
        #[source]
        source: BoxError,
    },
}

impl CatalogError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, CatalogError::AlreadyExists { .. })
    }
}
