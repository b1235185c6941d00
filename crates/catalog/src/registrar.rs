//! Catalog registration: make uploaded files queryable as rows.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::CatalogError;
use crate::schema::{DatabaseDefinition, TableDefinition};

/// Metadata service mapping database/table names to storage locations.
///
/// Calls are synchronous from the caller's point of view; no polling.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_database(&self, database: &DatabaseDefinition) -> Result<(), CatalogError>;

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<(), CatalogError>;

    /// Human-readable name for logs (e.g. "glue", "memory").
    fn name(&self) -> &str;
}

/// Registers the lake's database and table against a [`CatalogService`].
pub struct CatalogRegistrar {
    service: Arc<dyn CatalogService>,
}

impl CatalogRegistrar {
    pub fn new(service: Arc<dyn CatalogService>) -> Self {
        Self { service }
    }

    pub async fn register_database(&self, database: &DatabaseDefinition) -> Result<(), CatalogError> {
        if database.name.trim().is_empty() {
            return Err(CatalogError::InvalidDefinition {
                kind: "database",
                name: database.name.clone(),
                reason: "empty database name".into(),
            });
        }
        match self.service.create_database(database).await {
            Ok(()) => {
                info!(catalog = self.service.name(), database = %database.name, "database registered");
                Ok(())
            }
            Err(e) => {
                error!(catalog = self.service.name(), database = %database.name, error = %e, "database registration failed");
                Err(e)
            }
        }
    }

    pub async fn register_table(&self, database: &str, table: &TableDefinition) -> Result<(), CatalogError> {
        table.validate()?;
        match self.service.create_table(database, table).await {
            Ok(()) => {
                info!(
                    catalog = self.service.name(),
                    database = %database,
                    table = %table.name,
                    location = %table.location,
                    columns = table.columns.len(),
                    "table registered"
                );
                Ok(())
            }
            Err(e) => {
                error!(catalog = self.service.name(), database = %database, table = %table.name, error = %e, "table registration failed");
                Err(e)
            }
        }
    }
}
