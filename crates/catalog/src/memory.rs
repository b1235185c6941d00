use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::registrar::CatalogService;
use crate::schema::{DatabaseDefinition, TableDefinition};

/// In-process catalog with the same duplicate-name semantics as Glue.
#[derive(Default)]
pub struct InMemoryCatalog {
    databases: RwLock<HashMap<String, HashMap<String, TableDefinition>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_database(&self, database: &str) -> bool {
        self.databases.read().unwrap().contains_key(&key(database))
    }

    pub fn table(&self, database: &str, table: &str) -> Option<TableDefinition> {
        self.databases
            .read()
            .unwrap()
            .get(&key(database))
            .and_then(|tables| tables.get(&key(table)))
            .cloned()
    }
}

// Glue names are case-insensitive.
fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn create_database(&self, database: &DatabaseDefinition) -> Result<(), CatalogError> {
        let mut dbs = self.databases.write().unwrap();
        if dbs.contains_key(&key(&database.name)) {
            return Err(CatalogError::AlreadyExists {
                kind: "database",
                name: database.name.clone(),
            });
        }
        dbs.insert(key(&database.name), HashMap::new());
        Ok(())
    }

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<(), CatalogError> {
        let mut dbs = self.databases.write().unwrap();
        let tables = dbs.get_mut(&key(database)).ok_or_else(|| CatalogError::DatabaseNotFound {
            database: database.to_string(),
        })?;
        if tables.contains_key(&key(&table.name)) {
            return Err(CatalogError::AlreadyExists {
                kind: "table",
                name: format!("{}.{}", database, table.name),
            });
        }
        tables.insert(key(&table.name), table.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
