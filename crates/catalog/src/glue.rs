//! AWS Glue Data Catalog implementation of [`CatalogService`].

use async_trait::async_trait;
use aws_sdk_glue::types::{Column, DatabaseInput, SerDeInfo, StorageDescriptor, TableInput};
use tracing::debug;

use crate::error::CatalogError;
use crate::registrar::CatalogService;
use crate::schema::{DatabaseDefinition, TableDefinition};

pub struct GlueCatalog {
    client: aws_sdk_glue::Client,
}

impl GlueCatalog {
    pub fn new(sdk_config: &aws_types::SdkConfig) -> Self {
        Self {
            client: aws_sdk_glue::Client::new(sdk_config),
        }
    }

    fn table_input(table: &TableDefinition) -> Result<TableInput, CatalogError> {
        let invalid = |e: aws_sdk_glue::error::BuildError| CatalogError::InvalidDefinition {
            kind: "table",
            name: table.name.clone(),
            reason: e.to_string(),
        };

        let columns = table
            .columns
            .iter()
            .map(|c| Column::builder().name(&c.name).r#type(&c.data_type).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let descriptor = StorageDescriptor::builder()
            .set_columns(Some(columns))
            .location(&table.location)
            .input_format(&table.input_format)
            .output_format(&table.output_format)
            .serde_info(
                SerDeInfo::builder()
                    .serialization_library(&table.serialization_library)
                    .build(),
            )
            .build();

        TableInput::builder()
            .name(&table.name)
            .table_type(&table.table_type)
            .storage_descriptor(descriptor)
            .build()
            .map_err(invalid)
    }
}

#[async_trait]
impl CatalogService for GlueCatalog {
    async fn create_database(&self, database: &DatabaseDefinition) -> Result<(), CatalogError> {
        let input = DatabaseInput::builder()
            .name(&database.name)
            .set_description(database.description.clone())
            .build()
            .map_err(|e| CatalogError::InvalidDefinition {
                kind: "database",
                name: database.name.clone(),
                reason: e.to_string(),
            })?;

        debug!(database = %database.name, "glue CreateDatabase");

        match self.client.create_database().database_input(input).send().await {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = e.into_service_error();
                if err.is_already_exists_exception() {
                    return Err(CatalogError::AlreadyExists {
                        kind: "database",
                        name: database.name.clone(),
                    });
                }
                Err(CatalogError::Rejected {
                    operation: "create_database",
                    name: database.name.clone(),
                    source: Box::new(err),
                })
            }
        }
    }

    async fn create_table(&self, database: &str, table: &TableDefinition) -> Result<(), CatalogError> {
        let input = Self::table_input(table)?;

        debug!(database = %database, table = %table.name, "glue CreateTable");

        match self
            .client
            .create_table()
            .database_name(database)
            .table_input(input)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                let err = e.into_service_error();
                if err.is_already_exists_exception() {
                    return Err(CatalogError::AlreadyExists {
                        kind: "table",
                        name: format!("{}.{}", database, table.name),
                    });
                }
                if err.is_entity_not_found_exception() {
                    return Err(CatalogError::DatabaseNotFound {
                        database: database.to_string(),
                    });
                }
                Err(CatalogError::Rejected {
                    operation: "create_table",
                    name: format!("{}.{}", database, table.name),
                    source: Box::new(err),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "glue"
    }
}
