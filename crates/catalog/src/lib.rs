pub mod error;
pub mod glue;
pub mod memory;
pub mod registrar;
pub mod schema;

pub use error::CatalogError;
pub use glue::GlueCatalog;
pub use memory::InMemoryCatalog;
pub use registrar::{CatalogRegistrar, CatalogService};
pub use schema::{ColumnDef, DatabaseDefinition, TableDefinition};
