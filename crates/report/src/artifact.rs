use lake_athena::ResultArtifact;
use lake_storage::{LakeStorage, ObjectUri};
use tracing::debug;

use crate::error::ReportError;
use crate::table::ResultTable;

/// Read and parse the CSV written for a succeeded query.
pub async fn load_artifact(storage: &LakeStorage, artifact: &ResultArtifact) -> Result<ResultTable, ReportError> {
    let uri = ObjectUri::parse(artifact.uri())?;
    let bytes = storage.get(&uri).await?;
    let table = ResultTable::from_csv(&bytes)?;
    debug!(artifact = %artifact, rows = table.row_count(), "result artifact loaded");
    Ok(table)
}
