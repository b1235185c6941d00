use lake_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not read result artifact: {0}")]
    Storage(#[from] StorageError),

    #[error("result artifact is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("result has no column {column:?}")]
    MissingColumn { column: String },

    #[error("row {row}: {column} value {value:?} is not numeric")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },
}
