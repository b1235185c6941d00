use lake_storage::StorageError;
use thiserror::Error;

/// The feed could not deliver a usable record batch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed rejected the API key (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("feed answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// `index` is `None` when the payload as a whole is unusable.
    #[error("malformed feed payload{}: {reason}", .index.map(|i| format!(" at record {i}")).unwrap_or_default())]
    Malformed { index: Option<usize>, reason: String },
}

/// A single-attempt storage write failed.
#[derive(Debug, Error)]
#[error("upload to {key} failed: {source}")]
pub struct UploadError {
    pub key: String,
    #[source]
    pub source: StorageError,
}

#[derive(Debug, Error)]
pub enum JsonlError {
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
