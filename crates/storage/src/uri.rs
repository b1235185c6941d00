use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

const SCHEME: &str = "s3://";

/// `s3://bucket/key` address of an object (or a key prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUri {
    bucket: String,
    key: String,
}

impl ObjectUri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into().trim_start_matches('/').to_string(),
        }
    }

    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let rest = uri.strip_prefix(SCHEME).ok_or_else(|| StorageError::InvalidUri {
            uri: uri.to_string(),
            reason: format!("expected {SCHEME} scheme"),
        })?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(StorageError::InvalidUri {
                uri: uri.to_string(),
                reason: "missing bucket".into(),
            });
        }
        Ok(Self::new(bucket, key))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", SCHEME, self.bucket, self.key)
    }
}

impl FromStr for ObjectUri {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
