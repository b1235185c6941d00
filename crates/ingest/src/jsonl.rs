//! Newline-delimited JSON encoding of record batches.

use bytes::Bytes;
use lake_core::PlayerRecord;

use crate::error::JsonlError;

/// One JSON object per line, input order, each line ending in `\n`.
/// An empty batch yields an empty blob.
pub fn serialize_records(records: &[PlayerRecord]) -> Result<Bytes, JsonlError> {
    let mut buf = Vec::with_capacity(records.len() * 96);
    for record in records {
        serde_json::to_writer(&mut buf, record)?;
        buf.push(b'\n');
    }
    Ok(Bytes::from(buf))
}

/// Read a blob written by [`serialize_records`]. Blank lines are skipped;
/// line numbers in errors are 1-based.
pub fn parse_jsonl(blob: &[u8]) -> Result<Vec<PlayerRecord>, JsonlError> {
    blob.split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
        .map(|(i, line)| {
            serde_json::from_slice(line).map_err(|source| JsonlError::Line { line: i + 1, source })
        })
        .collect()
}
