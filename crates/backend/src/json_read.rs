//! JSON backend reading.

use std::path::Path;

use themis_path::Value;

use crate::error::BackendError;
use crate::record::RawRecord;

/// Reads a JSON file into a single raw record holding the whole document.
///
/// Selectors address into the document with wildcard paths, so one file
/// yields one record regardless of how many series it contains.
pub(crate) fn read_json(path: &Path) -> Result<RawRecord, BackendError> {
    let text = std::fs::read_to_string(path).map_err(|e| BackendError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| BackendError::Format {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    Ok(RawRecord {
        source: file_name(path),
        tree: Value::from(document),
    })
}

/// Returns the final path component as a string.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
