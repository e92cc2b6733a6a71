//! Backend address resolution.

use std::path::PathBuf;

use crate::error::BackendError;

/// Resolves a backend address (a literal path or a glob pattern) to the list
/// of files it names, in sorted order.
///
/// # Errors
///
/// Returns [`BackendError::Unavailable`] when the pattern is malformed or
/// matches no files.
pub(crate) fn resolve_address(address: &str) -> Result<Vec<PathBuf>, BackendError> {
    let entries = glob::glob(address).map_err(|e| BackendError::Unavailable {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => {
                return Err(BackendError::Unavailable {
                    address: address.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if paths.is_empty() {
        return Err(BackendError::Unavailable {
            address: address.to_string(),
            reason: "no files matched".to_string(),
        });
    }

    Ok(paths)
}
