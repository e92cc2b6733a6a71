//! Crosswalk error types.

use themis_backend::BackendError;

/// Errors that can occur while loading a crosswalk.
#[derive(Debug, thiserror::Error)]
pub enum CrosswalkError {
    /// The crosswalk's backend failed to read.
    #[error("crosswalk backend error: {0}")]
    Backend(#[from] BackendError),

    /// No identifier pairs could be extracted.
    #[error("crosswalk '{name}' produced no location pairs")]
    Empty { name: String },
}
