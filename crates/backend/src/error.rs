//! Error types for themis-backend.

use std::path::PathBuf;

/// Error type for all fallible operations in the themis-backend crate.
///
/// Covers unreachable addresses, malformed content per the declared format,
/// path-expression problems, invalid location patterns, and empty selections.
/// Per-row problems (a missing field, an uncoercible value) are not errors:
/// those rows are dropped and counted, and only an all-rows-dropped dataset
/// fails its load.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend address resolved to no files.
    #[error("backend unavailable: '{address}': {reason}")]
    Unavailable {
        /// Address (path or glob) that failed to resolve.
        address: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A resolved file could not be read.
    #[error("io error reading {}: {reason}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Description of the underlying I/O failure.
        reason: String,
    },

    /// File content does not parse per the declared format.
    #[error("format error in {}: {reason}", path.display())]
    Format {
        /// Path of the malformed file.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A selector or crosswalk path expression failed to parse.
    #[error("path error: {0}")]
    Path(#[from] themis_path::PathError),

    /// A location pattern is not a valid regular expression.
    #[error("invalid location pattern '{pattern}': {reason}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the regex compile failure.
        reason: String,
    },

    /// Every row of a dataset was dropped during selection.
    #[error("dataset '{dataset}' produced no usable rows")]
    EmptySelection {
        /// Name of the dataset that came up empty.
        dataset: String,
    },

    /// A (month, day) pair does not name a calendar day.
    #[error("invalid calendar day: month {month}, day {day}")]
    InvalidDay { month: u8, day: u8 },
}
