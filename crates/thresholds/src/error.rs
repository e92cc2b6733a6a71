//! Threshold error types.

use themis_backend::BackendError;

/// Errors that can occur while loading a threshold source.
#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    /// The threshold source's backend failed to read.
    #[error("threshold backend error: {0}")]
    Backend(#[from] BackendError),

    /// No cutoffs could be extracted from the source.
    #[error("threshold source '{name}' produced no cutoffs")]
    Empty { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty() {
        let err = ThresholdError::Empty {
            name: "daily-percentiles".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "threshold source 'daily-percentiles' produced no cutoffs"
        );
    }

    #[test]
    fn from_backend_error() {
        let backend_err = BackendError::Unavailable {
            address: "x.rdb".to_string(),
            reason: "no files matched".to_string(),
        };
        let err: ThresholdError = backend_err.into();
        assert!(matches!(err, ThresholdError::Backend(_)));
    }
}
