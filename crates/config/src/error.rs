//! Configuration error types.

/// Errors raised while parsing, merging, or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the typed model.
    #[error("configuration parse error: {reason}")]
    Parse { reason: String },

    /// Fragments cannot be combined.
    #[error("fragment merge error: {reason}")]
    Merge { reason: String },

    /// One or more structural validation checks failed.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse() {
        let err = ConfigError::Parse {
            reason: "unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "configuration parse error: unexpected token"
        );
    }

    #[test]
    fn display_validation() {
        let err = ConfigError::Validation {
            count: 2,
            details: "no observations; no scheme".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "2 validation error(s): no observations; no scheme"
        );
    }

    #[test]
    fn from_serde_json() {
        let bad: Result<serde_json::Value, _> = serde_json::from_str("{nope");
        let err: ConfigError = bad.unwrap_err().into();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
