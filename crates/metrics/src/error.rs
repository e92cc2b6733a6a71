//! Metric error types.

/// Errors that can occur while assembling a scoring scheme.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// The scheme names a metric the catalog does not know.
    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    /// The scheme has no metrics.
    #[error("the scheme names no metrics")]
    EmptyScheme,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown() {
        let err = MetricError::UnknownMetric {
            name: "mystery score".to_string(),
        };
        assert_eq!(err.to_string(), "unknown metric 'mystery score'");
    }

    #[test]
    fn display_empty() {
        assert_eq!(MetricError::EmptyScheme.to_string(), "the scheme names no metrics");
    }
}
