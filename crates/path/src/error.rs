//! Path expression error types.

/// Errors raised while parsing a path expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The expression contains no segments.
    #[error("empty path expression")]
    Empty,

    /// A segment could not be parsed.
    #[error("invalid path segment '{segment}' in '{path}'")]
    InvalidSegment { segment: String, path: String },

    /// A `[` bracket is never closed.
    #[error("unclosed '[' in path '{path}'")]
    UnclosedBracket { path: String },

    /// Bracket content is neither `*` nor a non-negative integer.
    #[error("invalid index '{index}' in path '{path}'")]
    InvalidIndex { index: String, path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_empty() {
        assert_eq!(PathError::Empty.to_string(), "empty path expression");
    }

    #[test]
    fn display_invalid_segment() {
        let err = PathError::InvalidSegment {
            segment: "[]".to_string(),
            path: "a.[]".to_string(),
        };
        assert_eq!(err.to_string(), "invalid path segment '[]' in 'a.[]'");
    }

    #[test]
    fn display_unclosed_bracket() {
        let err = PathError::UnclosedBracket {
            path: "a[0".to_string(),
        };
        assert_eq!(err.to_string(), "unclosed '[' in path 'a[0'");
    }

    #[test]
    fn display_invalid_index() {
        let err = PathError::InvalidIndex {
            index: "-3".to_string(),
            path: "a[-3]".to_string(),
        };
        assert_eq!(err.to_string(), "invalid index '-3' in path 'a[-3]'");
    }
}
