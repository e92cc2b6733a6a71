//! Path expression parsing and evaluation.

use crate::error::PathError;
use crate::value::Value;

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Descend into an object by key.
    Key(String),
    /// Descend into an array at a fixed index.
    Index(usize),
    /// Repeat the remaining extraction for every element of an array.
    Wildcard,
}

/// A single result of evaluating a path against a tree.
///
/// `indices` records the array index chosen at each wildcard, in segment
/// order. Two paths that share a wildcard prefix can be kept in lockstep by
/// evaluating the second with the first's indices as pins.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    pub value: &'a Value,
    pub indices: Vec<usize>,
}

/// A parsed path expression such as `locations[*].values[*].value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
    text: String,
}

impl Path {
    /// Parses a path expression.
    ///
    /// Segments are separated by `.`; each segment is an object key followed
    /// by any number of `[n]` or `[*]` array accessors.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the expression is empty, a bracket is left
    /// unclosed, or bracket content is neither `*` nor a non-negative integer.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for raw in text.split('.') {
            if raw.is_empty() {
                return Err(PathError::InvalidSegment {
                    segment: raw.to_string(),
                    path: text.to_string(),
                });
            }

            let (key, mut rest) = match raw.find('[') {
                Some(pos) => (&raw[..pos], &raw[pos..]),
                None => (raw, ""),
            };

            if key.is_empty() && rest.is_empty() {
                return Err(PathError::InvalidSegment {
                    segment: raw.to_string(),
                    path: text.to_string(),
                });
            }
            if !key.is_empty() {
                segments.push(Segment::Key(key.to_string()));
            }

            while !rest.is_empty() {
                debug_assert!(rest.starts_with('['));
                let close = rest.find(']').ok_or_else(|| PathError::UnclosedBracket {
                    path: text.to_string(),
                })?;
                let inner = &rest[1..close];
                let segment = match inner {
                    "*" => Segment::Wildcard,
                    _ => {
                        let index =
                            inner
                                .parse::<usize>()
                                .map_err(|_| PathError::InvalidIndex {
                                    index: inner.to_string(),
                                    path: text.to_string(),
                                })?;
                        Segment::Index(index)
                    }
                };
                segments.push(segment);
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(PathError::InvalidSegment {
                        segment: raw.to_string(),
                        path: text.to_string(),
                    });
                }
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self {
            segments,
            text: text.to_string(),
        })
    }

    /// Returns the original expression text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the key when the path is a single bare key (a column name).
    pub fn as_bare_key(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Key(k)] => Some(k),
            _ => None,
        }
    }

    /// Evaluates the path against a tree, expanding every wildcard across all
    /// array elements (Cartesian expansion, document order).
    pub fn evaluate<'a>(&self, root: &'a Value) -> Vec<Match<'a>> {
        self.evaluate_pinned(root, &[])
    }

    /// Evaluates the path with the first wildcards pinned to fixed indices.
    ///
    /// `pins[i]` fixes the i-th wildcard of this path to one array index;
    /// wildcards beyond `pins.len()` expand normally. Pinning is how
    /// associated-field paths stay aligned with the value path that produced
    /// a row.
    pub fn evaluate_pinned<'a>(&self, root: &'a Value, pins: &[usize]) -> Vec<Match<'a>> {
        let mut out = Vec::new();
        let mut chosen = Vec::new();
        walk(root, &self.segments, pins, &mut chosen, &mut out);
        out
    }
}

fn walk<'a>(
    value: &'a Value,
    segments: &[Segment],
    pins: &[usize],
    chosen: &mut Vec<usize>,
    out: &mut Vec<Match<'a>>,
) {
    let Some((first, rest)) = segments.split_first() else {
        out.push(Match {
            value,
            indices: chosen.clone(),
        });
        return;
    };

    match first {
        Segment::Key(key) => {
            if let Some(child) = value.get(key) {
                walk(child, rest, pins, chosen, out);
            }
        }
        Segment::Index(index) => {
            if let Some(child) = value.at(*index) {
                walk(child, rest, pins, chosen, out);
            }
        }
        Segment::Wildcard => {
            let Value::Array(items) = value else {
                return;
            };
            if let Some(&pin) = pins.get(chosen.len()) {
                if let Some(child) = items.get(pin) {
                    chosen.push(pin);
                    walk(child, rest, pins, chosen, out);
                    chosen.pop();
                }
            } else {
                for (i, child) in items.iter().enumerate() {
                    chosen.push(i);
                    walk(child, rest, pins, chosen, out);
                    chosen.pop();
                }
            }
        }
    }
}
