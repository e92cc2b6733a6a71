//! Location resolution for selected rows.

use regex::Regex;
use themis_config::{LocationSource, LocationSpec};
use tracing::debug;

use crate::error::BackendError;
use crate::record::SelectedRow;

/// Resolves a location identifier for every row in place, returning how many
/// rows failed to resolve.
///
/// Mode `value` reads a declared field; `filename` and `column` match the
/// spec's regular expression against the row's source file name or the column
/// name the value was read from, taking the first capture group (or the whole
/// match when the pattern has no groups).
///
/// # Errors
///
/// Returns [`BackendError::Pattern`] when the pattern does not compile.
pub fn resolve_locations(
    rows: &mut [SelectedRow],
    spec: &LocationSpec,
) -> Result<usize, BackendError> {
    let Some(source) = spec.from_field else {
        return Ok(0);
    };

    let pattern = match source {
        LocationSource::Filename | LocationSource::Column => {
            let text = spec.pattern.as_deref().unwrap_or_default();
            Some(Regex::new(text).map_err(|e| BackendError::Pattern {
                pattern: text.to_string(),
                reason: e.to_string(),
            })?)
        }
        LocationSource::Value => None,
    };

    let mut unresolved = 0usize;
    for row in rows.iter_mut() {
        row.location = match source {
            LocationSource::Value => spec
                .field
                .as_deref()
                .and_then(|field| row.fields.get(field))
                .map(|v| v.as_identifier()),
            LocationSource::Filename => capture(pattern.as_ref(), &row.source),
            LocationSource::Column => capture(pattern.as_ref(), &row.column),
        };

        if row.location.is_none() {
            debug!(
                selector = row.selector,
                source = row.source,
                "row location did not resolve"
            );
            unresolved += 1;
        }
    }

    Ok(unresolved)
}

fn capture(pattern: Option<&Regex>, text: &str) -> Option<String> {
    let captures = pattern?.captures(text)?;
    let m = captures.get(1).or_else(|| captures.get(0))?;
    Some(m.as_str().to_string())
}
