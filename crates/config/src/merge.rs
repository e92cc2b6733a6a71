//! Recursive structural merge of configuration fragments.
//!
//! A complete configuration is commonly assembled from a library of partial
//! documents (a named observation backend, a reusable threshold set, a
//! scoring scheme). Fragments merge in order: objects combine key by key with
//! later scalars overriding earlier ones, and lists follow a schema-driven
//! policy — named specification lists merge entry-by-entry on `name`, plain
//! value lists concatenate.

use serde_json::Value;

use crate::error::ConfigError;

/// List-merge behaviour for one schema location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListPolicy {
    /// Entries carrying a `name` override earlier entries with the same name;
    /// unnamed entries append.
    MergeByName,
    /// Entries always append.
    Concat,
}

/// Keys whose lists hold named specification objects.
///
/// Everything else (`date_fields` and other plain value lists) concatenates.
const NAMED_LISTS: &[&str] = &[
    "observations",
    "predictions",
    "crosswalks",
    "thresholds",
    "metrics",
    "definitions",
    "selectors",
    "associated_fields",
];

fn list_policy(key: &str) -> ListPolicy {
    if NAMED_LISTS.contains(&key) {
        ListPolicy::MergeByName
    } else {
        ListPolicy::Concat
    }
}

/// Merges configuration fragments, in order, into one document.
///
/// # Errors
///
/// Returns [`ConfigError::Merge`] when no fragments are supplied or when the
/// fragments are not all JSON objects.
pub fn merge_fragments(fragments: Vec<Value>) -> Result<Value, ConfigError> {
    let mut iter = fragments.into_iter();
    let mut merged = iter.next().ok_or_else(|| ConfigError::Merge {
        reason: "no fragments supplied".to_string(),
    })?;

    if !merged.is_object() {
        return Err(ConfigError::Merge {
            reason: "fragments must be JSON objects".to_string(),
        });
    }

    for fragment in iter {
        if !fragment.is_object() {
            return Err(ConfigError::Merge {
                reason: "fragments must be JSON objects".to_string(),
            });
        }
        merged = merge_values(merged, fragment, None);
    }

    Ok(merged)
}

/// Merges `b` onto `a`. `key` is the object key under which both sit, used to
/// pick the list policy.
fn merge_values(a: Value, b: Value, key: Option<&str>) -> Value {
    match (a, b) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (k, rv) in right {
                let merged = match left.remove(&k) {
                    Some(lv) => merge_values(lv, rv, Some(&k)),
                    None => rv,
                };
                left.insert(k, merged);
            }
            Value::Object(left)
        }
        (Value::Array(left), Value::Array(right)) => {
            match key.map(list_policy).unwrap_or(ListPolicy::Concat) {
                ListPolicy::Concat => {
                    let mut items = left;
                    items.extend(right);
                    Value::Array(items)
                }
                ListPolicy::MergeByName => Value::Array(merge_named_entries(left, right)),
            }
        }
        // Type mismatch or scalar: the later fragment wins.
        (_, b) => b,
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}

fn merge_named_entries(left: Vec<Value>, right: Vec<Value>) -> Vec<Value> {
    let mut items = left;
    for entry in right {
        let position = entry_name(&entry).and_then(|name| {
            items
                .iter()
                .position(|existing| entry_name(existing) == Some(name))
        });
        match position {
            Some(i) => {
                let existing = items.remove(i);
                // Keys on each side may be incomplete halves of one spec, so
                // the entries themselves merge recursively.
                items.insert(i, merge_values(existing, entry, None));
            }
            None => items.push(entry),
        }
    }
    items
}
