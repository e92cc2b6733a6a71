//! Value selectors: extract and coerce named columns from raw records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use themis_config::{Datatype, ValueSelectorSpec};
use themis_path::{Path, Value};
use tracing::debug;

use crate::day::Day;
use crate::error::BackendError;
use crate::record::{FieldValue, RawRecord, SelectedRow, parse_datetime};

/// A selector with its path expressions parsed up front.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    name: String,
    path: Path,
    datatype: Datatype,
    fields: Vec<CompiledField>,
}

#[derive(Debug, Clone)]
struct CompiledField {
    name: String,
    path: Path,
    datatype: Datatype,
}

/// The outcome of applying selectors to a record set.
#[derive(Debug)]
pub struct Selection {
    /// Rows that survived extraction and coercion.
    pub rows: Vec<SelectedRow>,
    /// Rows (or whole records) dropped for missing paths or bad values.
    pub dropped: usize,
}

/// Parses every selector's path expressions.
///
/// # Errors
///
/// Returns [`BackendError::Path`] on the first malformed expression.
pub fn compile_selectors(specs: &[ValueSelectorSpec]) -> Result<Vec<CompiledSelector>, BackendError> {
    specs
        .iter()
        .map(|spec| {
            let fields = spec
                .associated_fields
                .iter()
                .map(|f| {
                    Ok(CompiledField {
                        name: f.name.clone(),
                        path: Path::parse(&f.path)?,
                        datatype: f.datatype,
                    })
                })
                .collect::<Result<Vec<_>, BackendError>>()?;
            Ok(CompiledSelector {
                name: spec.name.clone(),
                path: Path::parse(&spec.path)?,
                datatype: spec.datatype,
                fields,
            })
        })
        .collect()
}

/// Applies selectors to raw records, producing one row per selector match.
///
/// Wildcards in a selector's value path expand Cartesian-style; associated
/// field paths are evaluated with the value's wildcard indices pinned so each
/// row's fields come from the same branch of the tree. A record that yields
/// no match for a selector, or a row whose value or field fails coercion,
/// is dropped and counted rather than failing the load.
pub fn apply_selectors(records: &[RawRecord], selectors: &[CompiledSelector]) -> Selection {
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for record in records {
        for selector in selectors {
            let matches = selector.path.evaluate(&record.tree);
            if matches.is_empty() {
                debug!(
                    selector = selector.name,
                    source = record.source,
                    path = selector.path.text(),
                    "selector path matched nothing"
                );
                dropped += 1;
                continue;
            }

            for m in matches {
                match build_row(record, selector, m.value, &m.indices) {
                    Some(row) => rows.push(row),
                    None => dropped += 1,
                }
            }
        }
    }

    Selection { rows, dropped }
}

fn build_row(
    record: &RawRecord,
    selector: &CompiledSelector,
    value: &Value,
    pins: &[usize],
) -> Option<SelectedRow> {
    let value = match coerce(value, selector.datatype) {
        Ok(v) => v,
        Err(reason) => {
            debug!(
                selector = selector.name,
                source = record.source,
                reason,
                "value coercion failed"
            );
            return None;
        }
    };

    let mut fields = BTreeMap::new();
    for field in &selector.fields {
        let matches = field.path.evaluate_pinned(&record.tree, pins);
        let Some(first) = matches.first() else {
            debug!(
                selector = selector.name,
                field = field.name,
                source = record.source,
                "associated field path matched nothing"
            );
            return None;
        };
        match coerce(first.value, field.datatype) {
            Ok(v) => {
                fields.insert(field.name.clone(), v);
            }
            Err(reason) => {
                debug!(
                    selector = selector.name,
                    field = field.name,
                    source = record.source,
                    reason,
                    "field coercion failed"
                );
                return None;
            }
        }
    }

    Some(SelectedRow {
        selector: selector.name.clone(),
        column: selector.path.text().to_string(),
        value,
        fields,
        location: None,
        source: record.source.clone(),
    })
}

/// Coerces a tree value to a declared datatype.
fn coerce(value: &Value, datatype: Datatype) -> Result<FieldValue, String> {
    match datatype {
        Datatype::Float => match value {
            Value::Number(n) => Ok(FieldValue::Float(*n)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|_| format!("'{s}' is not a number")),
            other => Err(format!("cannot coerce {} to float", kind_name(other))),
        },
        Datatype::String => match value {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Number(n) => Ok(FieldValue::Text(FieldValue::Float(*n).as_identifier())),
            Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
            other => Err(format!("cannot coerce {} to string", kind_name(other))),
        },
        Datatype::Datetime => match value {
            Value::Datetime(epoch) => epoch_to_datetime(*epoch)
                .map(FieldValue::Datetime)
                .ok_or_else(|| format!("epoch {epoch} out of range")),
            Value::String(s) => parse_datetime(s, None)
                .map(FieldValue::Datetime)
                .ok_or_else(|| format!("'{s}' is not a timestamp")),
            Value::Number(n) => epoch_to_datetime(*n as i64)
                .map(FieldValue::Datetime)
                .ok_or_else(|| format!("epoch {n} out of range")),
            other => Err(format!("cannot coerce {} to datetime", kind_name(other))),
        },
        Datatype::Day => match value {
            Value::String(s) => Day::parse(s)
                .map(FieldValue::Day)
                .map_err(|e| e.to_string()),
            Value::Datetime(epoch) => epoch_to_datetime(*epoch)
                .map(|t| FieldValue::Day(Day::from_datetime(&t)))
                .ok_or_else(|| format!("epoch {epoch} out of range")),
            other => Err(format!("cannot coerce {} to day", kind_name(other))),
        },
    }
}

fn epoch_to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(epoch, 0)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Datetime(_) => "datetime",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl CompiledSelector {
    /// Selector name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themis_config::FieldSpec;

    fn selector_spec(name: &str, path: &str, datatype: Datatype) -> ValueSelectorSpec {
        ValueSelectorSpec {
            name: name.to_string(),
            path: path.to_string(),
            datatype,
            associated_fields: vec![],
        }
    }

    fn json_record(json: &str) -> RawRecord {
        RawRecord {
            source: "test.json".to_string(),
            tree: Value::from(serde_json::from_str::<serde_json::Value>(json).unwrap()),
        }
    }

    #[test]
    fn compile_rejects_bad_path() {
        let spec = selector_spec("flow", "a[", Datatype::Float);
        assert!(matches!(
            compile_selectors(&[spec]).unwrap_err(),
            BackendError::Path(_)
        ));
    }

    #[test]
    fn scalar_extraction() {
        let selectors =
            compile_selectors(&[selector_spec("flow", "flow", Datatype::Float)]).unwrap();
        let records = vec![json_record(r#"{"flow": "12.5"}"#)];
        let selection = apply_selectors(&records, &selectors);

        assert_eq!(selection.dropped, 0);
        assert_eq!(selection.rows.len(), 1);
        assert_eq!(selection.rows[0].value, FieldValue::Float(12.5));
        assert_eq!(selection.rows[0].column, "flow");
    }

    #[test]
    fn wildcard_rows_with_aligned_fields() {
        let spec = ValueSelectorSpec {
            name: "flow".to_string(),
            path: "locations[*].values[*].value".to_string(),
            datatype: Datatype::Float,
            associated_fields: vec![
                FieldSpec {
                    name: "value_date".to_string(),
                    path: "locations[*].values[*].time".to_string(),
                    datatype: Datatype::Datetime,
                },
                FieldSpec {
                    name: "site".to_string(),
                    path: "locations[*].site".to_string(),
                    datatype: Datatype::String,
                },
            ],
        };
        let selectors = compile_selectors(&[spec]).unwrap();
        let records = vec![json_record(
            r#"{"locations": [
                {"site": "cat-01", "values": [
                    {"value": 1.0, "time": "2015-12-01T00:00:00Z"},
                    {"value": 2.0, "time": "2015-12-02T00:00:00Z"}
                ]},
                {"site": "cat-02", "values": [
                    {"value": 3.0, "time": "2015-12-01T00:00:00Z"}
                ]}
            ]}"#,
        )];

        let selection = apply_selectors(&records, &selectors);
        assert_eq!(selection.dropped, 0);
        assert_eq!(selection.rows.len(), 3);

        let sites: Vec<_> = selection
            .rows
            .iter()
            .map(|r| r.fields["site"].as_identifier())
            .collect();
        assert_eq!(sites, vec!["cat-01", "cat-01", "cat-02"]);
        assert_eq!(selection.rows[2].value, FieldValue::Float(3.0));
        assert!(selection.rows[0].timestamp().is_some());
    }

    #[test]
    fn missing_value_path_drops_record() {
        let selectors =
            compile_selectors(&[selector_spec("flow", "missing", Datatype::Float)]).unwrap();
        let records = vec![json_record(r#"{"flow": 1.0}"#)];
        let selection = apply_selectors(&records, &selectors);
        assert!(selection.rows.is_empty());
        assert_eq!(selection.dropped, 1);
    }

    #[test]
    fn missing_field_drops_row_only() {
        let spec = ValueSelectorSpec {
            name: "flow".to_string(),
            path: "values[*].value".to_string(),
            datatype: Datatype::Float,
            associated_fields: vec![FieldSpec {
                name: "time".to_string(),
                path: "values[*].time".to_string(),
                datatype: Datatype::Datetime,
            }],
        };
        let selectors = compile_selectors(&[spec]).unwrap();
        let records = vec![json_record(
            r#"{"values": [
                {"value": 1.0, "time": "2015-12-01"},
                {"value": 2.0}
            ]}"#,
        )];

        let selection = apply_selectors(&records, &selectors);
        assert_eq!(selection.rows.len(), 1);
        assert_eq!(selection.dropped, 1);
        assert_eq!(selection.rows[0].value, FieldValue::Float(1.0));
    }

    #[test]
    fn uncoercible_value_drops_row() {
        let selectors =
            compile_selectors(&[selector_spec("flow", "flow", Datatype::Float)]).unwrap();
        let records = vec![json_record(r#"{"flow": "Ice"}"#)];
        let selection = apply_selectors(&records, &selectors);
        assert!(selection.rows.is_empty());
        assert_eq!(selection.dropped, 1);
    }

    #[test]
    fn coerce_datetime_variants() {
        let t = coerce(&Value::String("2015-12-01".to_string()), Datatype::Datetime).unwrap();
        assert!(t.as_datetime().is_some());

        let t = coerce(&Value::Datetime(1448928000), Datatype::Datetime).unwrap();
        assert_eq!(
            t.as_datetime().unwrap().to_rfc3339(),
            "2015-12-01T00:00:00+00:00"
        );
    }

    #[test]
    fn coerce_day_variants() {
        let d = coerce(&Value::String("12-01".to_string()), Datatype::Day).unwrap();
        assert_eq!(d.as_day().unwrap(), Day::new(12, 1).unwrap());

        let d = coerce(&Value::Datetime(1448928000), Datatype::Day).unwrap();
        assert_eq!(d.as_day().unwrap(), Day::new(12, 1).unwrap());

        assert!(coerce(&Value::Number(5.0), Datatype::Day).is_err());
    }

    #[test]
    fn coerce_string_from_number() {
        let s = coerce(&Value::Number(2146562.0), Datatype::String).unwrap();
        assert_eq!(s, FieldValue::Text("2146562".to_string()));
    }

    #[test]
    fn coerce_null_fails() {
        assert!(coerce(&Value::Null, Datatype::Float).is_err());
        assert!(coerce(&Value::Null, Datatype::String).is_err());
    }
}
