//! CSV backend reading.

use std::collections::BTreeMap;
use std::path::Path;

use themis_path::Value;
use tracing::debug;

use crate::error::BackendError;
use crate::json_read::file_name;
use crate::record::{RawRecord, parse_datetime};

/// Reads a CSV file into one raw record per data row.
///
/// Cells stay as strings (selector coercion handles datatypes) except for
/// columns named in `date_fields`, which are parsed into timestamps at read
/// time; an unparseable date cell becomes null and is logged, leaving the
/// drop decision to the selector.
pub(crate) fn read_csv(
    path: &Path,
    date_fields: &[String],
    date_format: Option<&str>,
) -> Result<Vec<RawRecord>, BackendError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| BackendError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| BackendError::Format {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let source = file_name(path);
    let mut records = Vec::new();

    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| BackendError::Format {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut object = BTreeMap::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            object.insert(header.clone(), cell_value(header, cell, date_fields, date_format, line));
        }
        records.push(RawRecord {
            source: source.clone(),
            tree: Value::Object(object),
        });
    }

    Ok(records)
}

/// Converts one tabular cell into a tree value, honouring date columns.
pub(crate) fn cell_value(
    header: &str,
    cell: &str,
    date_fields: &[String],
    date_format: Option<&str>,
    line: usize,
) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if date_fields.iter().any(|f| f == header) {
        match parse_datetime(cell, date_format) {
            Some(t) => Value::Datetime(t.timestamp()),
            None => {
                debug!(column = header, cell, line, "unparseable date cell");
                Value::Null
            }
        }
    } else {
        Value::String(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.csv");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn rows_become_records() {
        let (_dir, path) = write_csv("site,flow\ncat-01,10.5\ncat-02,3\n");
        let records = read_csv(&path, &[], None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].tree.get("site").and_then(Value::as_str),
            Some("cat-01")
        );
        // Numeric-looking cells stay strings until a selector coerces them.
        assert_eq!(
            records[1].tree.get("flow").and_then(Value::as_str),
            Some("3")
        );
        assert_eq!(records[0].source, "obs.csv");
    }

    #[test]
    fn date_fields_parse_to_timestamps() {
        let (_dir, path) = write_csv("date,flow\n2015-12-01,1.0\n2015-12-02,2.0\n");
        let records = read_csv(&path, &["date".to_string()], None).unwrap();
        match records[0].tree.get("date") {
            Some(Value::Datetime(epoch)) => assert_eq!(*epoch, 1448928000),
            other => panic!("expected datetime, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_date_becomes_null() {
        let (_dir, path) = write_csv("date,flow\nnot-a-date,1.0\n");
        let records = read_csv(&path, &["date".to_string()], None).unwrap();
        assert_eq!(records[0].tree.get("date"), Some(&Value::Null));
    }

    #[test]
    fn empty_cells_become_null() {
        let (_dir, path) = write_csv("site,flow\ncat-01,\n");
        let records = read_csv(&path, &[], None).unwrap();
        assert_eq!(records[0].tree.get("flow"), Some(&Value::Null));
    }

    #[test]
    fn ragged_row_is_format_error() {
        let (_dir, path) = write_csv("site,flow\ncat-01,1.0,extra\n");
        let err = read_csv(&path, &[], None).unwrap_err();
        assert!(matches!(err, BackendError::Format { .. }));
    }
}
