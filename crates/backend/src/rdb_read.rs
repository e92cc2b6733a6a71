//! RDB (tab-separated) backend reading.
//!
//! RDB files carry `#`-prefixed comment lines, a tab-separated header on the
//! first non-comment line, and, in the USGS convention, a second line of
//! column size/type codes (`5s`, `14n`, ...) which carries no data.

use std::collections::BTreeMap;
use std::path::Path;

use themis_path::Value;

use crate::csv_read::cell_value;
use crate::error::BackendError;
use crate::json_read::file_name;
use crate::record::RawRecord;

/// Reads an RDB file into one raw record per data row.
pub(crate) fn read_rdb(
    path: &Path,
    date_fields: &[String],
    date_format: Option<&str>,
) -> Result<Vec<RawRecord>, BackendError> {
    let text = std::fs::read_to_string(path).map_err(|e| BackendError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.starts_with('#'));

    let Some((_, header_line)) = lines.next() else {
        return Err(BackendError::Format {
            path: path.to_path_buf(),
            reason: "no header line after comments".to_string(),
        });
    };
    let headers: Vec<&str> = header_line.split('\t').collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(BackendError::Format {
            path: path.to_path_buf(),
            reason: "empty header line".to_string(),
        });
    }

    let source = file_name(path);
    let mut records = Vec::new();
    let mut first_data_line = true;

    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split('\t').collect();

        // USGS RDB: the line after the header holds column format codes.
        if first_data_line && is_format_row(&cells) {
            first_data_line = false;
            continue;
        }
        first_data_line = false;

        let mut object = BTreeMap::new();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            object.insert(
                header.to_string(),
                cell_value(header, cell.trim(), date_fields, date_format, line_no),
            );
        }
        records.push(RawRecord {
            source: source.clone(),
            tree: Value::Object(object),
        });
    }

    Ok(records)
}

/// True when every cell is a USGS size/type code such as `5s` or `14n`.
fn is_format_row(cells: &[&str]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let cell = cell.trim();
            let digits: String = cell.chars().take_while(char::is_ascii_digit).collect();
            let rest = &cell[digits.len()..];
            !digits.is_empty() && !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphabetic())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_FILE: &str = "\
# U.S. Geological Survey daily statistics
#
# This file contains published daily mean streamflow statistics
site_no\tmonth_nu\tday_nu\tp50_va\tp75_va
15s\t3n\t3n\t12n\t12n
02146562\t12\t1\t33.0\t70.0
02146562\t12\t2\t34.0\t71.5
";

    fn write_rdb(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.rdb");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn comments_and_format_row_are_skipped() {
        let (_dir, path) = write_rdb(STAT_FILE);
        let records = read_rdb(&path, &[], None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].tree.get("site_no").and_then(Value::as_str),
            Some("02146562")
        );
        assert_eq!(
            records[0].tree.get("p75_va").and_then(Value::as_str),
            Some("70.0")
        );
        assert_eq!(
            records[1].tree.get("day_nu").and_then(Value::as_str),
            Some("2")
        );
    }

    #[test]
    fn file_without_format_row() {
        let (_dir, path) = write_rdb("site_no\tflow\ncat-01\t1.5\n");
        let records = read_rdb(&path, &[], None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].tree.get("flow").and_then(Value::as_str),
            Some("1.5")
        );
    }

    #[test]
    fn all_comments_is_format_error() {
        let (_dir, path) = write_rdb("# only\n# comments\n");
        let err = read_rdb(&path, &[], None).unwrap_err();
        assert!(matches!(err, BackendError::Format { .. }));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let (_dir, path) = write_rdb("site_no\tflow\n\ncat-01\t2.0\n\n");
        let records = read_rdb(&path, &[], None).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn short_rows_leave_missing_columns_out() {
        let (_dir, path) = write_rdb("site_no\tflow\tstage\ncat-01\t2.0\n");
        let records = read_rdb(&path, &[], None).unwrap();
        assert_eq!(records[0].tree.get("stage"), None);
    }

    #[test]
    fn format_row_detection() {
        assert!(is_format_row(&["5s", "14n", "3n"]));
        assert!(!is_format_row(&["02146562", "12", "1"]));
        assert!(!is_format_row(&["5s", "flow"]));
        assert!(!is_format_row(&[]));
    }
}
