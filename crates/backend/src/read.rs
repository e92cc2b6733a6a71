//! Backend read orchestration.

use themis_config::{BackendFormat, BackendSpec};
use tracing::debug;

use crate::address::resolve_address;
use crate::csv_read::read_csv;
use crate::error::BackendError;
use crate::json_read::read_json;
use crate::rdb_read::read_rdb;
use crate::record::RawRecord;

/// A finite, consuming sequence of raw records.
///
/// Reading the same backend again requires calling [`read_backend`] again;
/// the sequence itself is not restartable.
#[derive(Debug)]
pub struct Records {
    inner: std::vec::IntoIter<RawRecord>,
}

impl Iterator for Records {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Records {}

/// Reads every file a backend's address resolves to, in sorted path order.
///
/// JSON files yield one record per document; CSV and RDB files yield one
/// record per data row.
///
/// # Errors
///
/// Returns [`BackendError::Unavailable`] when the address resolves to no
/// files, and [`BackendError::Format`] / [`BackendError::Io`] when a resolved
/// file cannot be parsed or read.
pub fn read_backend(spec: &BackendSpec) -> Result<Records, BackendError> {
    let paths = resolve_address(&spec.address)?;
    let date_format = spec.date_format.as_deref();

    let mut records = Vec::new();
    for path in &paths {
        match spec.format {
            BackendFormat::Json => records.push(read_json(path)?),
            BackendFormat::Csv => {
                records.extend(read_csv(path, &spec.date_fields, date_format)?)
            }
            BackendFormat::Rdb => {
                records.extend(read_rdb(path, &spec.date_fields, date_format)?)
            }
        }
    }

    debug!(
        address = %spec.address,
        n_files = paths.len(),
        n_records = records.len(),
        "backend read"
    );

    Ok(Records {
        inner: records.into_iter(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn csv_spec(address: String) -> BackendSpec {
        BackendSpec {
            kind: themis_config::BackendKind::File,
            format: BackendFormat::Csv,
            address,
            date_fields: vec![],
            date_format: None,
        }
    }

    #[test]
    fn reads_multiple_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "site\ncat-02\n").unwrap();
        fs::write(dir.path().join("a.csv"), "site\ncat-01\n").unwrap();

        let spec = csv_spec(dir.path().join("*.csv").to_string_lossy().to_string());
        let records: Vec<_> = read_backend(&spec).unwrap().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "a.csv");
        assert_eq!(records[1].source, "b.csv");
    }

    #[test]
    fn reload_yields_identical_sequence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("obs.csv"), "site,flow\ncat-01,1.0\ncat-02,2.0\n").unwrap();

        let spec = csv_spec(dir.path().join("obs.csv").to_string_lossy().to_string());
        let first: Vec<_> = read_backend(&spec).unwrap().collect();
        let second: Vec<_> = read_backend(&spec).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn unavailable_address() {
        let spec = csv_spec("/no/such/dir/*.csv".to_string());
        assert!(matches!(
            read_backend(&spec).unwrap_err(),
            BackendError::Unavailable { .. }
        ));
    }

    #[test]
    fn exact_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("obs.csv"), "site\ncat-01\ncat-02\ncat-03\n").unwrap();

        let spec = csv_spec(dir.path().join("obs.csv").to_string_lossy().to_string());
        let records = read_backend(&spec).unwrap();
        assert_eq!(records.len(), 3);
    }
}
