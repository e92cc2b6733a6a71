//! Dataset loading: backend read + selection + location resolution.

use themis_config::DatasetSpec;
use tracing::info;

use crate::error::BackendError;
use crate::location::resolve_locations;
use crate::read::read_backend;
use crate::record::SelectedRow;
use crate::selector::{apply_selectors, compile_selectors};

/// A fully loaded dataset, with drop accounting for the diagnostic log.
#[derive(Debug)]
pub struct LoadedDataset {
    /// Dataset name from the configuration.
    pub name: String,
    /// Located, typed rows.
    pub rows: Vec<SelectedRow>,
    /// Raw records read from the backend.
    pub records_read: usize,
    /// Rows dropped during selection (missing paths, bad values).
    pub rows_dropped: usize,
    /// Rows excluded because no location resolved while `identify` was set.
    pub unresolved_locations: usize,
}

/// Loads one dataset end to end.
///
/// # Errors
///
/// Returns [`BackendError`] when the backend is unavailable or malformed,
/// when a path or pattern does not compile, or when every row drops
/// ([`BackendError::EmptySelection`]).
pub fn load_dataset(spec: &DatasetSpec) -> Result<LoadedDataset, BackendError> {
    let records: Vec<_> = read_backend(&spec.backend)?.collect();
    let records_read = records.len();

    let selectors = compile_selectors(&spec.selectors)?;
    let mut selection = apply_selectors(&records, &selectors);

    let unresolved = resolve_locations(&mut selection.rows, &spec.locations)?;
    let mut unresolved_locations = 0usize;
    if spec.locations.identify && unresolved > 0 {
        selection.rows.retain(|row| row.location.is_some());
        unresolved_locations = unresolved;
    }

    if selection.rows.is_empty() {
        return Err(BackendError::EmptySelection {
            dataset: spec.name.clone(),
        });
    }

    info!(
        dataset = spec.name,
        n_records = records_read,
        n_rows = selection.rows.len(),
        n_dropped = selection.dropped,
        n_unresolved = unresolved_locations,
        "dataset loaded"
    );

    Ok(LoadedDataset {
        name: spec.name.clone(),
        rows: selection.rows,
        records_read,
        rows_dropped: selection.dropped,
        unresolved_locations,
    })
}
