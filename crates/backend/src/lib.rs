//! # themis-backend
//!
//! Read raw evaluation data from file backends (JSON, CSV, RDB) and turn it
//! into located, typed rows. Bridges on-disk formats into the row-oriented
//! representation the rest of Themis consumes: a backend yields raw records,
//! value selectors extract and coerce named columns, and location rules
//! attach a location identifier to every surviving row.

mod address;
mod csv_read;
mod dataset;
mod day;
mod error;
mod json_read;
mod location;
mod rdb_read;
mod read;
mod record;
mod selector;

pub use dataset::{LoadedDataset, load_dataset};
pub use day::Day;
pub use error::BackendError;
pub use location::resolve_locations;
pub use read::{Records, read_backend};
pub use record::{FieldValue, RawRecord, SelectedRow};
pub use selector::{CompiledSelector, Selection, apply_selectors, compile_selectors};
