//! # themis-path
//!
//! Generic tree values and the path expressions that address them.
//!
//! Backends parse raw files into [`Value`] trees; selectors address pieces of
//! those trees with [`Path`] expressions such as `locations[*].values[*].value`.
//! A `[*]` wildcard repeats the extraction for every element of an array, so a
//! single path can yield many matches per record (Cartesian expansion across
//! all wildcarded segments).

mod error;
mod expr;
mod value;

pub use error::PathError;
pub use expr::{Match, Path, Segment};
pub use value::Value;
