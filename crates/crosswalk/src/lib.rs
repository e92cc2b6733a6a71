//! # themis-crosswalk
//!
//! Joins the observation and prediction location namespaces. A crosswalk is
//! itself loaded from a backend: two aligned path expressions address the
//! observation-side and prediction-side identifiers in each record, and the
//! resulting pairs build a prediction-to-observation map used during
//! alignment.

mod error;
mod map;

pub use error::CrosswalkError;
pub use map::{CrosswalkMap, load_crosswalk};
