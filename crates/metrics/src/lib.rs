//! # themis-metrics
//!
//! The metric catalog and weighted scoring scheme.
//!
//! Metrics come in two families: continuous goodness-of-fit statistics
//! computed on aligned (observation, prediction) value pairs, and categorical
//! skill scores computed on the at-or-above-threshold truth table. Each raw
//! metric value is scaled linearly toward the metric's ideal, weighted by its
//! threshold, rolled up into a per-metric performance, and finally combined
//! across metrics by scheme weight into one overall score per location.

mod catalog;
mod compute;
mod error;
mod scale;
mod score;

pub use catalog::{Metric, MetricKind, build_scheme, identifier};
pub use compute::{TruthTable, compute};
pub use error::MetricError;
pub use scale::scale_value;
pub use score::{
    LocationScores, MetricScores, ThresholdContext, ThresholdScore, score_location,
};
