//! The structured result document.

use std::collections::BTreeMap;

use serde::Serialize;
use themis_metrics::MetricScores;

use crate::diagnostics::Diagnostic;
use crate::error::EvaluateError;
use crate::phase::Phase;

/// Top-level evaluation result, serialized for reporting layers.
#[derive(Debug, Serialize)]
pub struct EvaluationOutput {
    /// Evaluation name from the configuration.
    pub name: String,
    /// Terminal phase; always `complete` on the success path.
    pub phase: Phase,
    /// Run summary.
    pub summary: Summary,
    /// Per-location results, keyed by observation location.
    pub locations: BTreeMap<String, LocationEntry>,
    /// Every recorded diagnostic, in order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Counts over the whole run.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub n_prediction_locations: usize,
    pub n_scored: usize,
    pub n_excluded: usize,
    /// Mean overall score across scored locations, when any scored.
    pub mean_overall: Option<f64>,
}

/// One location's scores and classifications.
#[derive(Debug, Serialize)]
pub struct LocationEntry {
    pub observation_location: String,
    pub prediction_location: String,
    /// Aligned (observation, prediction) pairs scored.
    pub n_pairs: usize,
    /// Overall weighted score in [0, 1].
    pub overall: Option<f64>,
    /// Whether any metric hit its failure value.
    pub failed: bool,
    /// Per-threshold classification counts.
    pub thresholds: Vec<ThresholdSummary>,
    /// Per-metric scores.
    pub metrics: Vec<MetricScores>,
}

/// Classification counts for one threshold at one location.
#[derive(Debug, Serialize)]
pub struct ThresholdSummary {
    pub name: String,
    pub weight: f64,
    /// Pairs on days where this threshold's cutoff resolved.
    pub n_observations: usize,
    pub n_observed_at_or_above: usize,
    pub n_predicted_at_or_above: usize,
}

/// Serializes an evaluation result to pretty JSON.
///
/// # Errors
///
/// Returns [`EvaluateError::Serialization`] if JSON serialization fails.
pub fn to_json(output: &EvaluationOutput) -> Result<String, EvaluateError> {
    serde_json::to_string_pretty(output).map_err(|e| EvaluateError::Serialization {
        reason: e.to_string(),
    })
}
