//! Themis evaluation: load configured datasets, align observations against
//! predictions, classify by threshold, and score with the metric scheme.
//!
//! A run walks a strict phase sequence (`Configured → Loading → Aligning →
//! Scoring → Complete | Failed`). Dataset, crosswalk, and threshold loads
//! have no data dependency on one another and run in parallel; scoring fans
//! out per location. Recoverable conditions (dropped rows, alignment gaps,
//! missing thresholds) accumulate as diagnostics; a dataset that fails to
//! load outright fails the run.

mod align;
mod diagnostics;
mod error;
mod output;
mod phase;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

use themis_backend::{BackendError, Day, LoadedDataset, load_dataset};
use themis_config::{CrosswalkSpec, DatasetSpec, EvaluationConfig, ThresholdSourceSpec};
use themis_crosswalk::{CrosswalkMap, load_crosswalk};
use themis_metrics::{Metric, ThresholdContext, build_scheme, score_location};
use themis_thresholds::{ThresholdSet, all_data_threshold, classify};

pub use diagnostics::{Diagnostic, Severity};
pub use error::{EvaluateError, RunFailure};
pub use output::{EvaluationOutput, LocationEntry, Summary, ThresholdSummary, to_json};
pub use phase::Phase;

/// Cooperative cancellation flag, checked at phase boundaries and before each
/// per-location scoring unit.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stop at its next check point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// One prediction location aligned against its observation series.
struct AlignedUnit {
    observation_location: String,
    prediction_location: String,
    pairs: Vec<(DateTime<Utc>, f64, f64)>,
}

/// Runs one evaluation.
///
/// # Errors
///
/// Returns [`RunFailure`] carrying the terminal error and every diagnostic
/// accumulated up to the stop. Unrecoverable conditions are invalid
/// configuration, a dataset/crosswalk/threshold load failure, zero usable
/// rows on either side, and cancellation.
pub fn evaluate(
    config: &EvaluationConfig,
    cancel: &CancelToken,
) -> Result<EvaluationOutput, RunFailure> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // -- Configured ---------------------------------------------------------

    if let Err(e) = config.validate() {
        return Err(fail(Phase::Configured, e.into(), &mut diagnostics));
    }
    let scheme = match build_scheme(&config.scheme.metrics) {
        Ok(scheme) => scheme,
        Err(e) => return Err(fail(Phase::Configured, e.into(), &mut diagnostics)),
    };

    info!(evaluation = config.name, "evaluation configured");

    // -- Loading ------------------------------------------------------------

    if cancel.is_cancelled() {
        return Err(cancelled(Phase::Loading, &mut diagnostics));
    }

    let observations = match load_datasets(&config.observations, &mut diagnostics) {
        Ok(datasets) => datasets,
        Err(e) => return Err(fail(Phase::Loading, e, &mut diagnostics)),
    };
    let predictions = match load_datasets(&config.predictions, &mut diagnostics) {
        Ok(datasets) => datasets,
        Err(e) => return Err(fail(Phase::Loading, e, &mut diagnostics)),
    };
    let crosswalk = match load_crosswalks(&config.crosswalks) {
        Ok(crosswalk) => crosswalk,
        Err(e) => return Err(fail(Phase::Loading, e, &mut diagnostics)),
    };
    let thresholds = match load_thresholds(&config.thresholds) {
        Ok(thresholds) => thresholds,
        Err(e) => return Err(fail(Phase::Loading, e, &mut diagnostics)),
    };

    let (observation_series, obs_gaps) = align::build_series(&observations);
    let (prediction_series, pred_gaps) = align::build_series(&predictions);

    for (side, gaps) in [("observation", &obs_gaps), ("prediction", &pred_gaps)] {
        if gaps.untimed > 0 || gaps.non_numeric > 0 {
            diagnostics.push(Diagnostic::run(
                Phase::Loading,
                Severity::Warning,
                format!(
                    "{side} rows skipped: {} without timestamps, {} non-numeric",
                    gaps.untimed, gaps.non_numeric
                ),
            ));
        }
    }

    if observation_series.is_empty() {
        let error = EvaluateError::NoUsableData {
            side: "observation".to_string(),
        };
        return Err(fail(Phase::Loading, error, &mut diagnostics));
    }
    if prediction_series.is_empty() {
        let error = EvaluateError::NoUsableData {
            side: "prediction".to_string(),
        };
        return Err(fail(Phase::Loading, error, &mut diagnostics));
    }

    info!(
        n_observation_locations = observation_series.len(),
        n_prediction_locations = prediction_series.len(),
        n_crosswalk_pairs = crosswalk.len(),
        n_threshold_locations = thresholds.len(),
        "loading complete"
    );

    // -- Aligning -----------------------------------------------------------

    if cancel.is_cancelled() {
        return Err(cancelled(Phase::Aligning, &mut diagnostics));
    }

    let mut aligned: Vec<AlignedUnit> = Vec::new();
    let mut excluded = 0usize;
    let mut used_observation_locations: BTreeSet<String> = BTreeSet::new();

    for (prediction_location, prediction) in &prediction_series {
        // With no crosswalks configured the namespaces are taken as shared.
        let observation_location = if crosswalk.is_empty() {
            Some(prediction_location.as_str())
        } else {
            crosswalk.resolve(prediction_location)
        };

        let Some(observation_location) = observation_location else {
            diagnostics.push(Diagnostic::location(
                Phase::Aligning,
                Severity::Warning,
                prediction_location,
                "prediction location is not mapped by any crosswalk",
            ));
            excluded += 1;
            continue;
        };

        let Some(observation) = observation_series.get(observation_location) else {
            diagnostics.push(Diagnostic::location(
                Phase::Aligning,
                Severity::Warning,
                prediction_location,
                format!("no observation series for mapped location '{observation_location}'"),
            ));
            excluded += 1;
            continue;
        };

        if !used_observation_locations.insert(observation_location.to_string()) {
            diagnostics.push(Diagnostic::location(
                Phase::Aligning,
                Severity::Warning,
                prediction_location,
                format!(
                    "observation location '{observation_location}' already paired; keeping first"
                ),
            ));
            excluded += 1;
            continue;
        }

        let pairs = align::align(observation, prediction);
        if pairs.is_empty() {
            diagnostics.push(Diagnostic::location(
                Phase::Aligning,
                Severity::Warning,
                prediction_location,
                format!("no overlapping timestamps with observation '{observation_location}'"),
            ));
            excluded += 1;
            continue;
        }

        debug!(
            prediction = prediction_location,
            observation = observation_location,
            n_pairs = pairs.len(),
            "location aligned"
        );
        aligned.push(AlignedUnit {
            observation_location: observation_location.to_string(),
            prediction_location: prediction_location.clone(),
            pairs,
        });
    }

    // -- Scoring ------------------------------------------------------------

    if cancel.is_cancelled() {
        return Err(cancelled(Phase::Scoring, &mut diagnostics));
    }

    let thresholds_configured = !config.thresholds.is_empty();
    let scored: Vec<Option<(LocationEntry, Vec<Diagnostic>)>> = aligned
        .par_iter()
        .map(|unit| {
            if cancel.is_cancelled() {
                return None;
            }
            Some(score_unit(unit, &scheme, &thresholds, thresholds_configured))
        })
        .collect();

    if cancel.is_cancelled() {
        return Err(cancelled(Phase::Scoring, &mut diagnostics));
    }

    let mut locations = BTreeMap::new();
    for (entry, unit_diagnostics) in scored.into_iter().flatten() {
        diagnostics.extend(unit_diagnostics);
        locations.insert(entry.observation_location.clone(), entry);
    }

    // -- Complete -----------------------------------------------------------

    let overalls: Vec<f64> = locations.values().filter_map(|entry| entry.overall).collect();
    let mean_overall = if overalls.is_empty() {
        None
    } else {
        Some(overalls.iter().sum::<f64>() / overalls.len() as f64)
    };

    info!(
        n_scored = locations.len(),
        n_excluded = excluded,
        mean_overall = ?mean_overall,
        "evaluation complete"
    );

    Ok(EvaluationOutput {
        name: config.name.clone(),
        phase: Phase::Complete,
        summary: Summary {
            n_prediction_locations: prediction_series.len(),
            n_scored: locations.len(),
            n_excluded: excluded,
            mean_overall,
        },
        locations,
        diagnostics,
    })
}

fn fail(phase: Phase, error: EvaluateError, diagnostics: &mut Vec<Diagnostic>) -> RunFailure {
    RunFailure::new(phase, error, std::mem::take(diagnostics))
}

fn cancelled(phase: Phase, diagnostics: &mut Vec<Diagnostic>) -> RunFailure {
    diagnostics.push(Diagnostic::run(phase, Severity::Info, "cancellation requested"));
    fail(phase, EvaluateError::Cancelled { phase }, diagnostics)
}

/// Loads one side's datasets in parallel, recording drop counts.
fn load_datasets(
    specs: &[DatasetSpec],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<LoadedDataset>, EvaluateError> {
    let results: Vec<Result<LoadedDataset, BackendError>> =
        specs.par_iter().map(load_dataset).collect();

    let mut datasets = Vec::with_capacity(specs.len());
    for (spec, result) in specs.iter().zip(results) {
        let dataset = result.map_err(|source| EvaluateError::DatasetLoad {
            dataset: spec.name.clone(),
            source,
        })?;
        if dataset.rows_dropped > 0 {
            diagnostics.push(Diagnostic::dataset(
                Phase::Loading,
                Severity::Warning,
                &dataset.name,
                format!("{} row(s) dropped during selection", dataset.rows_dropped),
            ));
        }
        if dataset.unresolved_locations > 0 {
            diagnostics.push(Diagnostic::dataset(
                Phase::Loading,
                Severity::Warning,
                &dataset.name,
                format!(
                    "{} row(s) excluded with unresolved locations",
                    dataset.unresolved_locations
                ),
            ));
        }
        datasets.push(dataset);
    }
    Ok(datasets)
}

/// Loads and merges every crosswalk; earlier crosswalks win on conflict.
fn load_crosswalks(specs: &[CrosswalkSpec]) -> Result<CrosswalkMap, EvaluateError> {
    let results: Vec<_> = specs.par_iter().map(load_crosswalk).collect();

    let mut merged = CrosswalkMap::default();
    for (spec, result) in specs.iter().zip(results) {
        let crosswalk = result.map_err(|source| EvaluateError::Crosswalk {
            name: spec.name.clone(),
            source,
        })?;
        for (prediction, observation) in crosswalk.pairs() {
            merged.insert_first_wins(prediction.to_string(), observation.to_string());
        }
    }
    Ok(merged)
}

/// Loads and merges every threshold source.
fn load_thresholds(specs: &[ThresholdSourceSpec]) -> Result<ThresholdSet, EvaluateError> {
    let results: Vec<_> = specs.par_iter().map(ThresholdSet::load).collect();

    let mut merged = ThresholdSet::default();
    for (spec, result) in specs.iter().zip(results) {
        let set = result.map_err(|source| EvaluateError::Thresholds {
            name: spec.name.clone(),
            source,
        })?;
        merged.absorb(set);
    }
    Ok(merged)
}

/// Scores one aligned location.
fn score_unit(
    unit: &AlignedUnit,
    scheme: &[Metric],
    thresholds: &ThresholdSet,
    thresholds_configured: bool,
) -> (LocationEntry, Vec<Diagnostic>) {
    let mut unit_diagnostics = Vec::new();

    let all_pairs: Vec<(f64, f64)> = unit.pairs.iter().map(|(_, o, p)| (*o, *p)).collect();
    let all_data = all_data_threshold();
    let mut contexts = vec![ThresholdContext {
        name: all_data.name,
        weight: all_data.weight,
        all_data: true,
        pairs: all_pairs,
        exceedance: Vec::new(),
    }];
    let mut summaries = Vec::new();

    match thresholds.get(&unit.observation_location) {
        Some(location_thresholds) => {
            // Classify every pair against the thresholds that resolve on its
            // calendar day, accumulating one context per threshold.
            #[derive(Default)]
            struct Accum {
                weight: f64,
                pairs: Vec<(f64, f64)>,
                exceedance: Vec<(bool, bool)>,
                observed_above: usize,
                predicted_above: usize,
            }
            let mut accums: BTreeMap<String, Accum> = BTreeMap::new();

            for (timestamp, observed, predicted) in &unit.pairs {
                let resolved = location_thresholds.resolve(Day::from_datetime(timestamp));
                if resolved.is_empty() {
                    continue;
                }
                let observed_class = classify(*observed, &resolved);
                let predicted_class = classify(*predicted, &resolved);

                for (om, pm) in observed_class
                    .memberships
                    .iter()
                    .zip(predicted_class.memberships.iter())
                {
                    let accum = accums.entry(om.name.clone()).or_default();
                    accum.weight = om.weight;
                    accum.exceedance.push((om.at_or_above, pm.at_or_above));
                    if om.at_or_above {
                        accum.pairs.push((*observed, *predicted));
                        accum.observed_above += 1;
                    }
                    if pm.at_or_above {
                        accum.predicted_above += 1;
                    }
                }
            }

            let mut ordered: Vec<(String, Accum)> = accums.into_iter().collect();
            ordered.sort_by(|a, b| {
                b.1.weight
                    .partial_cmp(&a.1.weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });

            for (name, accum) in ordered {
                summaries.push(ThresholdSummary {
                    name: name.clone(),
                    weight: accum.weight,
                    n_observations: accum.exceedance.len(),
                    n_observed_at_or_above: accum.observed_above,
                    n_predicted_at_or_above: accum.predicted_above,
                });
                contexts.push(ThresholdContext {
                    name,
                    weight: accum.weight,
                    all_data: false,
                    pairs: accum.pairs,
                    exceedance: accum.exceedance,
                });
            }
        }
        None if thresholds_configured => {
            unit_diagnostics.push(Diagnostic::location(
                Phase::Scoring,
                Severity::Warning,
                &unit.observation_location,
                "no threshold entry for location; scored without categorical metrics",
            ));
        }
        None => {}
    }

    let scores = score_location(scheme, &contexts);
    let entry = LocationEntry {
        observation_location: unit.observation_location.clone(),
        prediction_location: unit.prediction_location.clone(),
        n_pairs: unit.pairs.len(),
        overall: scores.overall(),
        failed: scores.failed(),
        thresholds: summaries,
        metrics: scores.metrics,
    };
    (entry, unit_diagnostics)
}
