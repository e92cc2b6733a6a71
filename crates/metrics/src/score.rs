//! Weighted scoring: thresholds, metrics, and the per-location rollup.

use serde::Serialize;

use crate::catalog::Metric;
use crate::compute::compute;
use crate::scale::scale_value;

/// Two numbers within this distance count as equal when checking failure
/// values.
const EPSILON: f64 = 0.0001;

/// One threshold's view of a location's aligned data: the value pairs that
/// meet the threshold and the full at-or-above truth table.
#[derive(Debug, Clone)]
pub struct ThresholdContext {
    pub name: String,
    pub weight: f64,
    /// True for the built-in all-data threshold, which carries no truth table
    /// and is skipped by categorical metrics.
    pub all_data: bool,
    /// (observation, prediction) pairs where the observation meets the
    /// threshold (every pair for the all-data threshold).
    pub pairs: Vec<(f64, f64)>,
    /// (observation at-or-above, prediction at-or-above) for every aligned
    /// pair.
    pub exceedance: Vec<(bool, bool)>,
}

/// One metric's score against one threshold.
#[derive(Debug, Clone, Serialize)]
pub struct ThresholdScore {
    pub threshold: String,
    pub threshold_weight: f64,
    /// Raw metric value; absent when the metric was undefined on this input.
    pub value: Option<f64>,
    /// Scaled value times threshold weight; absent when `value` is.
    pub scaled: Option<f64>,
    pub sample_size: usize,
    /// Whether the raw value matched the metric's failure value.
    pub failed: bool,
}

/// All of one metric's threshold scores at a location.
#[derive(Debug, Clone, Serialize)]
pub struct MetricScores {
    pub metric: String,
    pub weight: f64,
    pub scores: Vec<ThresholdScore>,
}

impl MetricScores {
    /// The metric's performance in [0, 1]: the sum of scaled scores over the
    /// sum of threshold weights, counting only defined scores with data.
    ///
    /// `None` when no threshold produced a defined score — an absent
    /// performance is excluded from the location rollup rather than counted
    /// as zero.
    pub fn performance(&self) -> Option<f64> {
        let valid: Vec<&ThresholdScore> = self
            .scores
            .iter()
            .filter(|s| s.sample_size > 0 && s.scaled.is_some())
            .collect();
        if valid.is_empty() {
            return None;
        }
        let total: f64 = valid.iter().filter_map(|s| s.scaled).sum();
        let max_possible: f64 = valid.iter().map(|s| s.threshold_weight).sum();
        if max_possible == 0.0 {
            return None;
        }
        Some(total / max_possible)
    }

    /// Whether any threshold score hit the metric's failure value.
    pub fn failed(&self) -> bool {
        self.scores.iter().any(|s| s.failed)
    }
}

/// Every metric's scores at one location.
#[derive(Debug, Clone, Serialize)]
pub struct LocationScores {
    pub metrics: Vec<MetricScores>,
}

impl LocationScores {
    /// The overall weighted score in [0, 1]: the metric-weight-weighted mean
    /// of per-metric performances, over metrics that produced one.
    pub fn overall(&self) -> Option<f64> {
        let mut total = 0.0;
        let mut weights = 0.0;
        for scores in &self.metrics {
            if let Some(performance) = scores.performance() {
                total += performance * scores.weight;
                weights += scores.weight;
            }
        }
        if weights == 0.0 {
            None
        } else {
            Some(total / weights)
        }
    }

    /// Whether any metric failed outright.
    pub fn failed(&self) -> bool {
        self.metrics.iter().any(MetricScores::failed)
    }
}

/// Scores one location's aligned data against a metric scheme.
///
/// Continuous metrics run against every context, including the built-in
/// all-data threshold; categorical metrics run against configured thresholds
/// only, since the all-data context has no truth table.
pub fn score_location(metrics: &[Metric], contexts: &[ThresholdContext]) -> LocationScores {
    let scored = metrics
        .iter()
        .map(|metric| {
            let scores = contexts
                .iter()
                .filter(|context| !(metric.kind.is_categorical() && context.all_data))
                .map(|context| score_threshold(metric, context))
                .collect();
            MetricScores {
                metric: metric.kind.name().to_string(),
                weight: metric.weight,
                scores,
            }
        })
        .collect();

    LocationScores { metrics: scored }
}

fn score_threshold(metric: &Metric, context: &ThresholdContext) -> ThresholdScore {
    let sample_size = if metric.kind.is_categorical() {
        context.exceedance.len()
    } else {
        context.pairs.len()
    };

    let value = compute(metric.kind, &context.pairs, &context.exceedance)
        .filter(|v| v.is_finite());

    let scaled = value.map(|v| scale_value(metric.kind, v) * context.weight);

    let failed = match (metric.kind.fails_on(), value) {
        (Some(failure), Some(value)) => (value - failure).abs() < EPSILON,
        _ => false,
    };

    ThresholdScore {
        threshold: context.name.clone(),
        threshold_weight: context.weight,
        value,
        scaled,
        sample_size,
        failed,
    }
}
