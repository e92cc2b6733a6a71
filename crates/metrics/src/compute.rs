//! Raw metric computations.

use themis_stats::{mean, pearson_correlation, sd, sum_squared_error};

use crate::catalog::MetricKind;

/// Contingency counts for one threshold's at-or-above truth table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TruthTable {
    pub hits: usize,
    pub misses: usize,
    pub false_alarms: usize,
    pub correct_negatives: usize,
}

impl TruthTable {
    /// Tallies (observed, predicted) exceedance pairs.
    pub fn from_pairs(exceedance: &[(bool, bool)]) -> Self {
        let mut table = Self::default();
        for &(observed, predicted) in exceedance {
            match (observed, predicted) {
                (true, true) => table.hits += 1,
                (true, false) => table.misses += 1,
                (false, true) => table.false_alarms += 1,
                (false, false) => table.correct_negatives += 1,
            }
        }
        table
    }

    pub fn total(&self) -> usize {
        self.hits + self.misses + self.false_alarms + self.correct_negatives
    }
}

/// Computes a metric's raw value.
///
/// Continuous metrics read the real-valued `pairs`; categorical metrics read
/// the `exceedance` truth table. Returns `None` when the metric is undefined
/// on the input (too few pairs, zero denominator, empty truth-table cell) —
/// an undefined score is neither perfect nor failing and is excluded from
/// aggregation.
pub fn compute(kind: MetricKind, pairs: &[(f64, f64)], exceedance: &[(bool, bool)]) -> Option<f64> {
    match kind {
        MetricKind::PearsonCorrelation => {
            let (obs, pred) = split(pairs);
            pearson_correlation(&obs, &pred)
        }
        MetricKind::NashSutcliffe => nash_sutcliffe(pairs),
        MetricKind::KlingGupta => kling_gupta(pairs),
        MetricKind::VolumeError => volume_error(pairs),
        MetricKind::ProbabilityOfDetection => {
            let t = TruthTable::from_pairs(exceedance);
            ratio(t.hits, t.hits + t.misses)
        }
        MetricKind::FalseAlarmRatio => {
            let t = TruthTable::from_pairs(exceedance);
            ratio(t.false_alarms, t.hits + t.false_alarms)
        }
        MetricKind::CriticalSuccessIndex => {
            let t = TruthTable::from_pairs(exceedance);
            ratio(t.hits, t.hits + t.misses + t.false_alarms)
        }
        MetricKind::FrequencyBias => {
            let t = TruthTable::from_pairs(exceedance);
            ratio(t.hits + t.false_alarms, t.hits + t.misses)
        }
        MetricKind::Accuracy => {
            let t = TruthTable::from_pairs(exceedance);
            ratio(t.hits + t.correct_negatives, t.total())
        }
    }
}

fn split(pairs: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    pairs.iter().copied().unzip()
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64)
}

/// Nash-Sutcliffe efficiency: `1 - SSE / SST`.
/// Undefined for fewer than 2 pairs or constant observations.
fn nash_sutcliffe(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let (obs, pred) = split(pairs);
    let obs_mean = mean(&obs);
    let total: f64 = obs.iter().map(|&o| (o - obs_mean) * (o - obs_mean)).sum();
    if total == 0.0 {
        return None;
    }
    Some(1.0 - sum_squared_error(&obs, &pred) / total)
}

/// Kling-Gupta efficiency: `1 - sqrt((r-1)^2 + (alpha-1)^2 + (beta-1)^2)`
/// with `alpha = sd_pred/sd_obs` and `beta = mean_pred/mean_obs`.
/// Undefined when correlation is undefined or either ratio has a zero
/// denominator.
fn kling_gupta(pairs: &[(f64, f64)]) -> Option<f64> {
    let (obs, pred) = split(pairs);
    let r = pearson_correlation(&obs, &pred)?;
    let obs_sd = sd(&obs);
    let obs_mean = mean(&obs);
    if obs_sd == 0.0 || obs_mean == 0.0 {
        return None;
    }
    let alpha = sd(&pred) / obs_sd;
    let beta = mean(&pred) / obs_mean;
    let distance =
        ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt();
    Some(1.0 - distance)
}

/// Relative volume error: `(sum_pred - sum_obs) / sum_obs`.
/// Undefined when the observed volume is zero.
fn volume_error(pairs: &[(f64, f64)]) -> Option<f64> {
    let obs_total: f64 = pairs.iter().map(|(o, _)| o).sum();
    let pred_total: f64 = pairs.iter().map(|(_, p)| p).sum();
    if obs_total == 0.0 {
        return None;
    }
    Some((pred_total - obs_total) / obs_total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EXCEEDANCE: &[(bool, bool)] = &[
        (true, true),
        (true, true),
        (true, false),
        (false, true),
        (false, false),
        (false, false),
    ];

    #[test]
    fn truth_table_counts() {
        let t = TruthTable::from_pairs(EXCEEDANCE);
        assert_eq!(t.hits, 2);
        assert_eq!(t.misses, 1);
        assert_eq!(t.false_alarms, 1);
        assert_eq!(t.correct_negatives, 2);
        assert_eq!(t.total(), 6);
    }

    #[test]
    fn probability_of_detection() {
        let v = compute(MetricKind::ProbabilityOfDetection, &[], EXCEEDANCE).unwrap();
        assert_relative_eq!(v, 2.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn false_alarm_ratio() {
        let v = compute(MetricKind::FalseAlarmRatio, &[], EXCEEDANCE).unwrap();
        assert_relative_eq!(v, 1.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn critical_success_index() {
        let v = compute(MetricKind::CriticalSuccessIndex, &[], EXCEEDANCE).unwrap();
        assert_relative_eq!(v, 2.0 / 4.0, epsilon = 1e-9);
    }

    #[test]
    fn frequency_bias() {
        let v = compute(MetricKind::FrequencyBias, &[], EXCEEDANCE).unwrap();
        assert_relative_eq!(v, 3.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn accuracy() {
        let v = compute(MetricKind::Accuracy, &[], EXCEEDANCE).unwrap();
        assert_relative_eq!(v, 4.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn categorical_undefined_on_empty_cells() {
        // Nothing ever exceeds: no hits or misses, so POD is undefined.
        let quiet = [(false, false), (false, false)];
        assert!(compute(MetricKind::ProbabilityOfDetection, &[], &quiet).is_none());
        assert!(compute(MetricKind::FalseAlarmRatio, &[], &quiet).is_none());
        // Accuracy is still defined (all correct negatives).
        assert_relative_eq!(
            compute(MetricKind::Accuracy, &[], &quiet).unwrap(),
            1.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn pearson_on_pairs() {
        let pairs = [(10.0, 12.0), (20.0, 18.0)];
        let v = compute(MetricKind::PearsonCorrelation, &pairs, &[]).unwrap();
        assert_relative_eq!(v, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn nash_sutcliffe_perfect() {
        let pairs = [(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        assert_relative_eq!(nash_sutcliffe(&pairs).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn nash_sutcliffe_known_value() {
        let pairs = [(1.0, 2.0), (2.0, 2.0), (3.0, 2.0)];
        // SSE = 1 + 0 + 1 = 2; SST = 1 + 0 + 1 = 2; NSE = 0.
        assert_relative_eq!(nash_sutcliffe(&pairs).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn nash_sutcliffe_undefined_on_constant_obs() {
        let pairs = [(2.0, 1.0), (2.0, 3.0)];
        assert!(nash_sutcliffe(&pairs).is_none());
    }

    #[test]
    fn kling_gupta_perfect() {
        let pairs = [(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        assert_relative_eq!(kling_gupta(&pairs).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn kling_gupta_undefined_on_zero_mean() {
        let pairs = [(-1.0, 1.0), (1.0, 2.0)];
        assert!(kling_gupta(&pairs).is_none());
    }

    #[test]
    fn volume_error_over_and_under() {
        let pairs = [(10.0, 12.0), (20.0, 18.0)];
        assert_relative_eq!(volume_error(&pairs).unwrap(), 0.0, epsilon = 1e-9);

        let pairs = [(10.0, 11.0), (10.0, 11.0)];
        assert_relative_eq!(volume_error(&pairs).unwrap(), 0.1, epsilon = 1e-9);

        assert!(volume_error(&[(0.0, 1.0)]).is_none());
    }
}
