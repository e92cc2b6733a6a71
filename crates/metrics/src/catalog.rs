//! The metric catalog: names, bounds, ideals, and lookup.

use themis_config::MetricSpec;

use crate::error::MetricError;

/// Every metric Themis can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    PearsonCorrelation,
    NashSutcliffe,
    KlingGupta,
    VolumeError,
    ProbabilityOfDetection,
    FalseAlarmRatio,
    CriticalSuccessIndex,
    FrequencyBias,
    Accuracy,
}

/// All catalog entries, for lookup and listing.
const ALL_KINDS: &[MetricKind] = &[
    MetricKind::PearsonCorrelation,
    MetricKind::NashSutcliffe,
    MetricKind::KlingGupta,
    MetricKind::VolumeError,
    MetricKind::ProbabilityOfDetection,
    MetricKind::FalseAlarmRatio,
    MetricKind::CriticalSuccessIndex,
    MetricKind::FrequencyBias,
    MetricKind::Accuracy,
];

impl MetricKind {
    /// Human-readable metric name.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::PearsonCorrelation => "Pearson Correlation Coefficient",
            MetricKind::NashSutcliffe => "Nash-Sutcliffe Efficiency",
            MetricKind::KlingGupta => "Kling-Gupta Efficiency",
            MetricKind::VolumeError => "Volume Error",
            MetricKind::ProbabilityOfDetection => "Probability of Detection",
            MetricKind::FalseAlarmRatio => "False Alarm Ratio",
            MetricKind::CriticalSuccessIndex => "Critical Success Index",
            MetricKind::FrequencyBias => "Frequency Bias",
            MetricKind::Accuracy => "Accuracy",
        }
    }

    /// Finds a metric by name, tolerating case, whitespace, underscores, and
    /// hyphens ("pearson_correlation coefficient" finds the catalog entry).
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = identifier(name);
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| identifier(kind.name()) == wanted)
    }

    /// Whether the metric scores the at-or-above truth table rather than the
    /// real-valued pairs.
    pub fn is_categorical(self) -> bool {
        matches!(
            self,
            MetricKind::ProbabilityOfDetection
                | MetricKind::FalseAlarmRatio
                | MetricKind::CriticalSuccessIndex
                | MetricKind::FrequencyBias
                | MetricKind::Accuracy
        )
    }

    /// The (lower, upper) bounds considered when scaling the raw value.
    ///
    /// These are scaling bounds, not the statistic's mathematical range: an
    /// efficiency score runs to negative infinity, but anything below zero
    /// scores zero.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            MetricKind::PearsonCorrelation => (-1.0, 1.0),
            MetricKind::NashSutcliffe | MetricKind::KlingGupta => (0.0, 1.0),
            MetricKind::VolumeError => (-1.0, 1.0),
            MetricKind::FrequencyBias => (0.0, 2.0),
            MetricKind::ProbabilityOfDetection
            | MetricKind::FalseAlarmRatio
            | MetricKind::CriticalSuccessIndex
            | MetricKind::Accuracy => (0.0, 1.0),
        }
    }

    /// The raw value deemed perfect.
    pub fn ideal(self) -> f64 {
        match self {
            MetricKind::FalseAlarmRatio => 0.0,
            MetricKind::VolumeError => 0.0,
            MetricKind::FrequencyBias => 1.0,
            _ => 1.0,
        }
    }

    /// A raw value indicating complete failure, when the metric has one.
    pub fn fails_on(self) -> Option<f64> {
        match self {
            MetricKind::ProbabilityOfDetection => Some(0.0),
            _ => None,
        }
    }
}

/// One scheme entry: a catalog metric with its relative weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub kind: MetricKind,
    pub weight: f64,
}

/// Resolves a configured scheme against the catalog.
///
/// # Errors
///
/// Returns [`MetricError::EmptyScheme`] for an empty scheme and
/// [`MetricError::UnknownMetric`] for a name the catalog cannot resolve.
pub fn build_scheme(specs: &[MetricSpec]) -> Result<Vec<Metric>, MetricError> {
    if specs.is_empty() {
        return Err(MetricError::EmptyScheme);
    }
    specs
        .iter()
        .map(|spec| {
            let kind = MetricKind::from_name(&spec.name).ok_or_else(|| {
                MetricError::UnknownMetric {
                    name: spec.name.clone(),
                }
            })?;
            Ok(Metric {
                kind,
                weight: spec.weight,
            })
        })
        .collect()
}

/// Normalizes a metric name for comparison: strips whitespace, underscores,
/// and hyphens, then lowercases.
pub fn identifier(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-' && *c != '\u{2013}')
        .collect::<String>()
        .to_lowercase()
}
