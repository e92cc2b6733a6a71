//! Typed model of the evaluation configuration document.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root evaluation configuration.
///
/// A fully merged document names the evaluation, its observation and
/// prediction datasets, the crosswalks joining their location namespaces,
/// threshold sources, and one metric scheme.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Evaluation name, carried into the result document.
    pub name: String,

    /// Observation-side datasets.
    #[serde(default)]
    pub observations: Vec<DatasetSpec>,

    /// Prediction-side datasets.
    #[serde(default)]
    pub predictions: Vec<DatasetSpec>,

    /// Location identifier mappings (prediction namespace to observation
    /// namespace).
    #[serde(default)]
    pub crosswalks: Vec<CrosswalkSpec>,

    /// Threshold sources, keyed by location once loaded.
    #[serde(default)]
    pub thresholds: Vec<ThresholdSourceSpec>,

    /// The metric scheme combining per-metric scores into an overall score.
    #[serde(default)]
    pub scheme: SchemeSpec,
}

impl EvaluationConfig {
    /// Deserializes a configuration from a merged JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document does not match the
    /// typed model.
    pub fn from_document(document: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(document)?)
    }

    /// Validates that the configuration is structurally complete enough to
    /// drive a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.name.trim().is_empty() {
            problems.push("evaluation name must not be empty".to_string());
        }
        if self.observations.is_empty() {
            problems.push("at least one observation dataset is required".to_string());
        }
        if self.predictions.is_empty() {
            problems.push("at least one prediction dataset is required".to_string());
        }
        if self.scheme.metrics.is_empty() {
            problems.push("the scheme must name at least one metric".to_string());
        }

        for metric in &self.scheme.metrics {
            if metric.weight <= 0.0 || !metric.weight.is_finite() {
                problems.push(format!(
                    "metric '{}' has non-positive weight {}",
                    metric.name, metric.weight
                ));
            }
        }

        for dataset in self.observations.iter().chain(self.predictions.iter()) {
            dataset.collect_problems(&mut problems);
        }

        for source in &self.thresholds {
            if source.definitions.is_empty() {
                problems.push(format!(
                    "threshold source '{}' defines no thresholds",
                    source.name
                ));
            }
            for definition in &source.definitions {
                if definition.weight <= 0.0 || !definition.weight.is_finite() {
                    problems.push(format!(
                        "threshold '{}' in '{}' has non-positive weight {}",
                        definition.name, source.name, definition.weight
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }
}

/// One observation or prediction dataset: a backend plus the selectors and
/// location rule that turn its raw records into located, timestamped rows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetSpec {
    pub name: String,
    pub backend: BackendSpec,
    pub selectors: Vec<ValueSelectorSpec>,
    #[serde(default)]
    pub locations: LocationSpec,
}

impl DatasetSpec {
    fn collect_problems(&self, problems: &mut Vec<String>) {
        if self.selectors.is_empty() {
            problems.push(format!("dataset '{}' has no selectors", self.name));
        }
        if let Some(problem) = self.locations.problem() {
            problems.push(format!("dataset '{}': {problem}", self.name));
        }
    }
}

/// How to obtain raw records for one dataset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSpec {
    #[serde(default)]
    pub kind: BackendKind,
    pub format: BackendFormat,
    /// File path or glob pattern.
    pub address: String,
    /// Tabular columns parsed into timestamps at read time.
    #[serde(default)]
    pub date_fields: Vec<String>,
    /// Optional strftime-style format for `date_fields`; common ISO layouts
    /// are tried when absent.
    #[serde(default)]
    pub date_format: Option<String>,
}

/// Kind of data source. Only files are supported; `service` is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    Service,
}

/// On-disk format of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendFormat {
    Json,
    Csv,
    Rdb,
}

/// Maps raw records to one named value column plus associated fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ValueSelectorSpec {
    pub name: String,
    /// Path expression addressing the value (column name for tabular data).
    pub path: String,
    pub datatype: Datatype,
    #[serde(default)]
    pub associated_fields: Vec<FieldSpec>,
}

/// An associated field extracted alongside a selector's value.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    pub path: String,
    pub datatype: Datatype,
}

/// Declared datatype of an extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Float,
    String,
    Datetime,
    /// Calendar (month, day) key, ignoring year.
    Day,
}

/// How to derive a location identifier per row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocationSpec {
    /// Whether locations must be resolved for this dataset.
    #[serde(default)]
    pub identify: bool,
    #[serde(default)]
    pub from_field: Option<LocationSource>,
    /// Field name read when `from_field` is `value`.
    #[serde(default)]
    pub field: Option<String>,
    /// Regular expression matched against the filename or column name; the
    /// first capture group wins, or the whole match when there are no groups.
    #[serde(default)]
    pub pattern: Option<String>,
}

impl LocationSpec {
    fn problem(&self) -> Option<String> {
        if !self.identify {
            return None;
        }
        match self.from_field {
            None => Some("identify is set but from_field is missing".to_string()),
            Some(LocationSource::Value) if self.field.is_none() => {
                Some("from_field 'value' requires a field name".to_string())
            }
            Some(LocationSource::Filename) | Some(LocationSource::Column)
                if self.pattern.is_none() =>
            {
                Some("filename/column location rules require a pattern".to_string())
            }
            _ => None,
        }
    }
}

/// Where a location pattern or field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Value,
    Filename,
    Column,
}

/// A mapping from prediction-location identifiers to observation-location
/// identifiers, loaded from its own backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrosswalkSpec {
    pub name: String,
    pub backend: BackendSpec,
    /// Path addressing observation-side identifiers.
    pub observation_path: String,
    /// Path addressing prediction-side identifiers, aligned with
    /// `observation_path` by shared wildcard prefix.
    pub prediction_path: String,
}

/// A source of threshold definitions, loaded per evaluation and keyed by
/// location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdSourceSpec {
    pub name: String,
    pub backend: BackendSpec,
    /// Field carrying the location identifier in each threshold record.
    pub location_field: String,
    pub definitions: Vec<ThresholdDefinitionSpec>,
    /// When present, cutoffs vary by calendar day.
    #[serde(default)]
    pub application_rule: Option<DayRuleSpec>,
}

/// One named, weighted cutoff within a threshold source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdDefinitionSpec {
    pub name: String,
    /// Field carrying this threshold's cutoff value in each record.
    pub field: String,
    pub weight: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Maps (month, day) fields of threshold records onto the calendar-day key
/// derived from each observation timestamp.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DayRuleSpec {
    pub month_field: String,
    pub day_field: String,
}

/// The metric scheme: an ordered set of weighted metrics.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemeSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
}

/// One metric with its relative weight.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSpec {
    pub name: String,
    pub weight: f64,
}
