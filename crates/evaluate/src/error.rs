//! Evaluation error types.

use themis_backend::BackendError;
use themis_config::ConfigError;
use themis_crosswalk::CrosswalkError;
use themis_metrics::MetricError;
use themis_thresholds::ThresholdError;

use crate::diagnostics::Diagnostic;
use crate::phase::Phase;

/// Unrecoverable errors that move a run to `Failed`.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// The configuration failed structural validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The scheme could not be resolved against the metric catalog.
    #[error("scheme error: {0}")]
    Scheme(#[from] MetricError),

    /// A declared dataset failed to load. An evaluation missing a whole
    /// dataset has no well-defined partial result.
    #[error("dataset '{dataset}' failed to load: {source}")]
    DatasetLoad {
        dataset: String,
        #[source]
        source: BackendError,
    },

    /// A declared crosswalk failed to load.
    #[error("crosswalk '{name}' failed to load: {source}")]
    Crosswalk {
        name: String,
        #[source]
        source: CrosswalkError,
    },

    /// A declared threshold source failed to load.
    #[error("threshold source '{name}' failed to load: {source}")]
    Thresholds {
        name: String,
        #[source]
        source: ThresholdError,
    },

    /// No usable rows survived loading on one side.
    #[error("no usable {side} rows were loaded")]
    NoUsableData { side: String },

    /// The run was cancelled.
    #[error("evaluation cancelled during {phase}")]
    Cancelled { phase: Phase },

    /// The result document could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// A failed run: the error that stopped it plus every diagnostic accumulated
/// before the stop.
#[derive(Debug, thiserror::Error)]
#[error("evaluation failed during {phase}: {error}")]
pub struct RunFailure {
    pub phase: Phase,
    pub error: EvaluateError,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunFailure {
    pub(crate) fn new(phase: Phase, error: EvaluateError, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            phase,
            error,
            diagnostics,
        }
    }
}
