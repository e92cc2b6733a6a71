//! The diagnostic log accumulated across a run.

use serde::Serialize;

use crate::phase::Phase;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; nothing was excluded.
    Info,
    /// Data was dropped or a location was excluded from results.
    Warning,
}

/// One recorded condition: a dropped row count, an excluded location, a
/// missing threshold. Exclusions are never silent — every location absent
/// from the result mapping has a diagnostic naming the reason.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    pub message: String,
}

impl Diagnostic {
    /// A dataset-scoped diagnostic.
    pub fn dataset(
        phase: Phase,
        severity: Severity,
        dataset: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            severity,
            location: None,
            dataset: Some(dataset.to_string()),
            message: message.into(),
        }
    }

    /// A location-scoped diagnostic.
    pub fn location(
        phase: Phase,
        severity: Severity,
        location: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            severity,
            location: Some(location.to_string()),
            dataset: None,
            message: message.into(),
        }
    }

    /// A run-scoped diagnostic.
    pub fn run(phase: Phase, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            phase,
            severity,
            location: None,
            dataset: None,
            message: message.into(),
        }
    }
}
