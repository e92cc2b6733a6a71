//! Run phases.

/// The strictly sequential phases of an evaluation run.
///
/// Transitions never backtrack: a run moves `Configured → Loading → Aligning
/// → Scoring → Complete`, or stops at `Failed` from whichever phase hit an
/// unrecoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Configured,
    Loading,
    Aligning,
    Scoring,
    Complete,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Configured => "configured",
            Phase::Loading => "loading",
            Phase::Aligning => "aligning",
            Phase::Scoring => "scoring",
            Phase::Complete => "complete",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}
