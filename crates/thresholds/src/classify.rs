//! Observation classification against resolved thresholds.

use crate::set::ResolvedThreshold;

/// One threshold's membership verdict for a single observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub name: String,
    pub weight: f64,
    pub cutoff: f64,
    /// Whether the observation is at or above the cutoff.
    pub at_or_above: bool,
}

/// The full classification of one observation: membership per resolved
/// threshold, ordered by descending threshold weight.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    pub memberships: Vec<Membership>,
}

impl Classification {
    /// Looks up one threshold's verdict by name.
    pub fn membership(&self, name: &str) -> Option<&Membership> {
        self.memberships.iter().find(|m| m.name == name)
    }

    /// The heaviest threshold the observation reaches, if any.
    pub fn severity(&self) -> Option<&Membership> {
        self.memberships.iter().find(|m| m.at_or_above)
    }
}

/// Classifies a value against resolved thresholds.
///
/// The result preserves the resolution order (descending weight), so a
/// classification is stable however the definitions were ordered in the
/// source document.
pub fn classify(value: f64, resolved: &[ResolvedThreshold]) -> Classification {
    Classification {
        memberships: resolved
            .iter()
            .map(|t| Membership {
                name: t.name.clone(),
                weight: t.weight,
                cutoff: t.cutoff,
                at_or_above: value >= t.cutoff,
            })
            .collect(),
    }
}
