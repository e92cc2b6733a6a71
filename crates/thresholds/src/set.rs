//! Threshold sources: loading and per-location cutoff resolution.

use std::collections::BTreeMap;

use themis_backend::{Day, read_backend};
use themis_config::ThresholdSourceSpec;
use themis_path::{Path, Value};
use tracing::{debug, info, warn};

use crate::error::ThresholdError;

/// Name of the built-in threshold that filters nothing.
pub const ALL_DATA: &str = "All data";

/// A named, weighted threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub name: String,
    pub weight: f64,
    pub unit: Option<String>,
}

/// The built-in threshold covering every observation, used so continuous
/// metrics score even where no configured threshold resolves.
pub fn all_data_threshold() -> Threshold {
    Threshold {
        name: ALL_DATA.to_string(),
        weight: 1.0,
        unit: None,
    }
}

/// Cutoff values for one threshold at one location.
#[derive(Debug, Clone, PartialEq)]
pub enum CutoffSeries {
    /// One cutoff for every observation.
    Fixed(f64),
    /// A cutoff per calendar day; days without an entry do not apply.
    ByDay(BTreeMap<Day, f64>),
}

/// One threshold with its cutoffs at one location.
#[derive(Debug, Clone)]
pub struct ThresholdBand {
    pub threshold: Threshold,
    pub cutoffs: CutoffSeries,
}

impl ThresholdBand {
    /// Returns this band's cutoff for the given calendar day, if it applies.
    pub fn cutoff(&self, day: Day) -> Option<f64> {
        match &self.cutoffs {
            CutoffSeries::Fixed(v) => Some(*v),
            CutoffSeries::ByDay(map) => map.get(&day).copied(),
        }
    }
}

/// A threshold with its cutoff resolved for one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedThreshold {
    pub name: String,
    pub weight: f64,
    pub cutoff: f64,
}

/// All threshold bands for one location, ordered by descending weight
/// (ties broken by name) so classification is stable under definition
/// reordering in the source.
#[derive(Debug, Clone, Default)]
pub struct LocationThresholds {
    bands: Vec<ThresholdBand>,
}

impl LocationThresholds {
    /// Iterates bands in weight order.
    pub fn bands(&self) -> &[ThresholdBand] {
        &self.bands
    }

    /// Resolves every band that applies on the given day.
    pub fn resolve(&self, day: Day) -> Vec<ResolvedThreshold> {
        self.bands
            .iter()
            .filter_map(|band| {
                band.cutoff(day).map(|cutoff| ResolvedThreshold {
                    name: band.threshold.name.clone(),
                    weight: band.threshold.weight,
                    cutoff,
                })
            })
            .collect()
    }

    fn push(&mut self, band: ThresholdBand) {
        self.bands.push(band);
        self.bands.sort_by(|a, b| {
            b.threshold
                .weight
                .partial_cmp(&a.threshold.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.threshold.name.cmp(&b.threshold.name))
        });
    }
}

/// Threshold cutoffs for an evaluation, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct ThresholdSet {
    locations: BTreeMap<String, LocationThresholds>,
}

impl ThresholdSet {
    /// Loads one threshold source through the backend pipeline.
    ///
    /// The location field (and, under an application rule, the month and day
    /// fields) may be path expressions; wildcards in the location path expand
    /// and the remaining paths follow with pinned indices, so hierarchical
    /// JSON sources work the same way flat RDB tables do.
    ///
    /// # Errors
    ///
    /// Returns [`ThresholdError::Backend`] on read or path failures and
    /// [`ThresholdError::Empty`] when no cutoffs could be extracted.
    pub fn load(spec: &ThresholdSourceSpec) -> Result<Self, ThresholdError> {
        let location_path =
            Path::parse(&spec.location_field).map_err(themis_backend::BackendError::from)?;
        let day_paths = match &spec.application_rule {
            Some(rule) => Some((
                Path::parse(&rule.month_field).map_err(themis_backend::BackendError::from)?,
                Path::parse(&rule.day_field).map_err(themis_backend::BackendError::from)?,
            )),
            None => None,
        };
        let definition_paths = spec
            .definitions
            .iter()
            .map(|d| Ok((d, Path::parse(&d.field)?)))
            .collect::<Result<Vec<_>, themis_path::PathError>>()
            .map_err(themis_backend::BackendError::from)?;

        let mut set = Self::default();
        let mut skipped = 0usize;
        let mut n_cutoffs = 0usize;

        for record in read_backend(&spec.backend)? {
            for loc_match in location_path.evaluate(&record.tree) {
                let Some(location) = value_identifier(loc_match.value) else {
                    skipped += 1;
                    continue;
                };
                let pins = &loc_match.indices;

                let day = match &day_paths {
                    None => None,
                    Some((month_path, day_path)) => {
                        match record_day(&record.tree, month_path, day_path, pins) {
                            Some(day) => Some(day),
                            None => {
                                debug!(
                                    source = spec.name,
                                    location, "threshold record day did not resolve"
                                );
                                skipped += 1;
                                continue;
                            }
                        }
                    }
                };

                for (definition, field_path) in &definition_paths {
                    let cutoff = field_path
                        .evaluate_pinned(&record.tree, pins)
                        .first()
                        .and_then(|m| value_number(m.value));
                    let Some(cutoff) = cutoff else {
                        debug!(
                            source = spec.name,
                            location,
                            threshold = definition.name,
                            "threshold record has no cutoff value"
                        );
                        continue;
                    };

                    let threshold = Threshold {
                        name: definition.name.clone(),
                        weight: definition.weight,
                        unit: definition.unit.clone(),
                    };
                    set.add_cutoff(&location, threshold, day, cutoff);
                    n_cutoffs += 1;
                }
            }
        }

        if set.locations.is_empty() {
            return Err(ThresholdError::Empty {
                name: spec.name.clone(),
            });
        }

        info!(
            source = spec.name,
            n_locations = set.locations.len(),
            n_cutoffs,
            n_skipped = skipped,
            "threshold source loaded"
        );

        Ok(set)
    }

    fn add_cutoff(&mut self, location: &str, threshold: Threshold, day: Option<Day>, cutoff: f64) {
        let bands = self.locations.entry(location.to_string()).or_default();

        let existing = bands
            .bands
            .iter_mut()
            .find(|band| band.threshold.name == threshold.name);

        match (existing, day) {
            (None, None) => bands.push(ThresholdBand {
                threshold,
                cutoffs: CutoffSeries::Fixed(cutoff),
            }),
            (None, Some(day)) => {
                let mut map = BTreeMap::new();
                map.insert(day, cutoff);
                bands.push(ThresholdBand {
                    threshold,
                    cutoffs: CutoffSeries::ByDay(map),
                });
            }
            (Some(band), Some(day)) => {
                if let CutoffSeries::ByDay(map) = &mut band.cutoffs {
                    if map.insert(day, cutoff).is_some() {
                        warn!(
                            location,
                            threshold = band.threshold.name,
                            day = %day,
                            "duplicate day-keyed cutoff; keeping last"
                        );
                    }
                }
            }
            (Some(band), None) => {
                warn!(
                    location,
                    threshold = band.threshold.name,
                    "duplicate fixed cutoff; keeping first"
                );
            }
        }
    }

    /// Absorbs another set; bands append per location.
    pub fn absorb(&mut self, other: ThresholdSet) {
        for (location, thresholds) in other.locations {
            let bands = self.locations.entry(location).or_default();
            for band in thresholds.bands {
                bands.push(band);
            }
        }
    }

    /// Looks up a location's thresholds.
    pub fn get(&self, location: &str) -> Option<&LocationThresholds> {
        self.locations.get(location)
    }

    /// Iterates locations in identifier order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// Number of locations with thresholds.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when no location has thresholds.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Renders a scalar tree value as a location identifier.
fn value_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.fract() == 0.0 && n.abs() < 9e15 => Some(format!("{}", *n as i64)),
        Value::Number(n) => Some(format!("{n}")),
        _ => None,
    }
}

/// Reads a numeric scalar, accepting numeric text.
fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn record_day(tree: &Value, month_path: &Path, day_path: &Path, pins: &[usize]) -> Option<Day> {
    let month = month_path
        .evaluate_pinned(tree, pins)
        .first()
        .and_then(|m| value_number(m.value))?;
    let day = day_path
        .evaluate_pinned(tree, pins)
        .first()
        .and_then(|m| value_number(m.value))?;
    if month < 1.0 || month > 12.0 || day < 1.0 || day > 31.0 {
        return None;
    }
    Day::new(month as u8, day as u8).ok()
}
