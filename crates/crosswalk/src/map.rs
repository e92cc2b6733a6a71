//! Crosswalk loading and lookup.

use std::collections::BTreeMap;

use themis_backend::read_backend;
use themis_config::CrosswalkSpec;
use themis_path::{Path, Value};
use tracing::{debug, info, warn};

use crate::error::CrosswalkError;

/// A mapping from prediction-location identifiers to observation-location
/// identifiers.
#[derive(Debug, Clone, Default)]
pub struct CrosswalkMap {
    map: BTreeMap<String, String>,
}

impl CrosswalkMap {
    /// Builds a map from (prediction, observation) pairs.
    ///
    /// A prediction identifier mapped more than once keeps its first
    /// observation identifier; later pairs are reported and ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut crosswalk = Self::default();
        for (prediction, observation) in pairs {
            crosswalk.insert_first_wins(prediction, observation);
        }
        crosswalk
    }

    /// Inserts a pair unless the prediction identifier is already mapped.
    /// Returns whether the pair was inserted.
    pub fn insert_first_wins(&mut self, prediction: String, observation: String) -> bool {
        match self.map.get(&prediction) {
            Some(existing) => {
                if *existing != observation {
                    warn!(
                        prediction,
                        kept = %existing,
                        ignored = %observation,
                        "prediction location mapped more than once; keeping first"
                    );
                }
                false
            }
            None => {
                self.map.insert(prediction, observation);
                true
            }
        }
    }

    /// Resolves a prediction location to its observation location.
    pub fn resolve(&self, prediction: &str) -> Option<&str> {
        self.map.get(prediction).map(String::as_str)
    }

    /// Iterates (prediction, observation) pairs in identifier order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(p, o)| (p.as_str(), o.as_str()))
    }

    /// Number of mapped prediction locations.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no pairs are mapped.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Loads one crosswalk through the backend pipeline.
///
/// The observation path is evaluated with full wildcard expansion; for each
/// match, the prediction path is evaluated with the same wildcard indices
/// pinned so both identifiers come from the same branch of the record.
///
/// # Errors
///
/// Returns [`CrosswalkError::Backend`] on read or path failures and
/// [`CrosswalkError::Empty`] when no pairs could be extracted.
pub fn load_crosswalk(spec: &CrosswalkSpec) -> Result<CrosswalkMap, CrosswalkError> {
    let observation_path =
        Path::parse(&spec.observation_path).map_err(themis_backend::BackendError::from)?;
    let prediction_path =
        Path::parse(&spec.prediction_path).map_err(themis_backend::BackendError::from)?;

    let mut crosswalk = CrosswalkMap::default();
    let mut skipped = 0usize;

    for record in read_backend(&spec.backend)? {
        for obs_match in observation_path.evaluate(&record.tree) {
            let Some(observation) = value_identifier(obs_match.value) else {
                skipped += 1;
                continue;
            };
            let prediction = prediction_path
                .evaluate_pinned(&record.tree, &obs_match.indices)
                .first()
                .and_then(|m| value_identifier(m.value));
            match prediction {
                Some(prediction) => {
                    crosswalk.insert_first_wins(prediction, observation);
                }
                None => {
                    debug!(
                        crosswalk = spec.name,
                        observation,
                        source = record.source,
                        "no prediction identifier aligned with observation"
                    );
                    skipped += 1;
                }
            }
        }
    }

    if crosswalk.is_empty() {
        return Err(CrosswalkError::Empty {
            name: spec.name.clone(),
        });
    }

    info!(
        crosswalk = spec.name,
        n_pairs = crosswalk.len(),
        n_skipped = skipped,
        "crosswalk loaded"
    );

    Ok(crosswalk)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use themis_config::{BackendFormat, BackendKind, BackendSpec};

    fn crosswalk_spec(format: BackendFormat, address: String) -> CrosswalkSpec {
        CrosswalkSpec {
            name: "test-crosswalk".to_string(),
            backend: BackendSpec {
                kind: BackendKind::File,
                format,
                address,
                date_fields: vec![],
                date_format: None,
            },
            observation_path: "sites[*].observation_location".to_string(),
            prediction_path: "sites[*].prediction_location".to_string(),
        }
    }

    #[test]
    fn from_pairs_first_wins() {
        let crosswalk = CrosswalkMap::from_pairs(vec![
            ("cat-01".to_string(), "02146562".to_string()),
            ("cat-01".to_string(), "9999".to_string()),
            ("cat-02".to_string(), "0214655255".to_string()),
        ]);

        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.resolve("cat-01"), Some("02146562"));
        assert_eq!(crosswalk.resolve("cat-02"), Some("0214655255"));
        assert_eq!(crosswalk.resolve("cat-99"), None);
    }

    #[test]
    fn pairs_iterate_in_order() {
        let crosswalk = CrosswalkMap::from_pairs(vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]);
        let pairs: Vec<_> = crosswalk.pairs().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn load_from_json_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalk.json");
        fs::write(
            &path,
            r#"{"sites": [
                {"observation_location": "02146562", "prediction_location": "cat-01"},
                {"observation_location": "0214655255", "prediction_location": "cat-02"}
            ]}"#,
        )
        .unwrap();

        let spec = crosswalk_spec(BackendFormat::Json, path.to_string_lossy().to_string());
        let crosswalk = load_crosswalk(&spec).unwrap();

        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.resolve("cat-01"), Some("02146562"));
    }

    #[test]
    fn numeric_identifiers_render_as_integers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalk.json");
        fs::write(
            &path,
            r#"{"sites": [
                {"observation_location": 2146562, "prediction_location": "cat-01"}
            ]}"#,
        )
        .unwrap();

        let spec = crosswalk_spec(BackendFormat::Json, path.to_string_lossy().to_string());
        let crosswalk = load_crosswalk(&spec).unwrap();
        assert_eq!(crosswalk.resolve("cat-01"), Some("2146562"));
    }

    #[test]
    fn rows_without_prediction_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalk.json");
        fs::write(
            &path,
            r#"{"sites": [
                {"observation_location": "02146562", "prediction_location": "cat-01"},
                {"observation_location": "lonely"}
            ]}"#,
        )
        .unwrap();

        let spec = crosswalk_spec(BackendFormat::Json, path.to_string_lossy().to_string());
        let crosswalk = load_crosswalk(&spec).unwrap();
        assert_eq!(crosswalk.len(), 1);
    }

    #[test]
    fn empty_crosswalk_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalk.json");
        fs::write(&path, r#"{"sites": []}"#).unwrap();

        let spec = crosswalk_spec(BackendFormat::Json, path.to_string_lossy().to_string());
        assert!(matches!(
            load_crosswalk(&spec).unwrap_err(),
            CrosswalkError::Empty { .. }
        ));
    }

    #[test]
    fn missing_backend_is_a_backend_error() {
        let spec = crosswalk_spec(BackendFormat::Json, "/no/such.json".to_string());
        assert!(matches!(
            load_crosswalk(&spec).unwrap_err(),
            CrosswalkError::Backend(_)
        ));
    }
}
