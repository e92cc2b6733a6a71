//! Series construction and time alignment.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use themis_backend::LoadedDataset;
use tracing::debug;

/// A per-location time series, sorted by timestamp.
pub(crate) type Series = Vec<(DateTime<Utc>, f64)>;

/// Rows that could not enter a series, by cause.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SeriesGaps {
    /// Rows with no datetime-typed field.
    pub untimed: usize,
    /// Rows whose value was not a float.
    pub non_numeric: usize,
}

/// Groups dataset rows into per-location series.
///
/// Rows without a resolved location fall back to their dataset's name as the
/// location key (a single-site dataset needs no location rule). Rows without
/// a timestamp or a numeric value are skipped and counted. Duplicate
/// timestamps keep their first value.
pub(crate) fn build_series(datasets: &[LoadedDataset]) -> (BTreeMap<String, Series>, SeriesGaps) {
    let mut series: BTreeMap<String, Series> = BTreeMap::new();
    let mut gaps = SeriesGaps::default();

    for dataset in datasets {
        for row in &dataset.rows {
            let Some(timestamp) = row.timestamp() else {
                gaps.untimed += 1;
                continue;
            };
            let Some(value) = row.value.as_float() else {
                gaps.non_numeric += 1;
                continue;
            };
            let location = row
                .location
                .clone()
                .unwrap_or_else(|| dataset.name.clone());
            series.entry(location).or_default().push((timestamp, value));
        }
    }

    for (location, points) in series.iter_mut() {
        points.sort_by_key(|(t, _)| *t);
        let before = points.len();
        points.dedup_by_key(|(t, _)| *t);
        if points.len() < before {
            debug!(
                location,
                n_duplicates = before - points.len(),
                "duplicate timestamps; keeping first value"
            );
        }
    }

    (series, gaps)
}

/// Inner-joins two sorted series on timestamp.
pub(crate) fn align(
    observations: &Series,
    predictions: &Series,
) -> Vec<(DateTime<Utc>, f64, f64)> {
    let mut pairs = Vec::new();
    let mut obs_iter = observations.iter().peekable();
    let mut pred_iter = predictions.iter().peekable();

    while let (Some(&&(obs_time, obs_value)), Some(&&(pred_time, pred_value))) =
        (obs_iter.peek(), pred_iter.peek())
    {
        match obs_time.cmp(&pred_time) {
            std::cmp::Ordering::Less => {
                obs_iter.next();
            }
            std::cmp::Ordering::Greater => {
                pred_iter.next();
            }
            std::cmp::Ordering::Equal => {
                pairs.push((obs_time, obs_value, pred_value));
                obs_iter.next();
                pred_iter.next();
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap as Map;
    use themis_backend::{FieldValue, SelectedRow};

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 12, day, 0, 0, 0).unwrap()
    }

    fn row(location: Option<&str>, day: u32, value: f64) -> SelectedRow {
        let mut fields = Map::new();
        fields.insert("value_date".to_string(), FieldValue::Datetime(t(day)));
        SelectedRow {
            selector: "flow".to_string(),
            column: "flow".to_string(),
            value: FieldValue::Float(value),
            fields,
            location: location.map(str::to_string),
            source: "obs.csv".to_string(),
        }
    }

    fn dataset(name: &str, rows: Vec<SelectedRow>) -> LoadedDataset {
        LoadedDataset {
            name: name.to_string(),
            rows,
            records_read: 0,
            rows_dropped: 0,
            unresolved_locations: 0,
        }
    }

    #[test]
    fn groups_and_sorts_by_location() {
        let datasets = vec![dataset(
            "obs",
            vec![
                row(Some("cat-01"), 2, 20.0),
                row(Some("cat-01"), 1, 10.0),
                row(Some("cat-02"), 1, 5.0),
            ],
        )];

        let (series, gaps) = build_series(&datasets);
        assert_eq!(gaps, SeriesGaps::default());
        assert_eq!(series.len(), 2);
        assert_eq!(series["cat-01"], vec![(t(1), 10.0), (t(2), 20.0)]);
        assert_eq!(series["cat-02"], vec![(t(1), 5.0)]);
    }

    #[test]
    fn unlocated_rows_use_dataset_name() {
        let datasets = vec![dataset("gauge-a", vec![row(None, 1, 1.0)])];
        let (series, _) = build_series(&datasets);
        assert!(series.contains_key("gauge-a"));
    }

    #[test]
    fn untimed_rows_are_counted() {
        let mut no_time = row(Some("cat-01"), 1, 1.0);
        no_time.fields.clear();
        let datasets = vec![dataset("obs", vec![no_time, row(Some("cat-01"), 1, 2.0)])];

        let (series, gaps) = build_series(&datasets);
        assert_eq!(gaps.untimed, 1);
        assert_eq!(series["cat-01"].len(), 1);
    }

    #[test]
    fn duplicate_timestamps_keep_first() {
        let datasets = vec![dataset(
            "obs",
            vec![row(Some("cat-01"), 1, 10.0), row(Some("cat-01"), 1, 99.0)],
        )];
        let (series, _) = build_series(&datasets);
        assert_eq!(series["cat-01"], vec![(t(1), 10.0)]);
    }

    #[test]
    fn align_inner_join() {
        let obs = vec![(t(1), 10.0), (t(2), 20.0), (t(4), 40.0)];
        let pred = vec![(t(2), 18.0), (t(3), 30.0), (t(4), 42.0)];

        let pairs = align(&obs, &pred);
        assert_eq!(pairs, vec![(t(2), 20.0, 18.0), (t(4), 40.0, 42.0)]);
    }

    #[test]
    fn align_no_overlap() {
        let obs = vec![(t(1), 10.0)];
        let pred = vec![(t(2), 18.0)];
        assert!(align(&obs, &pred).is_empty());
    }

    #[test]
    fn align_empty_inputs() {
        assert!(align(&vec![], &vec![(t(1), 1.0)]).is_empty());
        assert!(align(&vec![(t(1), 1.0)], &vec![]).is_empty());
    }
}
