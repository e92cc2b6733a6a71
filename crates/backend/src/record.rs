//! Row-oriented data representation shared by all backends.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use themis_path::Value;

use crate::day::Day;

/// One raw record produced by a backend read.
///
/// JSON backends yield one record per document; tabular backends yield one
/// record per data row, with columns as object keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// File name (final path component) the record came from.
    pub source: String,
    /// Parsed content.
    pub tree: Value,
}

/// A typed, extracted field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Text(String),
    Datetime(DateTime<Utc>),
    Day(Day),
}

impl FieldValue {
    /// Returns the numeric content for float values.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the timestamp for datetime values.
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Datetime(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the day key for day values.
    pub fn as_day(&self) -> Option<Day> {
        match self {
            FieldValue::Day(d) => Some(*d),
            _ => None,
        }
    }

    /// Renders the value as an identifier-style string.
    ///
    /// Floats with no fractional part render without a decimal point so that
    /// numeric site codes compare equal to their text form.
    pub fn as_identifier(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Float(v) if v.fract() == 0.0 && v.abs() < 9e15 => {
                format!("{}", *v as i64)
            }
            FieldValue::Float(v) => format!("{v}"),
            FieldValue::Datetime(t) => t.to_rfc3339(),
            FieldValue::Day(d) => d.to_string(),
        }
    }
}

/// One selected, located row: the output of the backend pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRow {
    /// Name of the selector that produced the row.
    pub selector: String,
    /// The column name or path the value was read from.
    pub column: String,
    /// The selector's extracted value.
    pub value: FieldValue,
    /// Associated fields, by field name.
    pub fields: BTreeMap<String, FieldValue>,
    /// Resolved location identifier, once location resolution has run.
    pub location: Option<String>,
    /// File name the row came from.
    pub source: String,
}

impl SelectedRow {
    /// Returns the first datetime-typed associated field, if any.
    ///
    /// Datasets conventionally carry their timestamp as an associated field;
    /// which one is the timestamp is determined by datatype, not by name.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.fields.values().find_map(FieldValue::as_datetime)
    }
}

/// Parses timestamp text using the configured format, falling back to common
/// ISO-8601 layouts. Naive timestamps are taken as UTC.
pub(crate) fn parse_datetime(text: &str, format: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Some(format) = format {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&t));
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
        }
        return None;
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(Utc.from_utc_datetime(&t));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rendering() {
        assert_eq!(FieldValue::Text("cat-01".to_string()).as_identifier(), "cat-01");
        assert_eq!(FieldValue::Float(2146562.0).as_identifier(), "2146562");
        assert_eq!(FieldValue::Float(2.5).as_identifier(), "2.5");
    }

    #[test]
    fn timestamp_finds_datetime_field() {
        let t = Utc.with_ymd_and_hms(2015, 12, 1, 0, 0, 0).unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("site".to_string(), FieldValue::Text("x".to_string()));
        fields.insert("value_date".to_string(), FieldValue::Datetime(t));
        let row = SelectedRow {
            selector: "flow".to_string(),
            column: "flow".to_string(),
            value: FieldValue::Float(1.0),
            fields,
            location: None,
            source: "obs.csv".to_string(),
        };
        assert_eq!(row.timestamp(), Some(t));
    }

    #[test]
    fn timestamp_absent() {
        let row = SelectedRow {
            selector: "flow".to_string(),
            column: "flow".to_string(),
            value: FieldValue::Float(1.0),
            fields: BTreeMap::new(),
            location: None,
            source: "obs.csv".to_string(),
        };
        assert_eq!(row.timestamp(), None);
    }

    #[test]
    fn parse_datetime_rfc3339() {
        let t = parse_datetime("2015-12-01T00:00:00Z", None).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2015, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_datetime_naive_layouts() {
        let expected = Utc.with_ymd_and_hms(2015, 12, 1, 6, 30, 0).unwrap();
        assert_eq!(parse_datetime("2015-12-01T06:30:00", None), Some(expected));
        assert_eq!(parse_datetime("2015-12-01 06:30:00", None), Some(expected));
        assert_eq!(parse_datetime("2015-12-01 06:30", None), Some(expected));
    }

    #[test]
    fn parse_datetime_date_only() {
        let t = parse_datetime("2015-12-01", None).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2015, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_datetime_explicit_format() {
        let t = parse_datetime("12/01/2015 06:30", Some("%m/%d/%Y %H:%M")).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2015, 12, 1, 6, 30, 0).unwrap());

        // An explicit format does not fall back to ISO layouts.
        assert!(parse_datetime("2015-12-01T06:30:00", Some("%m/%d/%Y %H:%M")).is_none());
    }

    #[test]
    fn parse_datetime_garbage() {
        assert!(parse_datetime("not a date", None).is_none());
    }
}
