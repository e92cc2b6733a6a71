//! # themis-config
//!
//! The declarative evaluation configuration: a JSON document naming
//! observation and prediction datasets, crosswalks, threshold sources, and a
//! metric scheme. Partial documents (fragments) combine through a recursive
//! structural merge before being deserialized into the typed model.

mod error;
mod merge;
mod model;

pub use error::ConfigError;
pub use merge::merge_fragments;
pub use model::{
    BackendFormat, BackendKind, BackendSpec, CrosswalkSpec, DatasetSpec, Datatype, DayRuleSpec,
    EvaluationConfig, FieldSpec, LocationSource, LocationSpec, MetricSpec, SchemeSpec,
    ThresholdDefinitionSpec, ThresholdSourceSpec, ValueSelectorSpec,
};
