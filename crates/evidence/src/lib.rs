//! Constraint evidence for ADF documents.
//!
//! Every Metric entry declares `value / ceiling`. The validator compares a
//! value against its ceiling and renders a [`MetricVerdict`]; callers that
//! measure real values (line counts, dependency counts) pass them in as a
//! context map, which takes precedence over the declared value.
//!
//! Nothing in this crate performs I/O.

pub mod model;
pub mod validate;

pub use model::{EvidenceResult, MetricStatus, MetricVerdict, ValueSource, WeightSummary};
pub use validate::{compute_weight_summary, context_from_json, validate_constraints};
