//! Metric ceiling validation.

use crate::model::{EvidenceResult, MetricStatus, MetricVerdict, ValueSource, WeightSummary};
use adf_core::{Document, Weight};
use std::collections::BTreeMap;
use tracing::debug;

/// Check every Metric entry in `doc` against its ceiling.
///
/// A finite `context[key]` replaces the declared value for every entry with
/// that key. Non-finite context values are ignored.
pub fn validate_constraints(
    doc: &Document,
    context: Option<&BTreeMap<String, f64>>,
) -> EvidenceResult {
    let verdicts: Vec<MetricVerdict> = doc
        .metric_entries()
        .map(|(section, entry)| {
            let measured = context
                .and_then(|ctx| ctx.get(&entry.key))
                .copied()
                .filter(|v| v.is_finite());
            let (value, source) = match measured {
                Some(v) => (v, ValueSource::Context),
                None => (entry.value, ValueSource::Metric),
            };
            let status = MetricStatus::evaluate(value, entry.ceiling);
            debug!(
                section = %section.key,
                key = %entry.key,
                value,
                ceiling = entry.ceiling,
                %status,
                "evaluated metric"
            );
            MetricVerdict {
                section: section.key.clone(),
                key: entry.key.clone(),
                value,
                declared_value: entry.value,
                ceiling: entry.ceiling,
                unit: entry.unit.clone(),
                source,
                status,
            }
        })
        .collect();

    let count = |status| verdicts.iter().filter(|v| v.status == status).count();
    let pass_count = count(MetricStatus::Pass);
    let warn_count = count(MetricStatus::Warn);
    let fail_count = count(MetricStatus::Fail);

    EvidenceResult {
        weight_summary: compute_weight_summary(doc),
        all_passing: fail_count == 0,
        pass_count,
        warn_count,
        fail_count,
        verdicts,
    }
}

/// Tally sections by weight tag.
pub fn compute_weight_summary(doc: &Document) -> WeightSummary {
    doc.sections
        .iter()
        .fold(WeightSummary::default(), |mut summary, section| {
            match section.weight {
                Some(Weight::LoadBearing) => summary.load_bearing += 1,
                Some(Weight::Advisory) => summary.advisory += 1,
                None => summary.unweighted += 1,
            }
            summary.total += 1;
            summary
        })
}

/// Build a context map from a JSON object, keeping only numeric entries.
/// Anything that is not an object yields an empty map.
pub fn context_from_json(value: &serde_json::Value) -> BTreeMap<String, f64> {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, v)| Some((key.clone(), v.as_f64()?)))
                .collect()
        })
        .unwrap_or_default()
}
