//! Evidence report types.

use serde::{Deserialize, Serialize};

/// Outcome of comparing one value against its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    /// Strictly below the ceiling.
    Pass,
    /// Exactly at the ceiling. Still passing.
    Warn,
    /// Above the ceiling.
    Fail,
}

impl MetricStatus {
    /// Classify `value` against `ceiling`.
    pub fn evaluate(value: f64, ceiling: f64) -> Self {
        if value < ceiling {
            Self::Pass
        } else if value == ceiling {
            Self::Warn
        } else {
            Self::Fail
        }
    }
}

impl std::fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Where the compared value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Supplied by the caller's context map.
    Context,
    /// The value declared in the document.
    Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricVerdict {
    /// Key of the section holding the entry.
    pub section: String,
    pub key: String,
    /// Value actually compared.
    pub value: f64,
    /// Value written in the document.
    pub declared_value: f64,
    pub ceiling: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    pub source: ValueSource,
    pub status: MetricStatus,
}

/// Section counts by weight tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSummary {
    pub load_bearing: usize,
    pub advisory: usize,
    pub unweighted: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceResult {
    pub verdicts: Vec<MetricVerdict>,
    pub weight_summary: WeightSummary,
    /// No verdict failed. Warnings still pass.
    pub all_passing: bool,
    pub pass_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
}

impl EvidenceResult {
    /// Verdicts with the given status.
    pub fn with_status(&self, status: MetricStatus) -> impl Iterator<Item = &MetricVerdict> {
        self.verdicts.iter().filter(move |v| v.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_boundaries() {
        assert_eq!(MetricStatus::evaluate(199.0, 200.0), MetricStatus::Pass);
        assert_eq!(MetricStatus::evaluate(200.0, 200.0), MetricStatus::Warn);
        assert_eq!(MetricStatus::evaluate(201.0, 200.0), MetricStatus::Fail);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&MetricStatus::Warn).unwrap();
        assert_eq!(json, "\"warn\"");
        assert_eq!(MetricStatus::Fail.to_string(), "fail");
    }
}
