//! Projection of a manifest document into routing data.
//!
//! ```text
//! 🎭 ROLE: Frontend engineer
//!
//! 📦 DEFAULT_LOAD:
//!   - core.adf
//!
//! 📂 ON_DEMAND:
//!   - frontend.adf (Triggers on: React, CSS) [budget: 1200]
//!
//! 💰 BUDGET:
//!   MAX_TOKENS: 4000
//! ```
//!
//! Projection is lenient: lines that do not fit a section's shape are
//! skipped with a debug log and never fail the read.

use adf_core::{Content, Document};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

static ON_DEMAND_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(.+?)\s*(?:\((?i:triggers?\s+on)\s*:?\s*([^)]*)\))?\s*(?:\[(?i:budget)\s*:?\s*(\d+)\s*(?i:tokens)?\])?$",
    )
    .expect("on-demand pattern is valid")
});

/// Map key holding the global token budget inside `BUDGET`.
const MAX_TOKENS_KEY: &str = "MAX_TOKENS";

/// Routing view of a manifest document. Rebuilt on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub role: Option<String>,
    /// Modules loaded for every task, deduplicated, in declaration order.
    pub default_load: Vec<String>,
    pub on_demand: Vec<OnDemandModule>,
    pub rules: Vec<String>,
    /// Global token budget. A declared budget of zero counts as none.
    pub token_budget: Option<u64>,
    pub sync: Vec<SyncPair>,
    pub cadence: Vec<CadenceCheck>,
    pub metrics: Vec<MetricSource>,
}

/// A module loaded only when one of its triggers matches a task keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnDemandModule {
    pub path: String,
    pub triggers: Vec<String>,
    pub token_budget: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPair {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceCheck {
    pub check: String,
    pub frequency: String,
}

/// A metric key whose measured value comes from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSource {
    pub key: String,
    pub path: String,
}

impl Manifest {
    /// Project the routing sections of `doc`.
    pub fn from_document(doc: &Document) -> Self {
        let mut manifest = Self::default();

        if let Some(section) = doc.section("ROLE") {
            manifest.role = entries(&section.content).into_iter().next();
        }

        if let Some(section) = doc.section("DEFAULT_LOAD") {
            for path in entries(&section.content) {
                if !manifest.default_load.contains(&path) {
                    manifest.default_load.push(path);
                }
            }
        }

        if let Some(section) = doc.section("ON_DEMAND") {
            manifest.on_demand = entries(&section.content)
                .iter()
                .filter_map(|item| parse_on_demand(item))
                .collect();
        }

        if let Some(section) = doc.section("RULES") {
            manifest.rules = entries(&section.content);
        }

        if let Some(section) = doc.section("BUDGET") {
            manifest.token_budget = budget_of(&section.content);
        }

        if let Some(section) = doc.section("SYNC") {
            manifest.sync = entries(&section.content)
                .iter()
                .filter_map(|item| {
                    let pair = item.split_once("->").and_then(|(source, target)| {
                        let (source, target) = (source.trim(), target.trim());
                        (!source.is_empty() && !target.is_empty()).then(|| SyncPair {
                            source: source.to_string(),
                            target: target.to_string(),
                        })
                    });
                    if pair.is_none() {
                        debug!(item = %item, "skipping SYNC entry without 'source -> target'");
                    }
                    pair
                })
                .collect();
        }

        if let Some(section) = doc.section("CADENCE") {
            manifest.cadence = match &section.content {
                Content::Map { entries } => entries
                    .iter()
                    .map(|e| CadenceCheck {
                        check: e.key.clone(),
                        frequency: e.value.clone(),
                    })
                    .collect(),
                other => entries(other)
                    .iter()
                    .filter_map(|item| {
                        let (check, frequency) = item.split_once(':')?;
                        Some(CadenceCheck {
                            check: check.trim().to_string(),
                            frequency: frequency.trim().to_string(),
                        })
                    })
                    .collect(),
            };
        }

        // Metric-typed METRICS are constraints, not measurement sources.
        if let Some(section) = doc.section("METRICS") {
            if !matches!(section.content, Content::Metric { .. }) {
                manifest.metrics = entries(&section.content)
                    .iter()
                    .filter_map(|item| parse_metric_source(item))
                    .collect();
            }
        }

        debug!(
            default_load = manifest.default_load.len(),
            on_demand = manifest.on_demand.len(),
            token_budget = ?manifest.token_budget,
            "projected manifest"
        );
        manifest
    }

    /// Every module path the manifest knows about, default modules first.
    pub fn module_paths(&self) -> impl Iterator<Item = &str> {
        self.default_load
            .iter()
            .map(String::as_str)
            .chain(self.on_demand.iter().map(|m| m.path.as_str()))
    }

    pub fn is_default(&self, path: &str) -> bool {
        self.default_load.iter().any(|p| p == path)
    }

    pub fn on_demand_module(&self, path: &str) -> Option<&OnDemandModule> {
        self.on_demand.iter().find(|m| m.path == path)
    }
}

/// Flatten any content into one string per entry.
fn entries(content: &Content) -> Vec<String> {
    match content {
        Content::Text { value } => value
            .lines()
            .map(|l| adf_core::classify::bullet_item(l).unwrap_or(l).trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Content::List { items } => items
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(str::to_string)
            .collect(),
        Content::Map { entries } => entries
            .iter()
            .map(|e| format!("{}: {}", e.key, e.value))
            .collect(),
        Content::Metric { entries } => entries.iter().map(|e| e.key.clone()).collect(),
    }
}

fn parse_on_demand(item: &str) -> Option<OnDemandModule> {
    let Some(caps) = ON_DEMAND_ITEM.captures(item) else {
        debug!(item = %item, "skipping malformed ON_DEMAND entry");
        return None;
    };
    let path = caps.get(1)?.as_str().trim().to_string();

    let mut triggers: Vec<String> = Vec::new();
    if let Some(list) = caps.get(2) {
        for trigger in list.as_str().split(',').map(str::trim) {
            if !trigger.is_empty() && !triggers.iter().any(|t| t == trigger) {
                triggers.push(trigger.to_string());
            }
        }
    }

    let token_budget = caps
        .get(3)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .filter(|b| *b > 0);

    Some(OnDemandModule {
        path,
        triggers,
        token_budget,
    })
}

fn budget_of(content: &Content) -> Option<u64> {
    let raw = match content {
        Content::Map { entries } => entries
            .iter()
            .find(|e| e.key == MAX_TOKENS_KEY)
            .map(|e| e.value.as_str()),
        Content::Text { value } => Some(value.as_str()),
        _ => None,
    }?;
    // Accept `4000` and `4000 tokens`.
    let number = raw.split_whitespace().next()?;
    match number.replace('_', "").parse::<u64>() {
        Ok(0) => None,
        Ok(budget) => Some(budget),
        Err(_) => {
            debug!(value = %raw, "ignoring non-numeric token budget");
            None
        }
    }
}

fn parse_metric_source(item: &str) -> Option<MetricSource> {
    let (key, path) = item.split_once("->").or_else(|| item.split_once(':'))?;
    let (key, path) = (key.trim(), path.trim());
    if key.is_empty() || path.is_empty() {
        debug!(item = %item, "skipping malformed METRICS source");
        return None;
    }
    Some(MetricSource {
        key: key.to_string(),
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adf_syntax::parse;

    const MANIFEST: &str = "\
ADF: 0.1
🎭 ROLE: Frontend engineer

📦 DEFAULT_LOAD:
  - core.adf
  - state.adf
  - core.adf

📂 ON_DEMAND:
  - frontend.adf (Triggers on: React, CSS, React) [budget: 1200]
  - backend.adf (Triggers on: api, database)
  - notes.adf

📐 RULES:
  - Load core first

💰 BUDGET:
  MAX_TOKENS: 4000

📊 METRICS:
  - entry_loc: src/main.rs
  - deps -> Cargo.toml

🔄 SYNC:
  - AGENTS.md -> .ai/core.adf
  - broken entry

⏱️ CADENCE:
  - audit: weekly
";

    #[test]
    fn projects_every_routing_section() {
        let manifest = Manifest::from_document(&parse(MANIFEST).unwrap());

        assert_eq!(manifest.role.as_deref(), Some("Frontend engineer"));
        assert_eq!(manifest.default_load, ["core.adf", "state.adf"]);
        assert_eq!(manifest.rules, ["Load core first"]);
        assert_eq!(manifest.token_budget, Some(4000));
        assert_eq!(
            manifest.on_demand,
            vec![
                OnDemandModule {
                    path: "frontend.adf".into(),
                    triggers: vec!["React".into(), "CSS".into()],
                    token_budget: Some(1200),
                },
                OnDemandModule {
                    path: "backend.adf".into(),
                    triggers: vec!["api".into(), "database".into()],
                    token_budget: None,
                },
                OnDemandModule {
                    path: "notes.adf".into(),
                    triggers: vec![],
                    token_budget: None,
                },
            ]
        );
        assert_eq!(
            manifest.metrics,
            vec![
                MetricSource {
                    key: "entry_loc".into(),
                    path: "src/main.rs".into()
                },
                MetricSource {
                    key: "deps".into(),
                    path: "Cargo.toml".into()
                },
            ]
        );
        assert_eq!(
            manifest.sync,
            vec![SyncPair {
                source: "AGENTS.md".into(),
                target: ".ai/core.adf".into()
            }]
        );
        assert_eq!(
            manifest.cadence,
            vec![CadenceCheck {
                check: "audit".into(),
                frequency: "weekly".into()
            }]
        );
    }

    #[test]
    fn empty_document_projects_to_default() {
        assert_eq!(Manifest::from_document(&Document::new()), Manifest::default());
    }

    #[test]
    fn budget_accepts_text_and_rejects_zero() {
        let text = Manifest::from_document(&parse("BUDGET: 2500 tokens").unwrap());
        assert_eq!(text.token_budget, Some(2500));

        let zero = Manifest::from_document(&parse("BUDGET:\n  MAX_TOKENS: 0").unwrap());
        assert_eq!(zero.token_budget, None);

        let junk = Manifest::from_document(&parse("BUDGET: plenty").unwrap());
        assert_eq!(junk.token_budget, None);
    }

    #[test]
    fn cadence_map_entries_are_checks() {
        let manifest =
            Manifest::from_document(&parse("CADENCE:\n  AUDIT: weekly\n  SYNC: daily").unwrap());
        assert_eq!(manifest.cadence.len(), 2);
        assert_eq!(manifest.cadence[1].check, "SYNC");
        assert_eq!(manifest.cadence[1].frequency, "daily");
    }

    #[test]
    fn metric_typed_metrics_are_not_sources() {
        let manifest =
            Manifest::from_document(&parse("METRICS:\n  entry_loc: 142 / 200 lines").unwrap());
        assert!(manifest.metrics.is_empty());
    }

    #[test]
    fn module_queries() {
        let manifest = Manifest::from_document(&parse(MANIFEST).unwrap());
        assert!(manifest.is_default("core.adf"));
        assert!(!manifest.is_default("frontend.adf"));
        assert_eq!(
            manifest.on_demand_module("frontend.adf").unwrap().token_budget,
            Some(1200)
        );
        assert_eq!(manifest.module_paths().count(), 5);
    }
}
