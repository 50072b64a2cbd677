//! Module bundling: read, parse, merge, account.

use crate::manifest::Manifest;
use crate::resolve::{matched_keywords, resolve_modules};
use crate::tokens::estimate_tokens;
use crate::{BundleError, ModuleReader};
use adf_core::{Content, Document, Section, Weight};
use adf_syntax::{format, parse};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Manifest file name inside a bundle base directory.
pub const MANIFEST_FILE: &str = "manifest.adf";

/// Why a module ended up in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadReason {
    Default,
    Trigger,
    /// Loaded because the caller asked for it, though the task did not
    /// resolve it.
    Explicit,
}

/// Trigger outcome for one manifest module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMatch {
    pub path: String,
    pub matched: bool,
    pub matched_keywords: Vec<String>,
    /// `None` when the module was not loaded.
    pub load_reason: Option<LoadReason>,
}

/// An on-demand module whose own estimate exceeds its declared budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOverrun {
    pub path: String,
    pub tokens: usize,
    pub budget: u64,
}

/// Merged document plus token and trigger reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleResult {
    pub document: Document,
    /// Modules actually loaded, in merge order.
    pub modules: Vec<String>,
    pub token_estimate: usize,
    pub token_budget: Option<u64>,
    pub token_utilization: Option<f64>,
    pub per_module_tokens: BTreeMap<String, usize>,
    pub module_budget_overruns: Vec<BudgetOverrun>,
    pub trigger_report: Vec<TriggerMatch>,
    pub unmatched_modules: Vec<String>,
    pub advisory_only_modules: Vec<String>,
}

impl BundleResult {
    /// `true` when the merged estimate exceeds the global budget.
    pub fn over_budget(&self) -> bool {
        self.token_budget
            .is_some_and(|budget| self.token_estimate as u64 > budget)
    }
}

/// Read `base_path/manifest.adf` through `reader`, then bundle `module_paths`.
///
/// A missing manifest is treated as an empty one; any other read failure is
/// an error.
pub fn bundle_modules<R: ModuleReader + ?Sized>(
    base_path: &Path,
    module_paths: &[String],
    reader: &R,
    task_keywords: &BTreeSet<String>,
) -> Result<BundleResult, BundleError> {
    let manifest = match reader.read_module(&base_path.join(MANIFEST_FILE)) {
        Ok(text) => {
            let doc = parse(&text).map_err(|source| BundleError::Parse {
                module_path: MANIFEST_FILE.to_string(),
                source,
            })?;
            Manifest::from_document(&doc)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(base = %base_path.display(), "no manifest, bundling without routing data");
            Manifest::default()
        }
        Err(e) => {
            return Err(BundleError::Read {
                module_path: MANIFEST_FILE.to_string(),
                reason: e.to_string(),
            });
        }
    };
    bundle_with_manifest(base_path, &manifest, module_paths, reader, task_keywords)
}

/// Bundle `module_paths` (relative to `base_path`) against an already
/// projected manifest.
pub fn bundle_with_manifest<R: ModuleReader + ?Sized>(
    base_path: &Path,
    manifest: &Manifest,
    module_paths: &[String],
    reader: &R,
    task_keywords: &BTreeSet<String>,
) -> Result<BundleResult, BundleError> {
    let mut merged = Document::new();
    let mut modules: Vec<String> = Vec::new();
    let mut per_module_tokens = BTreeMap::new();
    let mut advisory_only_modules = Vec::new();

    for module_path in module_paths {
        if modules.contains(module_path) {
            continue;
        }
        let text = reader
            .read_module(&base_path.join(module_path))
            .map_err(|e| BundleError::Read {
                module_path: module_path.clone(),
                reason: e.to_string(),
            })?;
        let doc = parse(&text).map_err(|source| BundleError::Parse {
            module_path: module_path.clone(),
            source,
        })?;

        let tokens = estimate_tokens(&format(&doc));
        debug!(module = %module_path, sections = doc.sections.len(), tokens, "loaded module");
        per_module_tokens.insert(module_path.clone(), tokens);
        if doc.load_bearing_sections().next().is_none() {
            advisory_only_modules.push(module_path.clone());
        }

        merge_into(&mut merged, module_path, doc)?;
        modules.push(module_path.clone());
    }

    let token_estimate = estimate_tokens(&format(&merged));
    let token_budget = manifest.token_budget;
    let token_utilization = token_budget.map(|budget| token_estimate as f64 / budget as f64);

    let module_budget_overruns: Vec<BudgetOverrun> = manifest
        .on_demand
        .iter()
        .filter_map(|module| {
            let budget = module.token_budget?;
            let tokens = *per_module_tokens.get(&module.path)?;
            (tokens as u64 > budget).then(|| BudgetOverrun {
                path: module.path.clone(),
                tokens,
                budget,
            })
        })
        .collect();

    let mut trigger_report: Vec<TriggerMatch> = manifest
        .default_load
        .iter()
        .map(|path| TriggerMatch {
            path: path.clone(),
            matched: true,
            matched_keywords: Vec::new(),
            load_reason: modules.contains(path).then_some(LoadReason::Default),
        })
        .collect();
    for module in &manifest.on_demand {
        if manifest.is_default(&module.path) {
            continue;
        }
        let keywords = matched_keywords(module, task_keywords);
        let matched = !keywords.is_empty();
        trigger_report.push(TriggerMatch {
            path: module.path.clone(),
            matched,
            matched_keywords: keywords,
            load_reason: modules.contains(&module.path).then_some(if matched {
                LoadReason::Trigger
            } else {
                LoadReason::Explicit
            }),
        });
    }

    let resolved = resolve_modules(manifest, task_keywords);
    let unmatched_modules: Vec<String> = manifest
        .on_demand
        .iter()
        .filter(|m| !resolved.contains(&m.path))
        .map(|m| m.path.clone())
        .collect();

    if let Some(budget) = token_budget
        && token_estimate as u64 > budget
    {
        warn!(token_estimate, budget, "bundle exceeds token budget");
    }
    for overrun in &module_budget_overruns {
        warn!(module = %overrun.path, tokens = overrun.tokens, budget = overrun.budget, "module exceeds its token budget");
    }

    Ok(BundleResult {
        document: merged,
        modules,
        token_estimate,
        token_budget,
        token_utilization,
        per_module_tokens,
        module_budget_overruns,
        trigger_report,
        unmatched_modules,
        advisory_only_modules,
    })
}

fn merge_into(merged: &mut Document, module_path: &str, doc: Document) -> Result<(), BundleError> {
    for incoming in doc.sections {
        match merged.section_mut(&incoming.key) {
            Some(existing) => merge_section(existing, incoming, module_path)?,
            None => merged.sections.push(incoming),
        }
    }
    Ok(())
}

fn merge_section(
    existing: &mut Section,
    incoming: Section,
    module_path: &str,
) -> Result<(), BundleError> {
    let existing_type = existing.content.content_type();
    let incoming_type = incoming.content.content_type();

    match (&mut existing.content, incoming.content) {
        (Content::Text { value }, Content::Text { value: more }) => {
            if !more.is_empty() {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(&more);
            }
        }
        (Content::List { items }, Content::List { items: more }) => items.extend(more),
        (Content::Map { entries }, Content::Map { entries: more }) => entries.extend(more),
        (Content::Metric { entries }, Content::Metric { entries: more }) => entries.extend(more),
        // A bare header contributes nothing, whatever the other side holds.
        (_, Content::Text { value }) if value.is_empty() => {}
        (current, replacement) if matches!(&*current, Content::Text { value } if value.is_empty()) => {
            *current = replacement
        }
        _ => {
            return Err(BundleError::ContentTypeConflict {
                key: existing.key.clone(),
                module_path: module_path.to_string(),
                existing: existing_type,
                incoming: incoming_type,
            });
        }
    }

    existing.weight = strongest(existing.weight, incoming.weight);
    if existing.decoration.is_none() {
        existing.decoration = incoming.decoration;
    }
    Ok(())
}

fn strongest(a: Option<Weight>, b: Option<Weight>) -> Option<Weight> {
    fn strength(w: Option<Weight>) -> u8 {
        match w {
            Some(Weight::LoadBearing) => 2,
            Some(Weight::Advisory) => 1,
            None => 0,
        }
    }
    if strength(b) > strength(a) { b } else { a }
}
