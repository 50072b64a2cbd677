//! Trigger resolution.

use crate::manifest::{Manifest, OnDemandModule};
use std::collections::BTreeSet;

/// Task keywords that equal one of the module's triggers, ignoring ASCII
/// case. Whole-token equality only: `react` matches `React`, `reactive`
/// does not.
pub fn matched_keywords(module: &OnDemandModule, task_keywords: &BTreeSet<String>) -> Vec<String> {
    task_keywords
        .iter()
        .filter(|keyword| {
            module
                .triggers
                .iter()
                .any(|trigger| trigger.eq_ignore_ascii_case(keyword))
        })
        .cloned()
        .collect()
}

/// Module paths a task needs: every default module, then every on-demand
/// module with a matching trigger, in declaration order and without
/// duplicates.
pub fn resolve_modules(manifest: &Manifest, task_keywords: &BTreeSet<String>) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::new();
    let mut push = |path: &str| {
        if !resolved.iter().any(|p| p == path) {
            resolved.push(path.to_string());
        }
    };

    for path in &manifest.default_load {
        push(path);
    }
    for module in &manifest.on_demand {
        if !matched_keywords(module, task_keywords).is_empty() {
            push(&module.path);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn manifest() -> Manifest {
        Manifest {
            default_load: vec!["core.adf".into(), "state.adf".into()],
            on_demand: vec![
                OnDemandModule {
                    path: "frontend.adf".into(),
                    triggers: vec!["React".into(), "CSS".into()],
                    token_budget: None,
                },
                OnDemandModule {
                    path: "backend.adf".into(),
                    triggers: vec!["api".into()],
                    token_budget: None,
                },
                OnDemandModule {
                    path: "core.adf".into(),
                    triggers: vec!["core".into()],
                    token_budget: None,
                },
            ],
            ..Manifest::default()
        }
    }

    #[test]
    fn trigger_matching_is_case_insensitive_and_exact() {
        let m = manifest();
        assert_eq!(
            resolve_modules(&m, &keywords(&["react"])),
            ["core.adf", "state.adf", "frontend.adf"]
        );
        assert_eq!(
            resolve_modules(&m, &keywords(&["Reactive"])),
            ["core.adf", "state.adf"]
        );
    }

    #[test]
    fn default_modules_always_resolve() {
        assert_eq!(
            resolve_modules(&manifest(), &BTreeSet::new()),
            ["core.adf", "state.adf"]
        );
    }

    #[test]
    fn order_follows_declaration_not_keywords() {
        assert_eq!(
            resolve_modules(&manifest(), &keywords(&["api", "css"])),
            ["core.adf", "state.adf", "frontend.adf", "backend.adf"]
        );
    }

    #[test]
    fn paths_are_never_duplicated() {
        let resolved = resolve_modules(&manifest(), &keywords(&["core"]));
        assert_eq!(resolved, ["core.adf", "state.adf"]);
    }

    #[test]
    fn reports_which_keywords_matched() {
        let m = manifest();
        let matched = matched_keywords(&m.on_demand[0], &keywords(&["css", "react", "vue"]));
        assert_eq!(matched, ["css", "react"]);
    }
}
