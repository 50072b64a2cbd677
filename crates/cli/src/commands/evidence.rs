//! `adf evidence`: validate metric ceilings for a task bundle.

use super::{load_bundle, measure_line_counts, read_manifest, task_keywords};
use adf_config::AdfConfig;
use adf_evidence::{EvidenceResult, MetricStatus, context_from_json, validate_constraints};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Evidence as printed with `--json`.
#[derive(Debug, Serialize)]
struct EvidenceReport {
    generated_at: DateTime<Utc>,
    task: Option<String>,
    modules: Vec<String>,
    #[serde(flatten)]
    result: EvidenceResult,
}

pub async fn run(
    task: Option<String>,
    context: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AdfConfig::load()?;
    let manifest = read_manifest(&config).await?;
    let keywords = match &task {
        Some(task) => task_keywords(task, config.bundle.min_keyword_len),
        None => BTreeSet::new(),
    };

    let bundle = match load_bundle(&config, &manifest, &keywords).await {
        Ok(bundle) => bundle,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    // Measured line counts first, explicit context values on top.
    let mut values = measure_line_counts(Path::new("."), &manifest.metrics).await;
    if let Some(path) = &context {
        let raw = tokio::fs::read_to_string(path).await?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| format!("invalid context file {}: {e}", path.display()))?;
        values.extend(context_from_json(&parsed));
    }

    let result = validate_constraints(&bundle.document, Some(&values));
    let passed = result.all_passing && !(config.evidence.fail_on_warn && result.warn_count > 0);

    if json {
        let report = EvidenceReport {
            generated_at: Utc::now(),
            task,
            modules: bundle.modules,
            result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_result(&result, passed);
    }

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_result(result: &EvidenceResult, passed: bool) {
    println!("📊 Constraint Evidence");
    println!("─────────────────────────────────────");
    if result.verdicts.is_empty() {
        println!("  No metrics declared.");
    }
    for v in &result.verdicts {
        let icon = match v.status {
            MetricStatus::Pass => "✅",
            MetricStatus::Warn => "⚠️ ",
            MetricStatus::Fail => "⛔",
        };
        println!(
            "  {icon} {:<24} {} / {} {} [{:?}]",
            v.key,
            adf_syntax::format_number(v.value),
            adf_syntax::format_number(v.ceiling),
            v.unit,
            v.source
        );
    }

    let w = &result.weight_summary;
    println!();
    println!(
        "  Sections: {} load-bearing, {} advisory, {} unweighted",
        w.load_bearing, w.advisory, w.unweighted
    );
    println!(
        "  {} pass, {} warn, {} fail, {}",
        result.pass_count,
        result.warn_count,
        result.fail_count,
        if passed { "PASSED" } else { "FAILED" }
    );
}
