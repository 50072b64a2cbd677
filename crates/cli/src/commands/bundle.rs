//! `adf bundle`: resolve and merge the modules a task needs.

use super::{load_bundle, read_manifest, task_keywords};
use adf_config::AdfConfig;
use adf_manifest::BundleResult;

pub async fn run(task: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AdfConfig::load()?;
    let manifest = read_manifest(&config).await?;
    let keywords = task_keywords(&task, config.bundle.min_keyword_len);

    let result = match load_bundle(&config, &manifest, &keywords).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        // Document on stdout, report on stderr, so the output can be piped.
        print!("{}", adf_syntax::format(&result.document));
        print_report(&result);
    }
    Ok(())
}

fn print_report(result: &BundleResult) {
    eprintln!();
    eprintln!("📦 Bundle");
    eprintln!("─────────────────────────────────────");
    eprintln!("  Modules:  {}", result.modules.join(", "));
    match (result.token_budget, result.token_utilization) {
        (Some(budget), Some(utilization)) => eprintln!(
            "  Tokens:   ~{} / {} ({:.1}%) {}",
            result.token_estimate,
            budget,
            utilization * 100.0,
            if result.over_budget() { "⛔ OVER BUDGET" } else { "✅" }
        ),
        _ => eprintln!("  Tokens:   ~{}", result.token_estimate),
    }

    for entry in &result.trigger_report {
        let reason = match entry.load_reason {
            Some(reason) => format!("{reason:?}").to_lowercase(),
            None => "skipped".into(),
        };
        if entry.matched_keywords.is_empty() {
            eprintln!("    {:<28} {}", entry.path, reason);
        } else {
            eprintln!(
                "    {:<28} {} ({})",
                entry.path,
                reason,
                entry.matched_keywords.join(", ")
            );
        }
    }

    for overrun in &result.module_budget_overruns {
        eprintln!(
            "  ⚠️  {} uses ~{} tokens, budget {}",
            overrun.path, overrun.tokens, overrun.budget
        );
    }
    if !result.advisory_only_modules.is_empty() {
        eprintln!(
            "  Advisory only: {}",
            result.advisory_only_modules.join(", ")
        );
    }
}
