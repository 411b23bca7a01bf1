// northwind/src/commands/report.rs
//
// USE CASE: Read the DQ logs (read-only) and list the model artifacts.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table};
use northwind_core::application::build_report;
use northwind_core::infrastructure::adapters::log_store;
use northwind_core::infrastructure::config::load_project_config;

pub fn execute(project_dir: PathBuf, limit: usize) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    let layout = config.layout(&project_dir);
    let store = log_store(config.dq.log_format, &layout.dq());

    let report = build_report(store.as_ref(), &layout.model(), limit)
        .with_context(|| format!("Failed to read the DQ logs in {:?}", layout.dq()))?;

    println!("📋 DQ report for {} (v{})", config.name, config.version);
    if report.is_empty() {
        println!("   No DQ runs logged yet. 👉 Run 'northwind run --stage load' first.");
    } else {
        println!(
            "   {} run(s), {} issue(s) logged in total",
            report.total_runs, report.total_issues
        );

        let mut runs = Table::new();
        runs.set_header(vec!["Run", "Stage", "Timestamp (UTC)", "Status", "Errors", "Warnings"]);
        for run in &report.recent_runs {
            runs.add_row(vec![
                run.run_id.to_string(),
                run.stage.clone(),
                run.run_ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                run.status.to_string(),
                run.error_count.to_string(),
                run.warning_count.to_string(),
            ]);
        }
        println!("{runs}");

        if let Some(latest) = &report.latest {
            println!("\n🧪 Issues of run #{} ({})", latest.run_id, latest.status);
            if report.latest_issues.is_empty() {
                println!("   None.");
            } else {
                let mut issues = Table::new();
                issues
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["Severity", "Rule", "Violations", "Detail"]);
                for issue in &report.latest_issues {
                    issues.add_row(vec![
                        issue.severity.to_string(),
                        issue.rule.clone(),
                        issue.violations.to_string(),
                        issue.detail.clone(),
                    ]);
                }
                println!("{issues}");
            }
        }
    }

    println!("\n📦 Model artifacts in {}", layout.model().display());
    if report.artifacts.is_empty() {
        println!("   None.");
    }
    for artifact in &report.artifacts {
        println!("   💾 {}", artifact.display());
    }

    Ok(())
}
