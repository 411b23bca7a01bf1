// northwind/src/commands/run.rs
//
// USE CASE: Run the pipeline up to a stage.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table};
use northwind_core::application::{PipelineContext, RunResult, Stage, run_pipeline};
use northwind_core::domain::quality::RuleSet;
use northwind_core::infrastructure::adapters::{DuckDBConnector, HttpSourceFetcher, log_store};
use northwind_core::infrastructure::config::load_project_config;
use northwind_core::ports::fetcher::SourceFetcher;

pub async fn execute(project_dir: PathBuf, stage: Stage, no_products: bool) -> anyhow::Result<()> {
    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);

    let rules = RuleSet::from_config(&config.quality).context("Invalid DQ rules")?;
    println!("   DQ rules: {}", rules.len());

    // B. Instantiate the adapters
    let layout = config.layout(&project_dir);
    let connector =
        DuckDBConnector::in_memory().context("Failed to initialize the DuckDB engine")?;
    let fetcher = if config.auto_download {
        Some(
            HttpSourceFetcher::new(&config.source_url)
                .context("Failed to initialize the HTTP client")?,
        )
    } else {
        None
    };
    let store = log_store(config.dq.log_format, &layout.dq());
    println!("   DQ log: {} ({})", layout.dq().display(), config.dq.log_format);

    // C. Run the Pipeline (Application Layer)
    let ctx = PipelineContext {
        config: &config,
        layout,
        use_products: config.use_products && !no_products,
        connector: &connector,
        fetcher: fetcher.as_ref().map(|f| f as &dyn SourceFetcher),
        log_store: store.as_ref(),
        rules: &rules,
    };

    println!("🚀 Running up to stage '{}'...", stage);
    match run_pipeline(&ctx, stage).await {
        Ok(result) => {
            print_summary(&result);
            println!("\n✨ SUCCESS! Pipeline finished in {} ms", result.elapsed_ms);
        }
        Err(e) => {
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_summary(result: &RunResult) {
    if !result.downloaded.is_empty() {
        println!("   Downloaded: {}", result.downloaded.join(", "));
    }
    println!("   Sources: {}", result.sources.join(", "));

    for (table, rows) in &result.row_counts {
        println!("   ✔ {:<15} {} rows", table, rows);
    }

    if let Some(run) = &result.dq_run {
        println!(
            "\n🧪 DQ run #{}: {} ({} errors, {} warnings)",
            run.run_id, run.status, run.error_count, run.warning_count
        );
        if !result.issues.is_empty() {
            let mut table = Table::new();
            table
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Severity", "Rule", "Table", "Violations", "Message"]);
            for issue in &result.issues {
                table.add_row(vec![
                    issue.severity.to_string(),
                    issue.rule.clone(),
                    issue.table.clone(),
                    issue.violations.to_string(),
                    issue.message.clone(),
                ]);
            }
            println!("{table}");
        }
    }

    for (model, rows) in &result.models {
        println!("   📦 {:<15} {} rows", model, rows);
    }
    for artifact in &result.artifacts {
        println!("   💾 {}", artifact.display());
    }
}
