// northwind-core/src/application/pipeline.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::application::{build, extract, load, transform};
use crate::domain::history::RunRecord;
use crate::domain::project::{DataLayout, ProjectConfig};
use crate::domain::quality::{Issue, RuleSet};
use crate::error::NorthwindError;
use crate::ports::connector::Connector;
use crate::ports::fetcher::SourceFetcher;
use crate::ports::log_store::DqLogStore;

/// Pipeline stages, in execution order. Running a stage runs every earlier
/// one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extract,
    Load,
    Transform,
    Build,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Load => "load",
            Self::Transform => "transform",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extract" => Ok(Self::Extract),
            "load" => Ok(Self::Load),
            "transform" => Ok(Self::Transform),
            "build" | "all" => Ok(Self::Build),
            other => Err(format!("Unknown stage: {}", other)),
        }
    }
}

/// Everything a stage needs, borrowed for the length of one run.
pub struct PipelineContext<'a> {
    pub config: &'a ProjectConfig,
    pub layout: DataLayout,
    pub use_products: bool,
    pub connector: &'a dyn Connector,
    pub fetcher: Option<&'a dyn SourceFetcher>,
    pub log_store: &'a dyn DqLogStore,
    pub rules: &'a RuleSet,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub stages: Vec<Stage>,
    pub sources: Vec<String>,
    pub downloaded: Vec<String>,
    pub row_counts: BTreeMap<String, usize>,
    pub dq_run: Option<RunRecord>,
    pub issues: Vec<Issue>,
    pub models: BTreeMap<String, u64>,
    pub artifacts: Vec<PathBuf>,
    pub elapsed_ms: u128,
}

pub async fn run_pipeline(
    ctx: &PipelineContext<'_>,
    target: Stage,
) -> Result<RunResult, NorthwindError> {
    let start_time = Instant::now();
    info!(stage = %target, products = ctx.use_products, "Starting pipeline");
    let mut result = RunResult::default();

    // 1. EXTRACT
    let extracted = extract::extract(ctx).await?;
    result.stages.push(Stage::Extract);
    result.sources = names(&extracted.registered);
    result.downloaded = names(&extracted.downloaded);

    if target >= Stage::Load {
        // 2. LOAD (+ DQ)
        let loaded = load::load(ctx, &extracted).await?;
        result.stages.push(Stage::Load);
        result.row_counts = loaded.row_counts;
        result.issues = loaded.issues;
        result.dq_run = Some(loaded.run);

        if target >= Stage::Transform {
            // 3. TRANSFORM
            let models = transform::transform(ctx, &loaded.tables).await?;
            result.stages.push(Stage::Transform);
            result.models = models.models.clone();

            if target >= Stage::Build {
                // 4. BUILD
                let built = build::build(ctx, &models).await?;
                result.stages.push(Stage::Build);
                result.artifacts = built.artifacts;
            }
        }
    }

    result.elapsed_ms = start_time.elapsed().as_millis();
    info!(elapsed_ms = result.elapsed_ms as u64, "Pipeline finished");
    Ok(result)
}

fn names<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(|t| t.to_string()).collect()
}
