// northwind-core/src/application/report.rs

use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::history::{DqHistory, LoggedIssue, RunRecord};
use crate::error::NorthwindError;
use crate::ports::log_store::DqLogStore;

// --- DTOs ---
// What the `report` command prints. Built read-only from the logs.

#[derive(Debug, Clone, Serialize)]
pub struct DqReport {
    pub total_runs: usize,
    pub total_issues: usize,
    /// Newest first.
    pub recent_runs: Vec<RunRecord>,
    pub latest: Option<RunRecord>,
    pub latest_issues: Vec<LoggedIssue>,
    pub artifacts: Vec<PathBuf>,
}

impl DqReport {
    pub fn from_history(history: &DqHistory, limit: usize) -> Self {
        let latest = history.latest().cloned();
        let latest_issues = latest
            .as_ref()
            .map(|run| history.issues_for(run.run_id).cloned().collect())
            .unwrap_or_default();

        Self {
            total_runs: history.runs().len(),
            total_issues: history.issues().len(),
            recent_runs: history.recent(limit).cloned().collect(),
            latest,
            latest_issues,
            artifacts: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_runs == 0
    }
}

/// Parquet files under the model folder, sorted by path. A missing folder
/// just means nothing was built yet.
pub fn model_artifacts(model_dir: &Path) -> Vec<PathBuf> {
    if !model_dir.exists() {
        return vec![];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(model_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "parquet"))
        .collect();
    files.sort();
    files
}

pub fn build_report(
    store: &dyn DqLogStore,
    model_dir: &Path,
    limit: usize,
) -> Result<DqReport, NorthwindError> {
    let history = store.load()?;
    let mut report = DqReport::from_history(&history, limit);
    report.artifacts = model_artifacts(model_dir);
    Ok(report)
}
