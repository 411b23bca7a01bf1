// northwind-core/src/infrastructure/adapters/json_log.rs

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::history::{DqHistory, LoggedIssue, RunRecord};
use crate::error::NorthwindError;
use crate::infrastructure::adapters::persistence;
use crate::infrastructure::fs::{StagedFile, commit_all};
use crate::ports::log_store::DqLogStore;

pub const RUNS_FILE: &str = "dq_runs.json";
pub const ISSUES_FILE: &str = "dq_issues.json";

/// DQ logs as two pretty-printed JSON arrays.
#[derive(Debug, Clone)]
pub struct JsonLogStore {
    dir: PathBuf,
}

impl JsonLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn read_log<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, NorthwindError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path).map_err(|e| persistence(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| persistence(path, e))
}

fn stage_log<T: Serialize>(path: &Path, rows: &[T]) -> Result<StagedFile, NorthwindError> {
    let bytes = serde_json::to_vec_pretty(rows).map_err(|e| persistence(path, e))?;
    StagedFile::write(path, &bytes).map_err(|e| persistence(path, e))
}

impl DqLogStore for JsonLogStore {
    fn load(&self) -> Result<DqHistory, NorthwindError> {
        let (runs_path, issues_path) = self.paths();
        let runs: Vec<RunRecord> = read_log(&runs_path)?;
        let issues: Vec<LoggedIssue> = read_log(&issues_path)?;
        debug!(runs = runs.len(), issues = issues.len(), "Loaded JSON DQ logs");
        Ok(DqHistory::from_parts(runs, issues)?)
    }

    fn save(&self, history: &DqHistory) -> Result<(), NorthwindError> {
        fs::create_dir_all(&self.dir).map_err(|e| persistence(&self.dir, e))?;
        let (runs_path, issues_path) = self.paths();

        // Issues first, runs last: a reader never sees a run without its issues.
        let staged = vec![
            stage_log(&issues_path, history.issues())?,
            stage_log(&runs_path, history.runs())?,
        ];
        commit_all(staged).map_err(|e| persistence(&runs_path, e))
    }

    fn paths(&self) -> (PathBuf, PathBuf) {
        (self.dir.join(RUNS_FILE), self.dir.join(ISSUES_FILE))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::quality::{Issue, Severity};
    use anyhow::Result;
    use chrono::Utc;
    use tempfile::tempdir;

    fn issue() -> Issue {
        Issue::new("orders_customer_fk", Severity::Error, "orders", "CustomerID has 1 value(s) missing from customers.CustomerID (e.g. ZZZZ)")
            .on_column("CustomerID")
    }

    fn append(history: &mut DqHistory, issues: &[Issue]) -> Result<()> {
        let record = RunRecord::summarize(history.next_run_id(), "load", Utc::now(), issues);
        history.append(record, issues)?;
        Ok(())
    }

    #[test]
    fn test_missing_files_mean_empty_history() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonLogStore::new(dir.path().join("_dq"));
        assert_eq!(store.load()?, DqHistory::new());
        Ok(())
    }

    #[test]
    fn test_save_then_load_keeps_every_run() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonLogStore::new(dir.path().join("_dq"));

        let mut history = store.load()?;
        append(&mut history, &[issue()])?;
        store.save(&history)?;

        let mut history = store.load()?;
        append(&mut history, &[])?;
        store.save(&history)?;

        let reloaded = store.load()?;
        assert_eq!(reloaded.runs().len(), 2);
        assert_eq!(reloaded.issues_for(1).count(), 1);
        assert_eq!(reloaded, history);
        Ok(())
    }

    #[test]
    fn test_corrupt_log_is_a_persistence_error_and_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonLogStore::new(dir.path());
        let (runs_path, _) = store.paths();
        fs::write(&runs_path, b"{ not json")?;

        let err = store.load().unwrap_err();
        assert!(err.is_persistence_error());
        assert_eq!(fs::read(&runs_path)?, b"{ not json");
        Ok(())
    }

    #[test]
    fn test_orphan_issues_are_dropped_on_load() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonLogStore::new(dir.path());
        let (_, issues_path) = store.paths();
        let orphan = LoggedIssue::from_issue(9, &issue());
        fs::write(&issues_path, serde_json::to_vec(&vec![orphan])?)?;

        let history = store.load()?;
        assert!(history.issues().is_empty());
        assert_eq!(history.next_run_id(), 1);
        Ok(())
    }
}
