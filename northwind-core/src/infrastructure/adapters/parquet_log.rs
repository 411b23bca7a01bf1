// northwind-core/src/infrastructure/adapters/parquet_log.rs
//
// DQ logs as Parquet files, read and written through a throwaway in-memory
// DuckDB. Timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use duckdb::{Connection, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::history::{DqHistory, LoggedIssue, RunRecord};
use crate::error::NorthwindError;
use crate::infrastructure::adapters::persistence;
use crate::infrastructure::fs::{StagedFile, commit_all};
use crate::ports::connector::quote_literal;
use crate::ports::log_store::DqLogStore;

pub const RUNS_FILE: &str = "dq_runs.parquet";
pub const ISSUES_FILE: &str = "dq_issues.parquet";

const RUNS_DDL: &str = "CREATE TABLE dq_runs (
    run_id BIGINT, stage VARCHAR, run_ts VARCHAR, status VARCHAR,
    issue_count BIGINT, error_count BIGINT, warning_count BIGINT)";

const ISSUES_DDL: &str = "CREATE TABLE dq_issues (
    run_id BIGINT, rule VARCHAR, severity VARCHAR, \"table\" VARCHAR,
    \"column\" VARCHAR, violations BIGINT, detail VARCHAR)";

#[derive(Debug, Clone)]
pub struct ParquetLogStore {
    dir: PathBuf,
}

impl ParquetLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn open(path: &Path) -> Result<Connection, NorthwindError> {
    Connection::open_in_memory().map_err(|e| persistence(path, e))
}

fn count(path: &Path, value: i64) -> Result<u64, NorthwindError> {
    u64::try_from(value).map_err(|_| persistence(path, format!("negative value {}", value)))
}

fn read_runs(path: &Path) -> Result<Vec<RunRecord>, NorthwindError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let conn = open(path)?;
    let sql = format!(
        "SELECT run_id, stage, run_ts, status, issue_count, error_count, warning_count \
         FROM read_parquet({}) ORDER BY run_id",
        quote_literal(&path.to_string_lossy())
    );

    let raw = (|| -> Result<Vec<_>, duckdb::Error> {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;
        rows.collect()
    })()
    .map_err(|e| persistence(path, e))?;

    raw.into_iter()
        .map(|(run_id, stage, run_ts, status, issues, errors, warnings)| {
            Ok(RunRecord {
                run_id: count(path, run_id)?,
                stage,
                run_ts: DateTime::parse_from_rfc3339(&run_ts)
                    .map_err(|e| persistence(path, e))?
                    .with_timezone(&Utc),
                status: status.parse().map_err(|e: String| persistence(path, e))?,
                issue_count: count(path, issues)?,
                error_count: count(path, errors)?,
                warning_count: count(path, warnings)?,
            })
        })
        .collect()
}

fn read_issues(path: &Path) -> Result<Vec<LoggedIssue>, NorthwindError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let conn = open(path)?;
    let sql = format!(
        "SELECT run_id, rule, severity, \"table\", \"column\", violations, detail \
         FROM read_parquet({})",
        quote_literal(&path.to_string_lossy())
    );

    let raw = (|| -> Result<Vec<_>, duckdb::Error> {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        rows.collect()
    })()
    .map_err(|e| persistence(path, e))?;

    raw.into_iter()
        .map(|(run_id, rule, severity, table, column, violations, detail)| {
            Ok(LoggedIssue {
                run_id: count(path, run_id)?,
                rule,
                severity: severity.parse().map_err(|e: String| persistence(path, e))?,
                table,
                column,
                violations: count(path, violations)?,
                detail,
            })
        })
        .collect()
}

fn write_tables(conn: &Connection, history: &DqHistory) -> Result<(), duckdb::Error> {
    conn.execute_batch(RUNS_DDL)?;
    conn.execute_batch(ISSUES_DDL)?;

    let mut insert_run = conn.prepare("INSERT INTO dq_runs VALUES (?, ?, ?, ?, ?, ?, ?)")?;
    for run in history.runs() {
        insert_run.execute(params![
            run.run_id as i64,
            run.stage,
            run.run_ts.to_rfc3339(),
            run.status.as_str(),
            run.issue_count as i64,
            run.error_count as i64,
            run.warning_count as i64,
        ])?;
    }

    let mut insert_issue = conn.prepare("INSERT INTO dq_issues VALUES (?, ?, ?, ?, ?, ?, ?)")?;
    for issue in history.issues() {
        insert_issue.execute(params![
            issue.run_id as i64,
            issue.rule,
            issue.severity.as_str(),
            issue.table,
            issue.column,
            issue.violations as i64,
            issue.detail,
        ])?;
    }
    Ok(())
}

fn copy_to(conn: &Connection, table: &str, staged: &StagedFile) -> Result<(), duckdb::Error> {
    conn.execute_batch(&format!(
        "COPY {} TO {} (FORMAT PARQUET)",
        table,
        quote_literal(&staged.path().to_string_lossy())
    ))
}

impl DqLogStore for ParquetLogStore {
    fn load(&self) -> Result<DqHistory, NorthwindError> {
        let (runs_path, issues_path) = self.paths();
        let runs = read_runs(&runs_path)?;
        let issues = read_issues(&issues_path)?;
        debug!(runs = runs.len(), issues = issues.len(), "Loaded Parquet DQ logs");
        Ok(DqHistory::from_parts(runs, issues)?)
    }

    fn save(&self, history: &DqHistory) -> Result<(), NorthwindError> {
        fs::create_dir_all(&self.dir).map_err(|e| persistence(&self.dir, e))?;
        let (runs_path, issues_path) = self.paths();

        let conn = open(&runs_path)?;
        write_tables(&conn, history).map_err(|e| persistence(&runs_path, e))?;

        let issues = StagedFile::reserve(&issues_path, ".parquet")
            .map_err(|e| persistence(&issues_path, e))?;
        copy_to(&conn, "dq_issues", &issues).map_err(|e| persistence(&issues_path, e))?;

        let runs = StagedFile::reserve(&runs_path, ".parquet")
            .map_err(|e| persistence(&runs_path, e))?;
        copy_to(&conn, "dq_runs", &runs).map_err(|e| persistence(&runs_path, e))?;

        // Issues first, runs last: a reader never sees a run without its issues.
        commit_all(vec![issues, runs]).map_err(|e| persistence(&runs_path, e))
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
    use tempfile::tempdir;

    fn issues() -> Vec<Issue> {
        vec![
            Issue::new("discount_unit_interval", Severity::Error, "order_details", "Discount must be within [0, 1] (bad=1)")
                .on_column("Discount"),
            Issue::new("quantity_upper_bound", Severity::Warning, "order_details", "Quantity must be <= 1000 (bad=1)")
                .on_column("Quantity"),
        ]
    }

    fn append(history: &mut DqHistory, issues: &[Issue]) -> Result<()> {
        let record = RunRecord::summarize(history.next_run_id(), "load", Utc::now(), issues);
        history.append(record, issues)?;
        Ok(())
    }

    #[test]
    fn test_round_trip_keeps_history() -> Result<()> {
        let dir = tempdir()?;
        let store = ParquetLogStore::new(dir.path().join("_dq"));

        let mut history = store.load()?;
        append(&mut history, &issues())?;
        store.save(&history)?;

        let mut history = store.load()?;
        assert_eq!(history.runs().len(), 1);
        append(&mut history, &[])?;
        store.save(&history)?;

        let reloaded = store.load()?;
        assert_eq!(reloaded, history);
        assert_eq!(reloaded.runs()[1].run_id, 2);
        assert_eq!(reloaded.issues_for(1).count(), 2);
        assert_eq!(reloaded.issues()[0].column.as_deref(), Some("Discount"));
        assert_eq!(reloaded.issues()[1].severity, Severity::Warning);
        Ok(())
    }

    #[test]
    fn test_empty_history_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let store = ParquetLogStore::new(dir.path());
        store.save(&DqHistory::new())?;

        let (runs_path, issues_path) = store.paths();
        assert!(runs_path.exists() && issues_path.exists());
        assert_eq!(store.load()?, DqHistory::new());
        Ok(())
    }

    #[test]
    fn test_corrupt_log_is_a_persistence_error_and_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let store = ParquetLogStore::new(dir.path());
        let (runs_path, _) = store.paths();
        fs::write(&runs_path, b"PAR1 definitely not parquet")?;

        let err = store.load().unwrap_err();
        assert!(err.is_persistence_error());
        assert_eq!(fs::read(&runs_path)?, b"PAR1 definitely not parquet");
        Ok(())
    }

    #[test]
    fn test_save_leaves_no_temporaries() -> Result<()> {
        let dir = tempdir()?;
        let store = ParquetLogStore::new(dir.path());
        let mut history = DqHistory::new();
        append(&mut history, &issues())?;
        store.save(&history)?;

        let mut names: Vec<String> = fs::read_dir(dir.path())?
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![ISSUES_FILE, RUNS_FILE]);
        Ok(())
    }
}
