// northwind-core/src/domain/history.rs
//
// The DQ ledger: one `RunRecord` per validation run, plus the issues it
// found. Append-only; records are never edited once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::domain::quality::{Issue, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Pass,
    Warn,
    Fail,
}

impl RunStatus {
    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.iter().any(|i| i.severity == Severity::Error) {
            Self::Fail
        } else if issues.is_empty() {
            Self::Pass
        } else {
            Self::Warn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PASS" => Ok(Self::Pass),
            "WARN" => Ok(Self::Warn),
            "FAIL" => Ok(Self::Fail),
            _ => Err(format!("Unknown run status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: u64,
    pub stage: String,
    pub run_ts: DateTime<Utc>,
    pub status: RunStatus,
    pub issue_count: u64,
    pub error_count: u64,
    pub warning_count: u64,
}

impl RunRecord {
    /// Summarises `issues` into a record. Counts and status are derived, so
    /// they always agree with the issue list.
    pub fn summarize(run_id: u64, stage: &str, run_ts: DateTime<Utc>, issues: &[Issue]) -> Self {
        let error_count = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count() as u64;
        Self {
            run_id,
            stage: stage.to_string(),
            run_ts,
            status: RunStatus::from_issues(issues),
            issue_count: issues.len() as u64,
            error_count,
            warning_count: issues.len() as u64 - error_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedIssue {
    pub run_id: u64,
    pub rule: String,
    pub severity: Severity,
    pub table: String,
    #[serde(default)]
    pub column: Option<String>,
    pub violations: u64,
    pub detail: String,
}

impl LoggedIssue {
    pub fn from_issue(run_id: u64, issue: &Issue) -> Self {
        Self {
            run_id,
            rule: issue.rule.clone(),
            severity: issue.severity,
            table: issue.table.clone(),
            column: issue.column.clone(),
            violations: issue.violations,
            detail: issue.to_string(),
        }
    }
}

/// Both DQ log tables, kept consistent with each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DqHistory {
    runs: Vec<RunRecord>,
    issues: Vec<LoggedIssue>,
}

impl DqHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the history from what a store read back.
    ///
    /// Issues whose run has no record are left over from an interrupted
    /// commit; they are dropped here so the next write cleans them up.
    pub fn from_parts(
        mut runs: Vec<RunRecord>,
        issues: Vec<LoggedIssue>,
    ) -> Result<Self, DomainError> {
        runs.sort_by_key(|r| r.run_id);
        if let Some(dup) = runs.windows(2).find(|w| w[0].run_id == w[1].run_id) {
            return Err(DomainError::DuplicateRun(dup[1].run_id));
        }

        let known: HashSet<u64> = runs.iter().map(|r| r.run_id).collect();
        let before = issues.len();
        let issues: Vec<LoggedIssue> = issues
            .into_iter()
            .filter(|i| known.contains(&i.run_id))
            .collect();
        if issues.len() < before {
            warn!(
                dropped = before - issues.len(),
                "Ignoring DQ issues that belong to no recorded run"
            );
        }

        Ok(Self { runs, issues })
    }

    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    pub fn issues(&self) -> &[LoggedIssue] {
        &self.issues
    }

    pub fn latest(&self) -> Option<&RunRecord> {
        self.runs.last()
    }

    pub fn next_run_id(&self) -> u64 {
        self.latest().map_or(1, |r| r.run_id + 1)
    }

    pub fn issues_for(&self, run_id: u64) -> impl Iterator<Item = &LoggedIssue> {
        self.issues.iter().filter(move |i| i.run_id == run_id)
    }

    /// The most recent `limit` runs, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &RunRecord> {
        self.runs.iter().rev().take(limit)
    }

    pub fn append(&mut self, record: RunRecord, issues: &[Issue]) -> Result<(), DomainError> {
        if self.latest().is_some_and(|last| record.run_id <= last.run_id) {
            return Err(DomainError::DuplicateRun(record.run_id));
        }
        if record.issue_count != issues.len() as u64 {
            return Err(DomainError::IssueCountMismatch {
                run_id: record.run_id,
                declared: record.issue_count,
                actual: issues.len() as u64,
            });
        }

        self.issues.extend(
            issues
                .iter()
                .map(|issue| LoggedIssue::from_issue(record.run_id, issue)),
        );
        self.runs.push(record);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn issue(severity: Severity) -> Issue {
        Issue::new("unit_price_non_negative", severity, "order_details", "UnitPrice must be >= 0 (bad=1)")
            .on_column("UnitPrice")
    }

    fn record(run_id: u64, issues: &[Issue]) -> RunRecord {
        RunRecord::summarize(run_id, "load", Utc::now(), issues)
    }

    #[test]
    fn test_status_from_issues() {
        assert_eq!(RunStatus::from_issues(&[]), RunStatus::Pass);
        assert_eq!(RunStatus::from_issues(&[issue(Severity::Warning)]), RunStatus::Warn);
        assert_eq!(
            RunStatus::from_issues(&[issue(Severity::Warning), issue(Severity::Error)]),
            RunStatus::Fail
        );
    }

    #[test]
    fn test_summarize_counts() {
        let issues = [issue(Severity::Error), issue(Severity::Warning), issue(Severity::Error)];
        let r = record(3, &issues);
        assert_eq!((r.issue_count, r.error_count, r.warning_count), (3, 2, 1));
        assert_eq!(r.status, RunStatus::Fail);
    }

    #[test]
    fn test_logged_issue_detail_carries_table() {
        let logged = LoggedIssue::from_issue(7, &issue(Severity::Error));
        assert_eq!(logged.detail, "order_details: UnitPrice must be >= 0 (bad=1)");
        assert_eq!(logged.column.as_deref(), Some("UnitPrice"));
    }

    #[test]
    fn test_appends_keep_history() -> Result<()> {
        let mut history = DqHistory::new();
        assert_eq!(history.next_run_id(), 1);

        for n in 0..4u64 {
            let issues: Vec<Issue> = (0..n).map(|_| issue(Severity::Error)).collect();
            let id = history.next_run_id();
            history.append(record(id, &issues), &issues)?;
        }

        let ids: Vec<u64> = history.runs().iter().map(|r| r.run_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        for run in history.runs() {
            assert_eq!(history.issues_for(run.run_id).count() as u64, run.issue_count);
        }
        assert_eq!(history.issues().len(), 6);
        Ok(())
    }

    #[test]
    fn test_append_rejects_stale_run_id() -> Result<()> {
        let mut history = DqHistory::new();
        history.append(record(5, &[]), &[])?;
        assert_eq!(
            history.append(record(5, &[]), &[]).unwrap_err(),
            DomainError::DuplicateRun(5)
        );
        assert!(history.append(record(4, &[]), &[]).is_err());
        assert_eq!(history.runs().len(), 1);
        Ok(())
    }

    #[test]
    fn test_append_rejects_count_mismatch() {
        let mut history = DqHistory::new();
        let issues = [issue(Severity::Error)];
        let err = history.append(record(1, &[]), &issues).unwrap_err();
        assert!(matches!(err, DomainError::IssueCountMismatch { declared: 0, actual: 1, .. }));
        assert!(history.issues().is_empty());
    }

    #[test]
    fn test_from_parts_sorts_and_drops_orphans() -> Result<()> {
        let issues = [issue(Severity::Error)];
        let runs = vec![record(2, &issues), record(1, &[])];
        let logged = vec![
            LoggedIssue::from_issue(2, &issues[0]),
            LoggedIssue::from_issue(3, &issues[0]),
        ];

        let history = DqHistory::from_parts(runs, logged)?;
        assert_eq!(history.runs()[0].run_id, 1);
        assert_eq!(history.issues().len(), 1);
        assert_eq!(history.next_run_id(), 3);
        Ok(())
    }

    #[test]
    fn test_from_parts_rejects_duplicate_ids() {
        let runs = vec![record(1, &[]), record(1, &[])];
        assert_eq!(
            DqHistory::from_parts(runs, vec![]).unwrap_err(),
            DomainError::DuplicateRun(1)
        );
    }

    #[test]
    fn test_recent_is_newest_first() -> Result<()> {
        let mut history = DqHistory::new();
        for id in 1..=5 {
            history.append(record(id, &[]), &[])?;
        }
        let ids: Vec<u64> = history.recent(2).map(|r| r.run_id).collect();
        assert_eq!(ids, vec![5, 4]);
        Ok(())
    }
}
