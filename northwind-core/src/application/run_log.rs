// northwind-core/src/application/run_log.rs

use chrono::Utc;
use tracing::{info, instrument};

use crate::domain::history::RunRecord;
use crate::domain::quality::Issue;
use crate::error::NorthwindError;
use crate::ports::log_store::DqLogStore;

/// Appends validation runs to the DQ logs: read, merge, rewrite.
pub struct RunLogger<'a> {
    store: &'a dyn DqLogStore,
}

impl<'a> RunLogger<'a> {
    pub fn new(store: &'a dyn DqLogStore) -> Self {
        Self { store }
    }

    /// Records one run of `stage` with its issues, numbered after the last
    /// logged run and stamped with the current UTC time.
    #[instrument(skip(self, issues), fields(issues = issues.len()))]
    pub fn log_run(&self, stage: &str, issues: &[Issue]) -> Result<RunRecord, NorthwindError> {
        let mut history = self.store.load()?;
        let record = RunRecord::summarize(history.next_run_id(), stage, Utc::now(), issues);

        history.append(record.clone(), issues)?;
        self.store.save(&history)?;

        info!(
            run_id = record.run_id,
            status = %record.status,
            errors = record.error_count,
            warnings = record.warning_count,
            "DQ run logged"
        );
        Ok(record)
    }

    /// Appends a caller-built record. Rejected if its id is not newer than
    /// every logged run or if its issue count disagrees with `issues`.
    pub fn append(&self, record: RunRecord, issues: &[Issue]) -> Result<(), NorthwindError> {
        let mut history = self.store.load()?;
        let run_id = record.run_id;
        history.append(record, issues)?;
        self.store.save(&history)?;
        info!(run_id, "DQ run appended");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::error::DomainError;
    use crate::domain::history::RunStatus;
    use crate::domain::quality::Severity;
    use crate::infrastructure::adapters::{JsonLogStore, ParquetLogStore};
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn issues(n: usize) -> Vec<Issue> {
        (0..n)
            .map(|i| {
                Issue::new(
                    "unit_price_non_negative",
                    if i % 2 == 0 { Severity::Error } else { Severity::Warning },
                    "order_details",
                    format!("UnitPrice must be >= 0 (bad={})", i + 1),
                )
            })
            .collect()
    }

    fn exercise(store: &dyn DqLogStore) -> Result<()> {
        let logger = RunLogger::new(store);

        let mut ids = Vec::new();
        for n in [2usize, 0, 3] {
            ids.push(logger.log_run("load", &issues(n))?.run_id);
        }
        assert_eq!(ids, vec![1, 2, 3]);

        let history = store.load()?;
        assert_eq!(history.runs().len(), 3);
        assert!(history.runs().windows(2).all(|w| w[0].run_id < w[1].run_id));
        for run in history.runs() {
            assert_eq!(history.issues_for(run.run_id).count() as u64, run.issue_count);
        }
        assert_eq!(history.runs()[1].status, RunStatus::Pass);
        assert_eq!(history.runs()[2].status, RunStatus::Fail);
        Ok(())
    }

    #[test]
    fn test_log_run_with_json_store() -> Result<()> {
        let dir = tempdir()?;
        exercise(&JsonLogStore::new(dir.path()))
    }

    #[test]
    fn test_log_run_with_parquet_store() -> Result<()> {
        let dir = tempdir()?;
        exercise(&ParquetLogStore::new(dir.path()))
    }

    #[test]
    fn test_append_rejects_stale_record() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonLogStore::new(dir.path());
        let logger = RunLogger::new(&store);
        let first = logger.log_run("load", &issues(1))?;

        let stale = RunRecord::summarize(first.run_id, "load", Utc::now(), &[]);
        let err = logger.append(stale, &[]).unwrap_err();
        assert!(matches!(err, NorthwindError::Domain(DomainError::DuplicateRun(1))));

        let next = RunRecord::summarize(10, "load", Utc::now(), &[]);
        logger.append(next, &[])?;
        assert_eq!(store.load()?.next_run_id(), 11);
        Ok(())
    }

    #[test]
    fn test_corrupt_store_is_surfaced_and_untouched() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonLogStore::new(dir.path());
        let (runs_path, _) = store.paths();
        fs::write(&runs_path, "[{\"run_id\": ")?;

        let err = RunLogger::new(&store).log_run("load", &issues(1)).unwrap_err();
        assert!(err.is_persistence_error());
        assert_eq!(fs::read_to_string(&runs_path)?, "[{\"run_id\": ");
        Ok(())
    }

    #[test]
    fn test_unwritable_log_dir_is_a_persistence_error() -> Result<()> {
        let dir = tempdir()?;
        let dq = dir.path().join("_dq");
        fs::write(&dq, b"")?;

        let stores: [Box<dyn DqLogStore>; 2] = [
            Box::new(JsonLogStore::new(&dq)),
            Box::new(ParquetLogStore::new(&dq)),
        ];
        for store in &stores {
            let err = RunLogger::new(store.as_ref()).log_run("load", &issues(1)).unwrap_err();
            assert!(err.is_persistence_error(), "unexpected error: {err}");
        }
        assert!(dq.is_file());
        Ok(())
    }
}
