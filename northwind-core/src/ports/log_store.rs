// northwind-core/src/ports/log_store.rs

use crate::domain::history::DqHistory;
use crate::error::NorthwindError;
use std::path::PathBuf;

/// Durable storage for the DQ run and issue logs.
///
/// `save` rewrites both logs from the full history. Implementations must
/// leave the previous content in place if anything fails before the final
/// rename.
pub trait DqLogStore: Send + Sync {
    /// Reads both logs. Missing files mean an empty history.
    fn load(&self) -> Result<DqHistory, NorthwindError>;

    fn save(&self, history: &DqHistory) -> Result<(), NorthwindError>;

    /// Paths of the runs log and the issues log, in that order.
    fn paths(&self) -> (PathBuf, PathBuf);
}
