// northwind-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod http;
pub mod json_log;
pub mod parquet_log;

use std::path::Path;

use crate::domain::project::LogFormat;
use crate::error::NorthwindError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::log_store::DqLogStore;

pub use self::duckdb::DuckDBConnector;
pub use http::HttpSourceFetcher;
pub use json_log::JsonLogStore;
pub use parquet_log::ParquetLogStore;

/// Picks the log store adapter for the configured format.
pub fn log_store(format: LogFormat, dir: &Path) -> Box<dyn DqLogStore> {
    match format {
        LogFormat::Parquet => Box::new(ParquetLogStore::new(dir)),
        LogFormat::Json => Box::new(JsonLogStore::new(dir)),
    }
}

pub(crate) fn persistence(path: &Path, reason: impl ToString) -> NorthwindError {
    InfrastructureError::Persistence {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
    .into()
}
