// northwind-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum NorthwindError {
    // --- DOMAIN ERRORS (schema mismatches, rule config, run history) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, DuckDB, DQ log persistence) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl NorthwindError {
    pub fn is_schema_error(&self) -> bool {
        matches!(self, NorthwindError::Domain(e) if e.is_schema_error())
    }

    pub fn is_persistence_error(&self) -> bool {
        matches!(
            self,
            NorthwindError::Infrastructure(InfrastructureError::Persistence { .. })
        )
    }
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for NorthwindError {
    fn from(err: std::io::Error) -> Self {
        NorthwindError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for NorthwindError {
    fn from(err: duckdb::Error) -> Self {
        NorthwindError::Infrastructure(InfrastructureError::from(err))
    }
}
