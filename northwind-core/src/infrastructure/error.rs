// northwind-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(northwind::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(northwind::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- DQ LOGS ---
    #[error("Persistence Error on '{path}': {reason}")]
    #[diagnostic(
        code(northwind::infra::persistence),
        help("The DQ log was left untouched. Fix the file or its permissions and re-run.")
    )]
    Persistence { path: String, reason: String },

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(northwind::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(northwind::infra::config_missing))]
    ConfigNotFound(String),

    // --- RAW SOURCES ---
    #[error("Missing required files: {}", .0.join(", "))]
    #[diagnostic(
        code(northwind::infra::sources_missing),
        help("Place the Northwind CSVs in the raw folder or enable auto-download.")
    )]
    MissingSources(Vec<String>),

    #[error("Download of '{url}' failed: {source}")]
    #[diagnostic(code(northwind::infra::download))]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// Manual implementation for shortcuts (e.g. `?` operator on duckdb calls)
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<anyhow::Error> for InfrastructureError {
    fn from(err: anyhow::Error) -> Self {
        InfrastructureError::ConfigError(format!("{:#}", err))
    }
}
