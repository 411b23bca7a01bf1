// northwind-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, PartialEq)]
pub enum DomainError {
    // --- SCHEMA (fatal: the upstream cleaning step and the rules disagree) ---
    #[error("Schema Error: table '{0}' was not supplied")]
    #[diagnostic(
        code(northwind::domain::schema::missing_table),
        help("Check that the load stage produced this table before validation.")
    )]
    MissingTable(String),

    #[error("Schema Error: table '{table}' is missing required column '{column}'")]
    #[diagnostic(
        code(northwind::domain::schema::missing_column),
        help("Column names are matched case-insensitively against the raw CSV header.")
    )]
    MissingColumn { table: String, column: String },

    #[error("Schema Error: column '{table}.{column}' is {actual}, expected {expected}")]
    #[diagnostic(code(northwind::domain::schema::column_type))]
    ColumnType {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Schema Error: row {row} of '{table}' has {actual} values, schema declares {expected}")]
    #[diagnostic(code(northwind::domain::schema::row_shape))]
    RowShape {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Schema Error: row {row} of '{table}.{column}' holds {value}, which is not a {expected}")]
    #[diagnostic(code(northwind::domain::schema::invalid_value))]
    InvalidValue {
        table: String,
        column: String,
        row: usize,
        value: String,
        expected: String,
    },

    // --- RULE CONFIGURATION ---
    #[error("Invalid quality rule '{name}': {reason}")]
    #[diagnostic(
        code(northwind::domain::rule),
        help("Check config/quality.yml: every rule needs a unique name and the fields of its kind.")
    )]
    InvalidRule { name: String, reason: String },

    // --- RUN HISTORY ---
    #[error("Run {0} is not newer than the runs already in the DQ log")]
    #[diagnostic(code(northwind::domain::history::duplicate_run))]
    DuplicateRun(u64),

    #[error("Run {run_id} declares {declared} issue(s) but {actual} were supplied")]
    #[diagnostic(code(northwind::domain::history::issue_count))]
    IssueCountMismatch {
        run_id: u64,
        declared: u64,
        actual: u64,
    },
}

impl DomainError {
    /// True for the errors that mean "the tables do not have the expected shape".
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::MissingTable(_)
                | Self::MissingColumn { .. }
                | Self::ColumnType { .. }
                | Self::RowShape { .. }
                | Self::InvalidValue { .. }
        )
    }
}
