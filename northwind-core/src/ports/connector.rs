// northwind-core/src/ports/connector.rs

// What the stages need from a SQL engine, without knowing which one runs it.

use crate::domain::table::{Schema, Table};
use crate::error::NorthwindError;
use async_trait::async_trait;
use std::path::Path;

// Struct simple pour décrire une colonne (indépendant de la DB)
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), NorthwindError>;

    async fn fetch_columns(&self, relation: &str) -> Result<Vec<ColumnSchema>, NorthwindError>;

    /// Exposes a CSV file as a view named `name`.
    async fn register_source(&self, name: &str, path: &Path) -> Result<(), NorthwindError>;

    /// Reads a relation into a typed table. Each schema column is cast to
    /// its SQL type on the way out.
    async fn fetch_table(&self, relation: &str, schema: &Schema) -> Result<Table, NorthwindError>;

    /// Writes a relation to a Parquet file, replacing it.
    async fn export_parquet(&self, relation: &str, path: &Path) -> Result<(), NorthwindError>;

    async fn query_scalar(&self, query: &str) -> Result<u64, NorthwindError>;
}

/// Double-quotes an identifier for SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quotes a string (usually a path) for SQL.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
