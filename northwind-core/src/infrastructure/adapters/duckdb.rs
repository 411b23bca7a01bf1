// northwind-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use duckdb::{Config, Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// Imports Hexagonaux
use crate::domain::error::DomainError;
use crate::domain::table::{DataType, Schema, Table, Value};
use crate::error::NorthwindError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::StagedFile;
use crate::ports::connector::{ColumnSchema, Connector, quote_ident, quote_literal};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, InfrastructureError> {
        Self::new(":memory:")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, NorthwindError> {
        self.conn.lock().map_err(|_| {
            NorthwindError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn read_cell(
    row: &duckdb::Row<'_>,
    idx: usize,
    data_type: DataType,
) -> Result<Result<Value, String>, duckdb::Error> {
    let value = match data_type {
        DataType::Integer => Ok(row.get::<_, Option<i64>>(idx)?.into()),
        DataType::Float => Ok(row.get::<_, Option<f64>>(idx)?.into()),
        DataType::Text => Ok(row.get::<_, Option<String>>(idx)?.into()),
        DataType::Timestamp => match row.get::<_, Option<String>>(idx)? {
            None => Ok(Value::Null),
            Some(raw) => parse_timestamp(&raw).map(Value::Timestamp).ok_or(raw),
        },
    };
    Ok(value)
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, query: &str) -> Result<(), NorthwindError> {
        debug!(sql = query, "DuckDB execute");
        let conn = self.lock()?;
        conn.execute_batch(query)?;
        Ok(())
    }

    async fn fetch_columns(&self, relation: &str) -> Result<Vec<ColumnSchema>, NorthwindError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
        )?;

        let rows = stmt.query_map(params![relation], |row| {
            Ok(ColumnSchema {
                name: row.get(0)?,
                data_type: row.get(1)?,
                is_nullable: row.get::<_, String>(2)? == "YES",
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        Ok(columns)
    }

    async fn register_source(&self, name: &str, path: &Path) -> Result<(), NorthwindError> {
        let query = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM read_csv_auto({}, header = true, quote = '\"')",
            quote_ident(name),
            quote_literal(&path.to_string_lossy())
        );
        self.execute(&query).await
    }

    async fn fetch_table(&self, relation: &str, schema: &Schema) -> Result<Table, NorthwindError> {
        let projection = schema
            .columns()
            .iter()
            .map(|c| {
                let col = quote_ident(&c.name);
                format!("CAST({} AS {}) AS {}", col, c.data_type.sql_type(), col)
            })
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT {} FROM {}", projection, quote_ident(relation));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&query)?;
        let mut rows = stmt.query([])?;

        let mut cells = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(schema.len());
            for (idx, column) in schema.columns().iter().enumerate() {
                match read_cell(row, idx, column.data_type)? {
                    Ok(v) => values.push(v),
                    Err(raw) => {
                        return Err(DomainError::InvalidValue {
                            table: relation.to_string(),
                            column: column.name.clone(),
                            row: cells.len(),
                            value: raw,
                            expected: column.data_type.to_string(),
                        }
                        .into());
                    }
                }
            }
            cells.push(values);
        }

        Ok(Table::try_new(relation, schema.clone(), cells)?)
    }

    async fn export_parquet(&self, relation: &str, path: &Path) -> Result<(), NorthwindError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let staged = StagedFile::reserve(path, ".parquet")?;
        let query = format!(
            "COPY (SELECT * FROM {}) TO {} (FORMAT PARQUET)",
            quote_ident(relation),
            quote_literal(&staged.path().to_string_lossy())
        );
        self.execute(&query).await?;
        staged.commit()?;
        Ok(())
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, NorthwindError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let mut rows = stmt.query([])?;

        let row = rows
            .next()?
            .ok_or_else(|| NorthwindError::InternalError("No scalar value returned".into()))?;

        let value: i64 = row.get(0)?;
        u64::try_from(value)
            .map_err(|_| NorthwindError::InternalError(format!("Negative scalar: {}", value)))
    }
}
