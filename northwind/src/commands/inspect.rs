// northwind/src/commands/inspect.rs
//
// USE CASE: Inspect a Parquet file (schema + row count + sample rows).

use comfy_table::Table;
use duckdb::{Connection, Row};
use northwind_core::ports::connector::quote_literal;
use std::path::PathBuf;

pub fn execute(file: PathBuf, limit: usize) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!(
            "❌ Parquet file not found at: {}\n👉 Have you run 'northwind run'?",
            file.display()
        );
    }

    let conn = Connection::open_in_memory()?;
    let source = format!("read_parquet({})", quote_literal(&file.to_string_lossy()));

    println!("\n🔍 Inspecting: '{}'", file.display());

    // Fetch column names and types
    let mut stmt_cols = conn.prepare(&format!("DESCRIBE SELECT * FROM {}", source))?;
    let columns: Vec<(String, String)> = stmt_cols
        .query_map([], |row: &Row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let rows: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", source), [], |r| r.get(0))?;

    let described: Vec<String> = columns
        .iter()
        .map(|(name, data_type)| format!("{} {}", name, data_type))
        .collect();
    println!("   Columns: [{}]", described.join(", "));
    println!("   Rows: {}", rows);
    println!("   --- Rows (Limit {}) ---", limit);

    // Fetch sample rows, rendered by DuckDB itself
    let mut stmt = conn.prepare(&format!(
        "SELECT CAST(COLUMNS(*) AS VARCHAR) FROM {} LIMIT {}",
        source, limit
    ))?;
    let mut sample = stmt.query([])?;

    let mut table = Table::new();
    table.set_header(columns.iter().map(|(name, _)| name.clone()));
    while let Some(row) = sample.next()? {
        let values = (0..columns.len())
            .map(|i| row.get::<_, Option<String>>(i))
            .collect::<Result<Vec<_>, _>>()?;
        table.add_row(values.into_iter().map(|v| v.unwrap_or_else(|| "NULL".to_string())));
    }
    println!("{table}");

    Ok(())
}
