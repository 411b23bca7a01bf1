// northwind-core/src/application/load.rs
//
// Load = clean + persist + validate + log. Cleaning happens in DuckDB; the
// cleaned relations are then pulled into typed tables for the quality rules.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

use crate::application::extract::{Extracted, raw_relation};
use crate::application::pipeline::PipelineContext;
use crate::application::run_log::RunLogger;
use crate::domain::error::DomainError;
use crate::domain::history::RunRecord;
use crate::domain::project::SourceTable;
use crate::domain::quality::{Issue, Validator};
use crate::domain::table::{DataType, TableSet};
use crate::error::NorthwindError;
use crate::ports::connector::{Connector, quote_ident};

pub const STAGE_NAME: &str = "load";

#[derive(Debug, Clone)]
pub struct Loaded {
    pub tables: Vec<SourceTable>,
    pub row_counts: BTreeMap<String, usize>,
    pub issues: Vec<Issue>,
    pub run: RunRecord,
}

pub fn clean_relation(table: SourceTable) -> String {
    format!("clean_{}", table.table_name())
}

/// Maps each canonical column to the raw column carrying it, ignoring case.
async fn resolve_columns(
    connector: &dyn Connector,
    table: SourceTable,
) -> Result<Vec<(&'static str, DataType, String)>, NorthwindError> {
    let raw: HashMap<String, String> = connector
        .fetch_columns(&raw_relation(table))
        .await?
        .into_iter()
        .map(|c| (c.name.to_lowercase(), c.name))
        .collect();

    table
        .columns()
        .iter()
        .map(|(canonical, data_type)| {
            raw.get(&canonical.to_lowercase())
                .map(|actual| (*canonical, *data_type, actual.clone()))
                .ok_or_else(|| {
                    NorthwindError::from(DomainError::MissingColumn {
                        table: table.table_name().to_string(),
                        column: canonical.to_string(),
                    })
                })
        })
        .collect()
}

fn cast_expression(table: SourceTable, canonical: &str, data_type: DataType, source: &str) -> String {
    let src = quote_ident(source);
    let expr = match data_type {
        DataType::Text => format!("CAST({} AS VARCHAR)", src),
        DataType::Integer => format!("TRY_CAST({} AS BIGINT)", src),
        DataType::Float => format!("TRY_CAST({} AS DOUBLE)", src),
        DataType::Timestamp => format!("TRY_CAST({} AS TIMESTAMP)", src),
    };
    match (table, canonical) {
        // A missing discount means no discount.
        (SourceTable::OrderDetails, "Discount") => format!("COALESCE({}, 0.0)", expr),
        _ => expr,
    }
}

/// Rows dropped during cleaning, by table.
fn row_filter(table: SourceTable) -> Option<&'static str> {
    match table {
        SourceTable::Orders => Some("\"OrderDate\" IS NOT NULL"),
        SourceTable::OrderDetails => Some("\"Quantity\" IS NOT NULL AND \"UnitPrice\" IS NOT NULL"),
        _ => None,
    }
}

pub fn clean_sql(table: SourceTable, columns: &[(&'static str, DataType, String)]) -> String {
    let projection = columns
        .iter()
        .map(|(canonical, data_type, source)| {
            format!(
                "{} AS {}",
                cast_expression(table, canonical, *data_type, source),
                quote_ident(canonical)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "CREATE OR REPLACE TABLE {} AS SELECT * FROM (SELECT {} FROM {})",
        quote_ident(&clean_relation(table)),
        projection,
        quote_ident(&raw_relation(table))
    );
    if let Some(filter) = row_filter(table) {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    sql
}

#[instrument(skip_all)]
pub async fn load(ctx: &PipelineContext<'_>, extracted: &Extracted) -> Result<Loaded, NorthwindError> {
    let clean_dir = ctx.layout.clean();
    let mut tables = TableSet::new();
    let mut row_counts = BTreeMap::new();

    for table in &extracted.registered {
        let columns = resolve_columns(ctx.connector, *table).await?;
        let sql = clean_sql(*table, &columns);
        debug!(table = %table, sql = %sql, "Cleaning");
        ctx.connector.execute(&sql).await?;

        let relation = clean_relation(*table);
        ctx.connector
            .export_parquet(&relation, &clean_dir.join(format!("{}.parquet", table.table_name())))
            .await?;

        let typed = ctx
            .connector
            .fetch_table(&relation, &table.schema())
            .await?
            .renamed(table.table_name());
        row_counts.insert(table.table_name().to_string(), typed.len());
        tables.insert(typed);
    }

    // Schema errors surface here, before anything is logged.
    let issues = Validator::new(ctx.rules).validate(&tables)?;
    let run = RunLogger::new(ctx.log_store).log_run(STAGE_NAME, &issues)?;

    info!(tables = tables.len(), issues = issues.len(), run_id = run.run_id, "Load finished");
    Ok(Loaded {
        tables: extracted.registered.clone(),
        row_counts,
        issues,
        run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_sql_for_order_details() {
        let columns: Vec<(&'static str, DataType, String)> = SourceTable::OrderDetails
            .columns()
            .iter()
            .map(|(c, t)| (*c, *t, c.to_lowercase()))
            .collect();
        let sql = clean_sql(SourceTable::OrderDetails, &columns);

        assert!(sql.starts_with("CREATE OR REPLACE TABLE \"clean_order_details\""));
        assert!(sql.contains("TRY_CAST(\"quantity\" AS BIGINT) AS \"Quantity\""));
        assert!(sql.contains("COALESCE(TRY_CAST(\"discount\" AS DOUBLE), 0.0) AS \"Discount\""));
        assert!(sql.ends_with("WHERE \"Quantity\" IS NOT NULL AND \"UnitPrice\" IS NOT NULL"));
    }

    #[test]
    fn test_customers_keep_every_row() {
        let columns = vec![("CustomerID", DataType::Text, "customerID".to_string())];
        let sql = clean_sql(SourceTable::Customers, &columns);
        assert!(!sql.contains("WHERE"));
    }
}
