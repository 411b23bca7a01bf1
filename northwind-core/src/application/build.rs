// northwind-core/src/application/build.rs

use std::path::PathBuf;
use tracing::info;

use crate::application::pipeline::PipelineContext;
use crate::application::transform::{DIM_CUSTOMER, DIM_PRODUCT, FACT_SALES, Transformed};
use crate::error::NorthwindError;

/// A gold table: `line_amount` summed by one dimension attribute.
struct Aggregate {
    name: &'static str,
    dimension: &'static str,
    key: &'static str,
    attribute: &'static str,
}

const AGGREGATES: [Aggregate; 3] = [
    Aggregate {
        name: "sales_by_customer",
        dimension: DIM_CUSTOMER,
        key: "CustomerID",
        attribute: "CompanyName",
    },
    Aggregate {
        name: "sales_by_country",
        dimension: DIM_CUSTOMER,
        key: "CustomerID",
        attribute: "Country",
    },
    Aggregate {
        name: "sales_by_product",
        dimension: DIM_PRODUCT,
        key: "ProductID",
        attribute: "ProductName",
    },
];

impl Aggregate {
    fn sql(&self) -> String {
        format!(
            "CREATE OR REPLACE TABLE {name} AS \
             SELECT dim.\"{attr}\", SUM(f.line_amount) AS line_amount \
             FROM {fact} f LEFT JOIN {dim} dim ON f.\"{key}\" = dim.\"{key}\" \
             WHERE dim.\"{attr}\" IS NOT NULL \
             GROUP BY dim.\"{attr}\" \
             ORDER BY line_amount DESC",
            name = self.name,
            attr = self.attribute,
            fact = FACT_SALES,
            dim = self.dimension,
            key = self.key,
        )
    }
}

/// Parquet files written to the model folder.
#[derive(Debug, Clone, Default)]
pub struct Built {
    pub artifacts: Vec<PathBuf>,
}

/// Aggregates the model into gold tables and writes everything to `02-model`.
pub async fn build(ctx: &PipelineContext<'_>, models: &Transformed) -> Result<Built, NorthwindError> {
    let model_dir = ctx.layout.model();
    let mut exports = vec![DIM_CUSTOMER, FACT_SALES];

    for aggregate in &AGGREGATES {
        if !models.has(aggregate.dimension) {
            continue;
        }
        ctx.connector.execute(&aggregate.sql()).await?;
        exports.push(aggregate.name);
    }

    let mut out = Built::default();
    for relation in exports {
        let path = model_dir.join(format!("{}.parquet", relation));
        ctx.connector.export_parquet(relation, &path).await?;
        info!(relation, path = %path.display(), "Model written");
        out.artifacts.push(path);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_sql_sorts_descending() {
        let sql = AGGREGATES[1].sql();
        assert!(sql.starts_with("CREATE OR REPLACE TABLE sales_by_country AS"));
        assert!(sql.contains("LEFT JOIN dim_customer dim ON f.\"CustomerID\" = dim.\"CustomerID\""));
        assert!(sql.contains("WHERE dim.\"Country\" IS NOT NULL GROUP BY dim.\"Country\""));
        assert!(sql.ends_with("ORDER BY line_amount DESC"));
    }
}
