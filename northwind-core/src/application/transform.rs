// northwind-core/src/application/transform.rs

use std::collections::BTreeMap;
use tracing::info;

use crate::application::pipeline::PipelineContext;
use crate::domain::project::SourceTable;
use crate::error::NorthwindError;

pub const DIM_CUSTOMER: &str = "dim_customer";
pub const FACT_SALES: &str = "fact_sales";
pub const DIM_PRODUCT: &str = "dim_product";

const DIM_CUSTOMER_SQL: &str = r#"CREATE OR REPLACE TABLE dim_customer AS
SELECT DISTINCT "CustomerID", "CompanyName", "Country"
FROM clean_customers"#;

const FACT_SALES_SQL: &str = r#"CREATE OR REPLACE TABLE fact_sales AS
SELECT
    d."OrderID",
    o."CustomerID",
    d."ProductID",
    CAST(o."OrderDate" AS DATE) AS order_date,
    d."UnitPrice",
    d."Quantity",
    d."Discount",
    d."UnitPrice" * d."Quantity" * (1.0 - d."Discount") AS line_amount
FROM clean_order_details d
INNER JOIN clean_orders o ON d."OrderID" = o."OrderID""#;

const DIM_PRODUCT_SQL: &str = r#"CREATE OR REPLACE TABLE dim_product AS
SELECT DISTINCT "ProductID", "ProductName", "CategoryID"
FROM clean_products"#;

/// Model relations built, with their row counts.
#[derive(Debug, Clone, Default)]
pub struct Transformed {
    pub models: BTreeMap<String, u64>,
}

impl Transformed {
    pub fn has(&self, relation: &str) -> bool {
        self.models.contains_key(relation)
    }
}

/// Builds the dimension and fact relations from the `clean_*` tables.
pub async fn transform(
    ctx: &PipelineContext<'_>,
    loaded: &[SourceTable],
) -> Result<Transformed, NorthwindError> {
    let mut plan = vec![(DIM_CUSTOMER, DIM_CUSTOMER_SQL), (FACT_SALES, FACT_SALES_SQL)];
    if loaded.contains(&SourceTable::Products) {
        plan.push((DIM_PRODUCT, DIM_PRODUCT_SQL));
    }

    let mut out = Transformed::default();
    for (relation, sql) in plan {
        ctx.connector.execute(sql).await?;
        let rows = ctx
            .connector
            .query_scalar(&format!("SELECT COUNT(*) FROM {}", relation))
            .await?;
        info!(relation, rows, "Model built");
        out.models.insert(relation.to_string(), rows);
    }
    Ok(out)
}
