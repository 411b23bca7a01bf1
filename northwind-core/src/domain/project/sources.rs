// src/domain/project/sources.rs

use crate::domain::table::{DataType, Schema};

/// The Northwind CSV extracts the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceTable {
    Customers,
    Orders,
    OrderDetails,
    Products,
}

impl SourceTable {
    pub const ALL: [SourceTable; 4] = [
        SourceTable::Customers,
        SourceTable::Orders,
        SourceTable::OrderDetails,
        SourceTable::Products,
    ];

    /// Tables to process in a run. Products are optional.
    pub fn selected(use_products: bool) -> Vec<SourceTable> {
        Self::ALL
            .into_iter()
            .filter(|t| use_products || t.is_required())
            .collect()
    }

    /// Logical name, used for the table set, DuckDB relations and Parquet files.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Orders => "orders",
            Self::OrderDetails => "order_details",
            Self::Products => "products",
        }
    }

    /// Expected file name in the raw folder.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Customers => "Customers.csv",
            Self::Orders => "Orders.csv",
            Self::OrderDetails => "Order_Details.csv",
            Self::Products => "Products.csv",
        }
    }

    /// File name on the download mirror.
    pub fn remote_name(&self) -> &'static str {
        match self {
            Self::Customers => "customers.csv",
            Self::Orders => "orders.csv",
            Self::OrderDetails => "order-details.csv",
            Self::Products => "products.csv",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Products)
    }

    /// Canonical column names and their types after cleaning.
    pub fn columns(&self) -> &'static [(&'static str, DataType)] {
        match self {
            Self::Customers => &[
                ("CustomerID", DataType::Text),
                ("CompanyName", DataType::Text),
                ("Country", DataType::Text),
            ],
            Self::Orders => &[
                ("OrderID", DataType::Integer),
                ("CustomerID", DataType::Text),
                ("OrderDate", DataType::Timestamp),
            ],
            Self::OrderDetails => &[
                ("OrderID", DataType::Integer),
                ("ProductID", DataType::Integer),
                ("UnitPrice", DataType::Float),
                ("Quantity", DataType::Integer),
                ("Discount", DataType::Float),
            ],
            Self::Products => &[
                ("ProductID", DataType::Integer),
                ("ProductName", DataType::Text),
                ("CategoryID", DataType::Integer),
            ],
        }
    }

    pub fn schema(&self) -> Schema {
        Schema::of(self.columns())
    }
}

impl std::fmt::Display for SourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}
