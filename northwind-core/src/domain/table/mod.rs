// northwind-core/src/domain/table/mod.rs
//
// In-memory row tables with an explicit schema. Types are checked once, when a
// table is built; everything downstream (quality rules, reports) can rely on
// every cell matching its column type.

pub mod value;

pub use value::{DataType, Key, Value};

use crate::domain::error::DomainError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Convenience constructor: `Schema::of(&[("OrderID", DataType::Integer)])`.
    pub fn of(columns: &[(&str, DataType)]) -> Self {
        Self::new(
            columns
                .iter()
                .map(|(name, data_type)| Column::new(*name, *data_type))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// An immutable, typed table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a table, rejecting rows that do not match the schema.
    ///
    /// Integers are widened when they land in a `Float` column, so callers can
    /// write `0` instead of `0.0` for a discount.
    pub fn try_new(
        name: impl Into<String>,
        schema: Schema,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let mut checked = Vec::with_capacity(rows.len());

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != schema.len() {
                return Err(DomainError::RowShape {
                    table: name,
                    row: row_idx,
                    expected: schema.len(),
                    actual: row.len(),
                });
            }

            let mut cells = Vec::with_capacity(row.len());
            for (value, column) in row.into_iter().zip(schema.columns()) {
                let value = match (value, column.data_type) {
                    (Value::Integer(i), DataType::Float) => Value::Float(i as f64),
                    (v, _) => v,
                };
                if !value.fits(column.data_type) {
                    return Err(DomainError::InvalidValue {
                        table: name,
                        column: column.name.clone(),
                        row: row_idx,
                        value: value.to_string(),
                        expected: column.data_type.to_string(),
                    });
                }
                cells.push(value);
            }
            checked.push(cells);
        }

        Ok(Self {
            name,
            schema,
            rows: checked,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same rows and schema under another name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Value> + '_, DomainError> {
        let idx = self
            .schema
            .index_of(name)
            .ok_or_else(|| DomainError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }
}

/// Logical table name -> table. Ordered so that iteration (and therefore any
/// report built from it) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: BTreeMap<String, Table>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table under its own name, replacing any previous one.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    pub fn with(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Table, DomainError> {
        self.get(name)
            .ok_or_else(|| DomainError::MissingTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
