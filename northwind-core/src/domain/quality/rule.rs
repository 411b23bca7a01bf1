// northwind-core/src/domain/quality/rule.rs
//
// Quality rules. Each rule is a pure evaluation over a `TableSet`: it reads
// tables, never mutates them, and reports violations as `Issue` values.
// Structural problems (missing table/column, wrong column type) are declared
// up-front through `requirements()` so the validator can reject them before
// any rule runs.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::quality::issue::{Issue, Severity};
use crate::domain::table::{DataType, Key, TableSet};

/// How many offending key values are quoted in an issue message.
const SAMPLE_SIZE: usize = 5;

/// The family of column types a rule can work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    Any,
    Numeric,
    Integer,
    Text,
    /// Integer or text: anything usable as a join key.
    Key,
}

impl ColumnClass {
    pub fn accepts(&self, data_type: DataType) -> bool {
        match self {
            Self::Any => true,
            Self::Numeric => data_type.is_numeric(),
            Self::Integer => data_type == DataType::Integer,
            Self::Text => data_type == DataType::Text,
            Self::Key => matches!(data_type, DataType::Integer | DataType::Text),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Any => "any type",
            Self::Numeric => "a numeric column",
            Self::Integer => "an integer column",
            Self::Text => "a text column",
            Self::Key => "an integer or text key column",
        }
    }
}

/// A column a rule reads, and the type family it expects there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub table: String,
    pub column: String,
    pub class: ColumnClass,
    /// Another `(table, column)` whose type this column must share exactly.
    pub same_type_as: Option<(String, String)>,
}

impl Requirement {
    pub fn new(table: &str, column: &str, class: ColumnClass) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            class,
            same_type_as: None,
        }
    }

    pub fn same_type_as(mut self, table: &str, column: &str) -> Self {
        self.same_type_as = Some((table.to_string(), column.to_string()));
        self
    }
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn severity(&self) -> Severity;

    /// Columns this rule reads. Checked by the validator before evaluation.
    fn requirements(&self) -> Vec<Requirement>;

    /// Optional rules are skipped (instead of failing) when one of their
    /// tables was not supplied at all.
    fn optional(&self) -> bool {
        false
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError>;
}

impl fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("severity", &self.severity())
            .finish()
    }
}

fn sample<'a>(keys: impl IntoIterator<Item = Key<'a>>) -> String {
    keys.into_iter()
        .take(SAMPLE_SIZE)
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// --- PRIMARY KEY ---

/// Identifying column: no nulls and strictly positive.
pub struct PrimaryKeyRule {
    name: String,
    table: String,
    column: String,
    severity: Severity,
}

impl PrimaryKeyRule {
    pub fn new(name: &str, table: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for PrimaryKeyRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::new(&self.table, &self.column, ColumnClass::Integer)]
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let table = tables.require(&self.table)?;
        let mut nulls = 0u64;
        let mut non_positive = 0u64;

        for value in table.column(&self.column)? {
            match value.as_f64() {
                None => nulls += 1,
                Some(v) if v <= 0.0 => non_positive += 1,
                Some(_) => {}
            }
        }

        let mut issues = Vec::new();
        if nulls > 0 {
            issues.push(
                Issue::new(
                    &self.name,
                    self.severity,
                    &self.table,
                    format!("{} has {} null value(s)", self.column, nulls),
                )
                .on_column(&self.column)
                .with_violations(nulls),
            );
        }
        if non_positive > 0 {
            issues.push(
                Issue::new(
                    &self.name,
                    self.severity,
                    &self.table,
                    format!("{} must be > 0 (bad={})", self.column, non_positive),
                )
                .on_column(&self.column)
                .with_violations(non_positive),
            );
        }
        Ok(issues)
    }
}

// --- NOT NULL ---

pub struct NotNullRule {
    name: String,
    table: String,
    column: String,
    severity: Severity,
}

impl NotNullRule {
    pub fn new(name: &str, table: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NotNullRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::new(&self.table, &self.column, ColumnClass::Any)]
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let table = tables.require(&self.table)?;
        let nulls = table.column(&self.column)?.filter(|v| v.is_null()).count() as u64;

        if nulls == 0 {
            return Ok(vec![]);
        }
        Ok(vec![
            Issue::new(
                &self.name,
                self.severity,
                &self.table,
                format!("{} has {} null value(s)", self.column, nulls),
            )
            .on_column(&self.column)
            .with_violations(nulls),
        ])
    }
}

// --- UNIQUE ---

pub struct UniqueRule {
    name: String,
    table: String,
    column: String,
    severity: Severity,
}

impl UniqueRule {
    pub fn new(name: &str, table: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for UniqueRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::new(&self.table, &self.column, ColumnClass::Key)]
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let table = tables.require(&self.table)?;

        // Keep first-seen order so the sample in the message is stable.
        let mut counts: HashMap<Key<'_>, usize> = HashMap::new();
        let mut order: Vec<Key<'_>> = Vec::new();
        for key in table.column(&self.column)?.filter_map(|v| v.as_key()) {
            let count = counts.entry(key).or_insert(0);
            if *count == 1 {
                order.push(key);
            }
            *count += 1;
        }

        if order.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![
            Issue::new(
                &self.name,
                self.severity,
                &self.table,
                format!(
                    "{} has {} duplicated value(s) (e.g. {})",
                    self.column,
                    order.len(),
                    sample(order.iter().copied())
                ),
            )
            .on_column(&self.column)
            .with_violations(order.len() as u64),
        ])
    }
}

// --- RANGE ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// Numeric bounds on a column. Nulls are not checked here; pair with a
/// `NotNullRule` when they matter.
pub struct RangeRule {
    name: String,
    table: String,
    column: String,
    min: Option<Bound>,
    max: Option<Bound>,
    severity: Severity,
}

impl RangeRule {
    pub fn new(name: &str, table: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            min: None,
            max: None,
            severity: Severity::Error,
        }
    }

    pub fn min(mut self, bound: Bound) -> Self {
        self.min = Some(bound);
        self
    }

    pub fn max(mut self, bound: Bound) -> Self {
        self.max = Some(bound);
        self
    }

    pub fn at_least(self, value: f64) -> Self {
        self.min(Bound::inclusive(value))
    }

    pub fn at_most(self, value: f64) -> Self {
        self.max(Bound::inclusive(value))
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn in_range(&self, v: f64) -> bool {
        // Written as negations so NaN fails both checks.
        let above_min = match self.min {
            Some(b) if b.inclusive => v >= b.value,
            Some(b) => v > b.value,
            None => !v.is_nan(),
        };
        let below_max = match self.max {
            Some(b) if b.inclusive => v <= b.value,
            Some(b) => v < b.value,
            None => !v.is_nan(),
        };
        above_min && below_max
    }

    fn expectation(&self) -> String {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => format!(
                "within {}{}, {}{}",
                if lo.inclusive { "[" } else { "(" },
                lo.value,
                hi.value,
                if hi.inclusive { "]" } else { ")" }
            ),
            (Some(lo), None) => format!("{} {}", if lo.inclusive { ">=" } else { ">" }, lo.value),
            (None, Some(hi)) => format!("{} {}", if hi.inclusive { "<=" } else { "<" }, hi.value),
            (None, None) => "a number".to_string(),
        }
    }
}

impl Rule for RangeRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::new(&self.table, &self.column, ColumnClass::Numeric)]
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let table = tables.require(&self.table)?;
        let bad = table
            .column(&self.column)?
            .filter_map(|v| v.as_f64())
            .filter(|v| !self.in_range(*v))
            .count() as u64;

        if bad == 0 {
            return Ok(vec![]);
        }
        Ok(vec![
            Issue::new(
                &self.name,
                self.severity,
                &self.table,
                format!("{} must be {} (bad={})", self.column, self.expectation(), bad),
            )
            .on_column(&self.column)
            .with_violations(bad),
        ])
    }
}

// --- FOREIGN KEY ---

/// Every non-null key in `table.column` must exist in `reference_table.reference_column`.
pub struct ForeignKeyRule {
    name: String,
    table: String,
    column: String,
    reference_table: String,
    reference_column: String,
    severity: Severity,
    optional: bool,
}

impl ForeignKeyRule {
    pub fn new(
        name: &str,
        table: &str,
        column: &str,
        reference_table: &str,
        reference_column: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            reference_table: reference_table.to_string(),
            reference_column: reference_column.to_string(),
            severity: Severity::Error,
            optional: false,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Skip the check when either table is absent from the run.
    pub fn skip_if_absent(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl Rule for ForeignKeyRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![
            Requirement::new(&self.table, &self.column, ColumnClass::Key)
                .same_type_as(&self.reference_table, &self.reference_column),
            Requirement::new(&self.reference_table, &self.reference_column, ColumnClass::Key),
        ]
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let child = tables.require(&self.table)?;
        let parent = tables.require(&self.reference_table)?;

        let known: HashSet<Key<'_>> = parent
            .column(&self.reference_column)?
            .filter_map(|v| v.as_key())
            .collect();

        let mut missing_rows = 0u64;
        let mut missing_keys: Vec<Key<'_>> = Vec::new();
        let mut seen: HashSet<Key<'_>> = HashSet::new();
        for key in child.column(&self.column)?.filter_map(|v| v.as_key()) {
            if !known.contains(&key) {
                missing_rows += 1;
                if seen.insert(key) {
                    missing_keys.push(key);
                }
            }
        }

        if missing_rows == 0 {
            return Ok(vec![]);
        }
        Ok(vec![
            Issue::new(
                &self.name,
                self.severity,
                &self.table,
                format!(
                    "{} has {} value(s) missing from {}.{} (e.g. {})",
                    self.column,
                    missing_rows,
                    self.reference_table,
                    self.reference_column,
                    sample(missing_keys)
                ),
            )
            .on_column(&self.column)
            .with_violations(missing_rows),
        ])
    }
}

// --- PATTERN ---

/// Text values must match a regular expression. Nulls are skipped.
pub struct PatternRule {
    name: String,
    table: String,
    column: String,
    pattern: Regex,
    severity: Severity,
}

impl PatternRule {
    pub fn new(name: &str, table: &str, column: &str, pattern: &str) -> Result<Self, DomainError> {
        let pattern = Regex::new(pattern).map_err(|e| DomainError::InvalidRule {
            name: name.to_string(),
            reason: format!("invalid pattern: {}", e),
        })?;
        Ok(Self {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
            pattern,
            severity: Severity::Error,
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        vec![Requirement::new(&self.table, &self.column, ColumnClass::Text)]
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let table = tables.require(&self.table)?;
        let bad = table
            .column(&self.column)?
            .filter_map(|v| v.as_str())
            .filter(|s| !self.pattern.is_match(s))
            .count() as u64;

        if bad == 0 {
            return Ok(vec![]);
        }
        Ok(vec![
            Issue::new(
                &self.name,
                self.severity,
                &self.table,
                format!(
                    "{} has {} value(s) not matching {}",
                    self.column,
                    bad,
                    self.pattern.as_str()
                ),
            )
            .on_column(&self.column)
            .with_violations(bad),
        ])
    }
}

// --- AD-HOC PREDICATES ---

/// Wraps a closure as a rule, for checks that do not fit a built-in kind.
pub struct PredicateRule<F> {
    name: String,
    severity: Severity,
    requirements: Vec<Requirement>,
    optional: bool,
    check: F,
}

impl<F> PredicateRule<F>
where
    F: Fn(&TableSet) -> Result<Vec<Issue>, DomainError> + Send + Sync,
{
    pub fn new(name: &str, requirements: Vec<Requirement>, check: F) -> Self {
        Self {
            name: name.to_string(),
            severity: Severity::Error,
            requirements,
            optional: false,
            check,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn skip_if_absent(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl<F> Rule for PredicateRule<F>
where
    F: Fn(&TableSet) -> Result<Vec<Issue>, DomainError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn requirements(&self) -> Vec<Requirement> {
        self.requirements.clone()
    }

    fn optional(&self) -> bool {
        self.optional
    }

    fn evaluate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        (self.check)(tables)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::table::{Schema, Table, Value};
    use anyhow::Result;

    fn details(rows: Vec<(f64, i64, f64)>) -> Result<TableSet> {
        let schema = Schema::of(&[
            ("UnitPrice", DataType::Float),
            ("Quantity", DataType::Integer),
            ("Discount", DataType::Float),
        ]);
        let rows = rows
            .into_iter()
            .map(|(p, q, d)| vec![Value::Float(p), Value::Integer(q), Value::Float(d)])
            .collect();
        Ok(TableSet::new().with(Table::try_new("order_details", schema, rows)?))
    }

    #[test]
    fn test_range_aggregates_failing_rows_into_one_issue() -> Result<()> {
        let tables = details(vec![(-5.0, 2, 0.1), (-1.0, 1, 0.0), (3.0, 1, 0.0)])?;
        let rule = RangeRule::new("unit_price_non_negative", "order_details", "UnitPrice")
            .at_least(0.0);

        let issues = rule.evaluate(&tables)?;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].violations, 2);
        assert_eq!(issues[0].message, "UnitPrice must be >= 0 (bad=2)");
        assert_eq!(issues[0].column.as_deref(), Some("UnitPrice"));
        Ok(())
    }

    #[test]
    fn test_range_message_for_closed_interval() -> Result<()> {
        let tables = details(vec![(1.0, 1, 1.5)])?;
        let rule = RangeRule::new("discount", "order_details", "Discount")
            .at_least(0.0)
            .at_most(1.0);

        let issues = rule.evaluate(&tables)?;
        assert_eq!(issues[0].message, "Discount must be within [0, 1] (bad=1)");
        Ok(())
    }

    #[test]
    fn test_range_exclusive_bound() -> Result<()> {
        let tables = details(vec![(1.0, 0, 0.0), (1.0, 1, 0.0)])?;
        let rule = RangeRule::new("qty_positive", "order_details", "Quantity")
            .min(Bound::exclusive(0.0));

        let issues = rule.evaluate(&tables)?;
        assert_eq!(issues[0].message, "Quantity must be > 0 (bad=1)");
        Ok(())
    }

    #[test]
    fn test_range_flags_nan() -> Result<()> {
        let tables = details(vec![(f64::NAN, 1, 0.0)])?;
        let rule = RangeRule::new("price", "order_details", "UnitPrice").at_least(0.0);
        assert_eq!(rule.evaluate(&tables)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_primary_key_reports_nulls_and_non_positive_separately() -> Result<()> {
        let schema = Schema::of(&[("OrderID", DataType::Integer)]);
        let table = Table::try_new(
            "orders",
            schema,
            vec![
                vec![Value::Null],
                vec![Value::Integer(0)],
                vec![Value::Integer(-3)],
                vec![Value::Integer(10248)],
            ],
        )?;
        let tables = TableSet::new().with(table);

        let issues = PrimaryKeyRule::new("orders_pk", "orders", "OrderID").evaluate(&tables)?;
        let messages: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "orders: OrderID has 1 null value(s)",
                "orders: OrderID must be > 0 (bad=2)"
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unique_samples_duplicates_in_first_seen_order() -> Result<()> {
        let schema = Schema::of(&[("CustomerID", DataType::Text)]);
        let rows = ["BONAP", "ALFKI", "BONAP", "ALFKI", "ALFKI", "ANATR"]
            .iter()
            .map(|s| vec![Value::from(*s)])
            .collect();
        let tables = TableSet::new().with(Table::try_new("customers", schema, rows)?);

        let issues = UniqueRule::new("customers_unique", "customers", "CustomerID")
            .evaluate(&tables)?;
        assert_eq!(
            issues[0].message,
            "CustomerID has 2 duplicated value(s) (e.g. BONAP, ALFKI)"
        );
        Ok(())
    }

    #[test]
    fn test_pattern_rule_skips_nulls() -> Result<()> {
        let schema = Schema::of(&[("CustomerID", DataType::Text)]);
        let rows = vec![
            vec![Value::from("ALFKI")],
            vec![Value::from("zz")],
            vec![Value::Null],
        ];
        let tables = TableSet::new().with(Table::try_new("customers", schema, rows)?);

        let rule = PatternRule::new("customer_id_format", "customers", "CustomerID", "^[A-Z]{5}$")?
            .with_severity(Severity::Warning);
        let issues = rule.evaluate(&tables)?;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].violations, 1);
        Ok(())
    }

    #[test]
    fn test_pattern_rule_rejects_bad_regex() {
        let err = PatternRule::new("broken", "customers", "CustomerID", "([A-Z")
            .err()
            .unwrap();
        assert!(matches!(err, DomainError::InvalidRule { .. }));
    }

    #[test]
    fn test_column_class_acceptance() {
        assert!(ColumnClass::Numeric.accepts(DataType::Integer));
        assert!(ColumnClass::Numeric.accepts(DataType::Float));
        assert!(!ColumnClass::Numeric.accepts(DataType::Text));
        assert!(ColumnClass::Key.accepts(DataType::Text));
        assert!(!ColumnClass::Key.accepts(DataType::Float));
    }
}
