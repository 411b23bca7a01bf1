// northwind-core/src/domain/quality/rule_set.rs

use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::quality::config::{QualityConfig, QualityRule, RuleKind};
use crate::domain::quality::rule::{
    Bound, ForeignKeyRule, NotNullRule, PatternRule, PrimaryKeyRule, RangeRule, Rule, UniqueRule,
};

/// Upper bound above which an order line quantity is considered suspicious.
pub const QUANTITY_SANITY_LIMIT: f64 = 1000.0;

/// An ordered collection of independent rules, handed to the validator at
/// call time. Order only affects the order of the reported issues.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rules.iter()).finish()
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules published for the Northwind load stage.
    pub fn northwind() -> Self {
        Self::new()
            .with(PrimaryKeyRule::new("orders_primary_key", "orders", "OrderID"))
            .with(
                RangeRule::new("quantity_non_negative", "order_details", "Quantity").at_least(0.0),
            )
            .with(
                RangeRule::new("unit_price_non_negative", "order_details", "UnitPrice")
                    .at_least(0.0),
            )
            .with(
                RangeRule::new("discount_unit_interval", "order_details", "Discount")
                    .at_least(0.0)
                    .at_most(1.0),
            )
            .with(ForeignKeyRule::new(
                "orders_customer_fk",
                "orders",
                "CustomerID",
                "customers",
                "CustomerID",
            ))
            .with(ForeignKeyRule::new(
                "order_details_order_fk",
                "order_details",
                "OrderID",
                "orders",
                "OrderID",
            ))
            .with(
                ForeignKeyRule::new(
                    "order_details_product_fk",
                    "order_details",
                    "ProductID",
                    "products",
                    "ProductID",
                )
                .skip_if_absent(),
            )
            .with(
                RangeRule::new("quantity_upper_bound", "order_details", "Quantity")
                    .at_most(QUANTITY_SANITY_LIMIT)
                    .with_severity(crate::domain::quality::Severity::Warning),
            )
    }

    /// Builds the rule set described by `config/quality.yml`.
    pub fn from_config(config: &QualityConfig) -> Result<Self, DomainError> {
        config.validate().map_err(|e| DomainError::InvalidRule {
            name: "quality.yml".to_string(),
            reason: e.to_string(),
        })?;

        if !config.enabled {
            return Ok(Self::new());
        }

        let mut set = if config.include_defaults {
            Self::northwind()
        } else {
            Self::new()
        };
        for rule in &config.rules {
            set.try_push(compile_rule(rule)?)?;
        }
        Ok(set)
    }

    pub fn with<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Appends a rule, refusing a name that is already taken.
    pub fn try_push(&mut self, rule: Box<dyn Rule>) -> Result<(), DomainError> {
        if self.rules.iter().any(|r| r.name() == rule.name()) {
            return Err(DomainError::InvalidRule {
                name: rule.name().to_string(),
                reason: "a rule with this name already exists".to_string(),
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn invalid(rule: &QualityRule, reason: &str) -> DomainError {
    DomainError::InvalidRule {
        name: rule.name.clone(),
        reason: reason.to_string(),
    }
}

fn compile_rule(rule: &QualityRule) -> Result<Box<dyn Rule>, DomainError> {
    let name = rule.name.as_str();
    let table = rule.table.as_str();
    let column = rule.column.as_str();

    let compiled: Box<dyn Rule> = match rule.kind {
        RuleKind::PrimaryKey => {
            Box::new(PrimaryKeyRule::new(name, table, column).with_severity(rule.severity))
        }
        RuleKind::NotNull => {
            Box::new(NotNullRule::new(name, table, column).with_severity(rule.severity))
        }
        RuleKind::Unique => {
            Box::new(UniqueRule::new(name, table, column).with_severity(rule.severity))
        }
        RuleKind::Range => {
            if rule.min_value.is_none() && rule.max_value.is_none() {
                return Err(invalid(rule, "range rules need min_value and/or max_value"));
            }
            if let (Some(lo), Some(hi)) = (rule.min_value, rule.max_value) {
                if lo > hi {
                    return Err(invalid(rule, "min_value is greater than max_value"));
                }
            }
            let mut range = RangeRule::new(name, table, column).with_severity(rule.severity);
            if let Some(lo) = rule.min_value {
                range = range.min(Bound {
                    value: lo,
                    inclusive: !rule.exclusive_min,
                });
            }
            if let Some(hi) = rule.max_value {
                range = range.max(Bound {
                    value: hi,
                    inclusive: !rule.exclusive_max,
                });
            }
            Box::new(range)
        }
        RuleKind::ForeignKey => {
            let reference_table = rule
                .reference_table
                .as_deref()
                .ok_or_else(|| invalid(rule, "foreign_key rules need reference_table"))?;
            // Same column name on both sides unless told otherwise.
            let reference_column = rule.reference_column.as_deref().unwrap_or(column);
            let mut fk = ForeignKeyRule::new(name, table, column, reference_table, reference_column)
                .with_severity(rule.severity);
            if rule.optional {
                fk = fk.skip_if_absent();
            }
            Box::new(fk)
        }
        RuleKind::Pattern => {
            let pattern = rule
                .pattern
                .as_deref()
                .ok_or_else(|| invalid(rule, "pattern rules need a pattern"))?;
            Box::new(PatternRule::new(name, table, column, pattern)?.with_severity(rule.severity))
        }
    };
    Ok(compiled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::quality::Severity;
    use anyhow::Result;
    use std::collections::HashSet;

    fn rule_yaml(yaml: &str) -> Result<QualityConfig> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    #[test]
    fn test_northwind_defaults_are_uniquely_named() {
        let set = RuleSet::northwind();
        assert_eq!(set.len(), 8);
        let names: HashSet<&str> = set.names().into_iter().collect();
        assert_eq!(names.len(), set.len());
        assert_eq!(set.names()[0], "orders_primary_key");
    }

    #[test]
    fn test_from_config_appends_after_defaults() -> Result<()> {
        let config = rule_yaml(
            r#"
rules:
  - name: customer_id_format
    kind: pattern
    table: customers
    column: CustomerID
    pattern: "^[A-Z]{5}$"
    severity: warning
"#,
        )?;
        let set = RuleSet::from_config(&config)?;
        assert_eq!(set.len(), 9);
        let last = set.iter().last().unwrap();
        assert_eq!(last.name(), "customer_id_format");
        assert_eq!(last.severity(), Severity::Warning);
        Ok(())
    }

    #[test]
    fn test_from_config_without_defaults() -> Result<()> {
        let config = rule_yaml(
            r#"
include_defaults: false
rules:
  - name: orders_customer_fk_custom
    kind: foreign_key
    table: orders
    column: CustomerID
    reference_table: customers
"#,
        )?;
        let set = RuleSet::from_config(&config)?;
        assert_eq!(set.names(), vec!["orders_customer_fk_custom"]);
        Ok(())
    }

    #[test]
    fn test_disabled_config_yields_empty_set() -> Result<()> {
        let config = rule_yaml("enabled: false")?;
        assert!(RuleSet::from_config(&config)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_rejects_name_clash_with_defaults() -> Result<()> {
        let config = rule_yaml(
            r#"
rules:
  - name: orders_primary_key
    kind: not_null
    table: orders
    column: OrderID
"#,
        )?;
        let err = RuleSet::from_config(&config).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRule { name, .. } if name == "orders_primary_key"));
        Ok(())
    }

    #[test]
    fn test_rejects_incomplete_declarations() -> Result<()> {
        let cases = [
            "rules: [{name: r, kind: range, table: t, column: c}]",
            "rules: [{name: r, kind: range, table: t, column: c, min_value: 2, max_value: 1}]",
            "rules: [{name: r, kind: foreign_key, table: t, column: c}]",
            "rules: [{name: r, kind: pattern, table: t, column: c}]",
            "rules: [{name: r, kind: pattern, table: t, column: c, pattern: '(['}]",
            "rules: [{name: '', kind: not_null, table: t, column: c}]",
        ];
        for yaml in cases {
            let config = rule_yaml(yaml)?;
            assert!(
                matches!(RuleSet::from_config(&config), Err(DomainError::InvalidRule { .. })),
                "expected rejection for {yaml}"
            );
        }
        Ok(())
    }
}
