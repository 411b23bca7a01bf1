// northwind-core/src/domain/quality/config.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::{Validate, ValidationError};

use crate::domain::quality::issue::Severity;

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct QualityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Start from the built-in Northwind rules, then append `rules`.
    #[serde(default = "default_true")]
    pub include_defaults: bool,

    #[validate(nested, custom(function = "validate_unique_rule_names"))]
    #[serde(default)]
    pub rules: Vec<QualityRule>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include_defaults: true,
            rules: vec![],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    PrimaryKey,
    NotNull,
    Unique,
    Range,
    ForeignKey,
    Pattern,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct QualityRule {
    #[validate(length(min = 1, message = "Rule name cannot be empty"))]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub severity: Severity,

    pub kind: RuleKind,

    // Target
    #[validate(length(min = 1, message = "Target table cannot be empty"))]
    pub table: String,
    #[validate(length(min = 1, message = "Target column cannot be empty"))]
    pub column: String,

    // Range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub exclusive_min: bool,
    #[serde(default)]
    pub exclusive_max: bool,

    // Foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_column: Option<String>,

    // Pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Skip instead of failing when a referenced table is not loaded.
    #[serde(default)]
    pub optional: bool,
}

fn default_true() -> bool {
    true
}

fn validate_unique_rule_names(rules: &[QualityRule]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.name.as_str()) {
            let mut err = ValidationError::new("duplicate_rule_name");
            err.message = Some(format!("Rule '{}' is declared twice", rule.name).into());
            return Err(err);
        }
    }
    Ok(())
}
