// northwind-core/src/domain/quality/validator.rs

use tracing::{debug, info, warn};

use crate::domain::error::DomainError;
use crate::domain::quality::issue::{Issue, Severity};
use crate::domain::quality::rule::{Requirement, Rule};
use crate::domain::quality::rule_set::RuleSet;
use crate::domain::table::TableSet;

/// Runs a `RuleSet` over a `TableSet`.
///
/// Bad data becomes `Issue`s. Bad structure (a missing table or column, or a
/// column whose type the rule cannot read) is a `DomainError`, raised before
/// any rule is evaluated.
pub struct Validator<'a> {
    rules: &'a RuleSet,
}

impl<'a> Validator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    pub fn validate(&self, tables: &TableSet) -> Result<Vec<Issue>, DomainError> {
        let runnable = self.preflight(tables)?;

        let mut issues = Vec::new();
        for rule in runnable {
            let found = rule.evaluate(tables)?;
            debug!(rule = rule.name(), issues = found.len(), "Rule evaluated");
            issues.extend(found);
        }

        let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
        info!(
            rules = self.rules.len(),
            issues = issues.len(),
            errors,
            "Validation finished"
        );
        Ok(issues)
    }

    /// Checks every rule's requirements and returns the rules to run.
    fn preflight(&self, tables: &TableSet) -> Result<Vec<&'a dyn Rule>, DomainError> {
        let mut runnable = Vec::with_capacity(self.rules.len());

        for rule in self.rules.iter() {
            let requirements = rule.requirements();

            if rule.optional() {
                if let Some(absent) = requirements.iter().find(|r| !tables.contains(&r.table)) {
                    warn!(
                        rule = rule.name(),
                        table = %absent.table,
                        "Optional rule skipped: table not loaded"
                    );
                    continue;
                }
            }

            for requirement in &requirements {
                check_requirement(tables, requirement)?;
            }
            runnable.push(rule);
        }
        Ok(runnable)
    }
}

fn check_requirement(tables: &TableSet, requirement: &Requirement) -> Result<(), DomainError> {
    let table = tables.require(&requirement.table)?;
    let column = table
        .schema()
        .column(&requirement.column)
        .ok_or_else(|| DomainError::MissingColumn {
            table: requirement.table.clone(),
            column: requirement.column.clone(),
        })?;

    if !requirement.class.accepts(column.data_type) {
        return Err(DomainError::ColumnType {
            table: requirement.table.clone(),
            column: requirement.column.clone(),
            expected: requirement.class.describe().to_string(),
            actual: column.data_type.to_string(),
        });
    }

    // Keys of different types never compare equal, so a mismatch is structural.
    if let Some((other_table, other_column)) = &requirement.same_type_as {
        let other = tables
            .require(other_table)?
            .schema()
            .column(other_column)
            .ok_or_else(|| DomainError::MissingColumn {
                table: other_table.clone(),
                column: other_column.clone(),
            })?;
        if other.data_type != column.data_type {
            return Err(DomainError::ColumnType {
                table: requirement.table.clone(),
                column: requirement.column.clone(),
                expected: format!("{} like {}.{}", other.data_type, other_table, other_column),
                actual: column.data_type.to_string(),
            });
        }
    }
    Ok(())
}
