// northwind-core/src/domain/quality/mod.rs

pub mod config;
pub mod issue;
pub mod rule;
pub mod rule_set;
pub mod validator;

pub use config::{QualityConfig, QualityRule, RuleKind};
pub use issue::{Issue, Severity};
pub use rule::{
    Bound, ColumnClass, ForeignKeyRule, NotNullRule, PatternRule, PredicateRule, PrimaryKeyRule,
    RangeRule, Requirement, Rule, UniqueRule,
};
pub use rule_set::RuleSet;
pub use validator::Validator;
