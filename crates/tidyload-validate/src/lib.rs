//! Business rule validation.
//!
//! Rules flag rows through the `is_valid` column and never remove them.

pub mod rules;

pub use rules::{
    BusinessRule, IS_VALID_COLUMN, RuleOutcome, RuleReport, evaluate_business_rules,
    validate_business_rules,
};
