//! Transformation configuration.
//!
//! Every section is optional. An absent section resolves to the stage default
//! through the accessor of the same name, so a partially written config file
//! only overrides what it mentions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{NullRendering, Value};

/// How nulls in one column are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrategySpec", into = "StrategySpec")]
pub enum MissingValueStrategy {
    /// Remove every row where the column is null.
    Drop,
    Mean,
    Median,
    Mode,
    ForwardFill,
    BackwardFill,
    /// Replace nulls with a literal, without type checking.
    Fill(Value),
}

impl MissingValueStrategy {
    /// Parse one of the strategy keywords. Anything else is a literal.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "drop" => Some(Self::Drop),
            "mean" => Some(Self::Mean),
            "median" => Some(Self::Median),
            "mode" => Some(Self::Mode),
            "forward_fill" | "ffill" => Some(Self::ForwardFill),
            "backward_fill" | "bfill" => Some(Self::BackwardFill),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Drop => "drop".to_string(),
            Self::Mean => "mean".to_string(),
            Self::Median => "median".to_string(),
            Self::Mode => "mode".to_string(),
            Self::ForwardFill => "forward_fill".to_string(),
            Self::BackwardFill => "backward_fill".to_string(),
            Self::Fill(value) => format!("fill({value})"),
        }
    }
}

impl fmt::Display for MissingValueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Wire form of a strategy: a keyword or any scalar literal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StrategySpec {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<StrategySpec> for MissingValueStrategy {
    fn from(spec: StrategySpec) -> Self {
        match spec {
            StrategySpec::Bool(v) => Self::Fill(Value::Bool(v)),
            StrategySpec::Int(v) => Self::Fill(Value::Int(v)),
            StrategySpec::Float(v) => Self::Fill(Value::Float(v)),
            StrategySpec::Text(text) => {
                Self::from_keyword(&text).unwrap_or(Self::Fill(Value::Str(text)))
            }
        }
    }
}

impl From<MissingValueStrategy> for StrategySpec {
    fn from(strategy: MissingValueStrategy) -> Self {
        match strategy {
            MissingValueStrategy::Fill(Value::Bool(v)) => StrategySpec::Bool(v),
            MissingValueStrategy::Fill(Value::Int(v)) => StrategySpec::Int(v),
            MissingValueStrategy::Fill(Value::Float(v)) => StrategySpec::Float(v),
            MissingValueStrategy::Fill(value) => StrategySpec::Text(value.to_string()),
            keyword => StrategySpec::Text(keyword.label()),
        }
    }
}

/// Which member of a duplicate group survives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepPolicy {
    #[default]
    First,
    Last,
    /// Drop every member of a group with more than one row.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperation {
    Strip,
    Lower,
    Upper,
    Title,
    RemoveSpecial,
}

impl TextOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            TextOperation::Strip => "strip",
            TextOperation::Lower => "lower",
            TextOperation::Upper => "upper",
            TextOperation::Title => "title",
            TextOperation::RemoveSpecial => "remove_special",
        }
    }
}

pub const DEFAULT_TEXT_COLUMNS: [&str; 5] = ["first_name", "last_name", "city", "state", "country"];
pub const DEFAULT_DEDUP_KEY: &str = "customer_id";
pub const DEFAULT_EMAIL_COLUMN: &str = "email";
pub const DEFAULT_PHONE_COLUMN: &str = "phone";

/// Configuration consumed by the transform pipeline.
///
/// Constructed once per run and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    pub missing_value_strategy: Option<BTreeMap<String, MissingValueStrategy>>,
    pub text_columns: Option<Vec<String>>,
    pub text_operations: Option<Vec<TextOperation>>,
    pub dedup_key_columns: Option<Vec<String>>,
    pub dedup_keep: Option<KeepPolicy>,
    pub type_mapping: Option<BTreeMap<String, String>>,
    pub email_column: Option<String>,
    pub phone_column: Option<String>,
    pub null_rendering: Option<NullRendering>,
}

impl TransformConfig {
    pub fn missing_value_strategy(&self) -> BTreeMap<String, MissingValueStrategy> {
        self.missing_value_strategy.clone().unwrap_or_else(|| {
            BTreeMap::from([
                (
                    "phone".to_string(),
                    MissingValueStrategy::Fill(Value::str("Unknown")),
                ),
                ("last_purchase_date".to_string(), MissingValueStrategy::Drop),
            ])
        })
    }

    pub fn text_columns(&self) -> Vec<String> {
        self.text_columns.clone().unwrap_or_else(|| {
            DEFAULT_TEXT_COLUMNS
                .iter()
                .map(|c| (*c).to_string())
                .collect()
        })
    }

    pub fn text_operations(&self) -> Vec<TextOperation> {
        self.text_operations
            .clone()
            .unwrap_or_else(|| vec![TextOperation::Strip, TextOperation::Title])
    }

    pub fn dedup_key_columns(&self) -> Vec<String> {
        self.dedup_key_columns
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_DEDUP_KEY.to_string()])
    }

    pub fn dedup_keep(&self) -> KeepPolicy {
        self.dedup_keep.unwrap_or_default()
    }

    pub fn type_mapping(&self) -> BTreeMap<String, String> {
        self.type_mapping.clone().unwrap_or_else(|| {
            [
                ("customer_id", "int64"),
                ("registration_date", "datetime"),
                ("last_purchase_date", "datetime"),
                ("total_spent", "float64"),
                ("customer_segment", "category"),
            ]
            .into_iter()
            .map(|(column, ty)| (column.to_string(), ty.to_string()))
            .collect()
        })
    }

    pub fn email_column(&self) -> &str {
        self.email_column.as_deref().unwrap_or(DEFAULT_EMAIL_COLUMN)
    }

    pub fn phone_column(&self) -> &str {
        self.phone_column.as_deref().unwrap_or(DEFAULT_PHONE_COLUMN)
    }

    pub fn null_rendering(&self) -> NullRendering {
        self.null_rendering.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_literals() {
        let parsed: BTreeMap<String, MissingValueStrategy> = serde_json::from_str(
            r#"{"a": "drop", "b": "ffill", "c": "Unknown", "d": 0, "e": 1.5, "f": true}"#,
        )
        .unwrap();
        assert_eq!(parsed["a"], MissingValueStrategy::Drop);
        assert_eq!(parsed["b"], MissingValueStrategy::ForwardFill);
        assert_eq!(parsed["c"], MissingValueStrategy::Fill(Value::str("Unknown")));
        assert_eq!(parsed["d"], MissingValueStrategy::Fill(Value::Int(0)));
        assert_eq!(parsed["e"], MissingValueStrategy::Fill(Value::Float(1.5)));
        assert_eq!(parsed["f"], MissingValueStrategy::Fill(Value::Bool(true)));
    }

    #[test]
    fn absent_sections_resolve_to_defaults() {
        let config: TransformConfig = toml::from_str("text_operations = [\"lower\"]").unwrap();
        assert_eq!(config.text_operations(), vec![TextOperation::Lower]);
        assert_eq!(config.dedup_key_columns(), vec!["customer_id".to_string()]);
        assert_eq!(config.dedup_keep(), KeepPolicy::First);
        assert_eq!(config.type_mapping()["total_spent"], "float64");
        assert_eq!(
            config.missing_value_strategy()["last_purchase_date"],
            MissingValueStrategy::Drop
        );
        assert_eq!(config.phone_column(), "phone");
        assert_eq!(config.null_rendering(), NullRendering::Nan);
    }

    #[test]
    fn strategy_serializes_back_to_keyword() {
        let json = serde_json::to_string(&MissingValueStrategy::BackwardFill).unwrap();
        assert_eq!(json, "\"backward_fill\"");
    }
}
