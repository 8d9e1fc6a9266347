//! Warehouse column types derived from batch semantic types.

use std::fmt;

use serde::{Deserialize, Serialize};
use tidyload_model::{RecordBatch, SemanticType};

/// Column type understood by the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Integer,
    Float,
    Boolean,
    Timestamp,
    String,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::String => "STRING",
        }
    }
}

impl From<&SemanticType> for FieldType {
    fn from(ty: &SemanticType) -> Self {
        match ty {
            SemanticType::Integer => FieldType::Integer,
            SemanticType::Float => FieldType::Float,
            SemanticType::Boolean => FieldType::Boolean,
            SemanticType::Datetime => FieldType::Timestamp,
            SemanticType::Categorical { .. } | SemanticType::String => FieldType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: FieldMode,
}

/// Ordered column list of a warehouse table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSchema {
    pub fields: Vec<SchemaField>,
}

impl WarehouseSchema {
    /// Map every column of `batch`. All fields are nullable.
    pub fn from_batch(batch: &RecordBatch) -> Self {
        let fields = batch
            .columns()
            .iter()
            .map(|column| SchemaField {
                name: column.name.clone(),
                field_type: FieldType::from(&column.semantic_type),
                mode: FieldMode::Nullable,
            })
            .collect();
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidyload_model::{ColumnMeta, Value};

    #[test]
    fn maps_every_semantic_type() {
        let batch = RecordBatch::new(
            vec![
                ColumnMeta::new("id", SemanticType::Integer),
                ColumnMeta::new("spent", SemanticType::Float),
                ColumnMeta::new("is_valid", SemanticType::Boolean),
                ColumnMeta::new("registered", SemanticType::Datetime),
                ColumnMeta::new(
                    "tier",
                    SemanticType::Categorical {
                        categories: vec!["Gold".to_string()],
                    },
                ),
                ColumnMeta::new("name", SemanticType::String),
            ],
            vec![vec![Value::Null; 6]],
        )
        .unwrap();
        let schema = WarehouseSchema::from_batch(&batch);
        let types: Vec<&str> = schema.fields.iter().map(|f| f.field_type.as_str()).collect();
        assert_eq!(
            types,
            ["INTEGER", "FLOAT", "BOOLEAN", "TIMESTAMP", "STRING", "STRING"]
        );
        assert!(schema.fields.iter().all(|f| f.mode == FieldMode::Nullable));
    }

    #[test]
    fn serializes_with_warehouse_names() {
        let field = SchemaField {
            name: "id".to_string(),
            field_type: FieldType::Integer,
            mode: FieldMode::Nullable,
        };
        insta::assert_json_snapshot!(field, @r#"
        {
          "name": "id",
          "type": "INTEGER",
          "mode": "NULLABLE"
        }
        "#);
    }
}
