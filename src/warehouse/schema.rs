use serde::{Deserialize, Serialize};

/// Column types used by the sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Timestamp,
    Float,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "nullable")]
    pub mode: String,
}

impl SchemaField {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            mode: nullable(),
        }
    }
}

fn nullable() -> String {
    "NULLABLE".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<SchemaField>,
}

/// The eleven-column layout of the sales table, in row order.
pub fn sales_schema() -> TableSchema {
    TableSchema {
        fields: vec![
            SchemaField::new("order_id", FieldType::String),
            SchemaField::new("transaction_id", FieldType::String),
            SchemaField::new("timestamp", FieldType::Timestamp),
            SchemaField::new("customer_id", FieldType::String),
            SchemaField::new("items", FieldType::String),
            SchemaField::new("total_amount", FieldType::Float),
            SchemaField::new("total_tax", FieldType::Float),
            SchemaField::new("payment_method", FieldType::String),
            SchemaField::new("processed_at", FieldType::Timestamp),
            SchemaField::new("status", FieldType::String),
            SchemaField::new("message", FieldType::String),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SalesRecord, TransactionRequest};
    use serde_json::json;

    fn field<'a>(schema: &'a TableSchema, name: &str) -> Option<&'a SchemaField> {
        schema.fields.iter().find(|field| field.name == name)
    }

    #[test]
    fn test_sales_schema_types() {
        let schema = sales_schema();

        assert_eq!(schema.fields.len(), 11);
        assert_eq!(field(&schema, "timestamp").unwrap().field_type, FieldType::Timestamp);
        assert_eq!(field(&schema, "processed_at").unwrap().field_type, FieldType::Timestamp);
        assert_eq!(field(&schema, "total_amount").unwrap().field_type, FieldType::Float);
        assert_eq!(field(&schema, "total_tax").unwrap().field_type, FieldType::Float);
        assert_eq!(field(&schema, "items").unwrap().field_type, FieldType::String);
        assert!(field(&schema, "unknown").is_none());
    }

    #[test]
    fn test_schema_matches_record_columns() {
        let request = TransactionRequest {
            transaction_id: "T1".to_string(),
            customer_id: "C1".to_string(),
            items: vec![],
            total_amount: 1.0,
            payment_method: "cash".to_string(),
            timestamp: None,
        };
        let row = serde_json::to_value(SalesRecord::new(request, chrono::Utc::now())).unwrap();
        let columns: Vec<&String> = row.as_object().unwrap().keys().collect();

        let schema = sales_schema();
        assert_eq!(columns.len(), schema.fields.len());
        for field in &schema.fields {
            assert!(columns.contains(&&field.name), "missing column {}", field.name);
        }
    }

    #[test]
    fn test_schema_wire_format() {
        let field = serde_json::to_value(SchemaField::new("processed_at", FieldType::Timestamp))
            .unwrap();

        assert_eq!(
            field,
            json!({ "name": "processed_at", "type": "TIMESTAMP", "mode": "NULLABLE" })
        );
    }
}
