//! Collection schema with average field sizes
//!
//! Field sizes are averages in bytes. A field living inside a repeated
//! structure carries the array path whose average length multiplies it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One field of a collection with its average encoded size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Dotted field path
    pub name: String,
    /// Average size in bytes of a single occurrence
    pub avg_size: u64,
    /// Array path whose average length multiplies this field, if repeated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_path: Option<String>,
}

impl FieldSpec {
    /// Create a scalar field
    pub fn new(name: impl Into<String>, avg_size: u64) -> Self {
        Self {
            name: name.into(),
            avg_size,
            array_path: None,
        }
    }

    /// Create a field repeated under `array_path`
    pub fn repeated(name: impl Into<String>, avg_size: u64, array_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avg_size,
            array_path: Some(array_path.into()),
        }
    }

    /// Effective size in bytes given the average array length table.
    ///
    /// Unknown array paths count as length 1. The product is truncated.
    pub fn effective_size(&self, avg_array_lengths: &BTreeMap<String, f64>) -> u64 {
        let multiplier = self
            .array_path
            .as_ref()
            .and_then(|path| avg_array_lengths.get(path).copied())
            .unwrap_or(1.0);
        (self.avg_size as f64 * multiplier) as u64
    }
}

/// Schema of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name
    pub name: String,
    /// Primary key field
    pub primary_key: String,
    /// Field path -> field spec
    pub fields: BTreeMap<String, FieldSpec>,
}

impl CollectionSchema {
    /// Create a schema from a list of fields
    pub fn new(
        name: impl Into<String>,
        primary_key: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            primary_key: primary_key.into(),
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }

    /// Size in bytes of one field, or None if the path is not declared
    pub fn field_size_bytes(
        &self,
        field_path: &str,
        avg_array_lengths: &BTreeMap<String, f64>,
    ) -> Option<u64> {
        self.fields
            .get(field_path)
            .map(|spec| spec.effective_size(avg_array_lengths))
    }

    /// Average size in bytes of a whole document
    pub fn document_size_bytes(&self, avg_array_lengths: &BTreeMap<String, f64>) -> u64 {
        self.fields
            .values()
            .map(|spec| spec.effective_size(avg_array_lengths))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_schema() -> CollectionSchema {
        CollectionSchema::new(
            "Order",
            "IDO",
            [
                FieldSpec::new("IDO", 8),
                FieldSpec::new("date", 20),
                FieldSpec::repeated("lines.IDP", 8, "lines"),
                FieldSpec::repeated("lines.quantity", 8, "lines"),
            ],
        )
    }

    #[test]
    fn test_scalar_field_size() {
        let schema = order_schema();
        let lengths = BTreeMap::new();
        assert_eq!(schema.field_size_bytes("date", &lengths), Some(20));
    }

    #[test]
    fn test_array_field_multiplied() {
        let schema = order_schema();
        let mut lengths = BTreeMap::new();
        lengths.insert("lines".to_string(), 2.5);
        assert_eq!(schema.field_size_bytes("lines.IDP", &lengths), Some(20));
    }

    #[test]
    fn test_missing_array_length_defaults_to_one() {
        let schema = order_schema();
        let lengths = BTreeMap::new();
        assert_eq!(schema.field_size_bytes("lines.quantity", &lengths), Some(8));
    }

    #[test]
    fn test_unknown_field() {
        let schema = order_schema();
        assert_eq!(schema.field_size_bytes("nope", &BTreeMap::new()), None);
        assert!(!schema.fields.contains_key("nope"));
    }

    #[test]
    fn test_document_size() {
        let schema = order_schema();
        let mut lengths = BTreeMap::new();
        lengths.insert("lines".to_string(), 3.0);
        // 8 + 20 + 24 + 24
        assert_eq!(schema.document_size_bytes(&lengths), 76);
    }
}
