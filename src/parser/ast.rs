//! Parsed query representation

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Equality filter `collection.field = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterPredicate {
    pub collection: String,
    pub field: String,
    pub value: Value,
}

impl FilterPredicate {
    pub fn new(collection: impl Into<String>, field: impl Into<String>, value: Value) -> Self {
        Self {
            collection: collection.into(),
            field: field.into(),
            value,
        }
    }
}

/// Equality join `left_collection.left_field = right_collection.right_field`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPredicate {
    pub left_collection: String,
    pub left_field: String,
    pub right_collection: String,
    pub right_field: String,
}

impl JoinPredicate {
    pub fn new(
        left_collection: impl Into<String>,
        left_field: impl Into<String>,
        right_collection: impl Into<String>,
        right_field: impl Into<String>,
    ) -> Self {
        Self {
            left_collection: left_collection.into(),
            left_field: left_field.into(),
            right_collection: right_collection.into(),
            right_field: right_field.into(),
        }
    }
}

/// Output of [`parse_query`](super::parse_query)
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// Select list with aliases replaced by collection names; empty for `*`
    pub select_fields: Vec<String>,
    /// Collection named after FROM
    pub base_collection: String,
    /// Alias -> collection; the empty alias maps to the base collection
    pub aliases: BTreeMap<String, String>,
    pub join: Option<JoinPredicate>,
    pub filters: Vec<FilterPredicate>,
    /// GROUP BY keys, normalized like select fields
    pub group_by: Vec<String>,
}

impl ParsedQuery {
    /// Filters on one collection
    pub fn filters_on<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a FilterPredicate> {
        self.filters.iter().filter(move |f| f.collection == collection)
    }
}
