//! Plan documents, one JSON file per query
//!
//! ```text
//! {query_id, per_denorm: {design_id: {query_id, sql, involved_collections,
//!                                     required_indexes, operators: [...]}}}
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::model::QuerySpec;
use crate::parser::FilterPredicate;
use crate::planner::{PlanOperator, QueryPlan};
use crate::workload::RunOutcome;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterDocument {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinDocument {
    pub left: String,
    pub right: String,
}

/// One operator with every key present; keys that do not apply are null or empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_collection: Option<String>,
    pub left_collection: Option<String>,
    pub right_collection: Option<String>,
    pub filters: Vec<FilterDocument>,
    pub join: Option<JoinDocument>,
    pub grouping_keys: Vec<String>,
    pub output_fields: Vec<String>,
    pub scan_strategy: Option<String>,
    pub indexes_used: Vec<String>,
}

impl OperatorDocument {
    pub fn from_operator(operator: &PlanOperator) -> Self {
        let base = Self {
            name: operator.name().to_string(),
            kind: operator.kind().as_str().to_string(),
            target_collection: None,
            left_collection: None,
            right_collection: None,
            filters: Vec::new(),
            join: None,
            grouping_keys: Vec::new(),
            output_fields: operator.output_fields().to_vec(),
            scan_strategy: None,
            indexes_used: Vec::new(),
        };

        match operator {
            PlanOperator::Filter(f) => Self {
                target_collection: Some(f.collection.clone()),
                filters: f.filters.iter().map(filter_document).collect(),
                scan_strategy: Some(f.scan_strategy.as_str().to_string()),
                indexes_used: f.indexes_used.clone(),
                ..base
            },
            PlanOperator::Join(j) => Self {
                left_collection: Some(j.left_collection().to_string()),
                right_collection: Some(j.right_collection().to_string()),
                join: Some(JoinDocument {
                    left: j.join.left_field.clone(),
                    right: j.join.right_field.clone(),
                }),
                ..base
            },
            PlanOperator::Aggregate(a) => Self {
                target_collection: Some(a.collection.clone()),
                filters: a.filters.iter().map(filter_document).collect(),
                grouping_keys: a.grouping_keys.clone(),
                ..base
            },
        }
    }
}

fn filter_document(predicate: &FilterPredicate) -> FilterDocument {
    FilterDocument {
        field: predicate.field.clone(),
        value: predicate.value.clone(),
    }
}

/// The plan of one query under one design
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignPlanDocument {
    pub query_id: String,
    pub sql: String,
    pub involved_collections: Vec<String>,
    pub required_indexes: BTreeMap<String, Vec<String>>,
    pub operators: Vec<OperatorDocument>,
}

impl DesignPlanDocument {
    pub fn from_plan(plan: &QueryPlan) -> Self {
        Self {
            query_id: plan.query.id.clone(),
            sql: plan.query.sql.clone(),
            involved_collections: plan.involved_collections.clone(),
            required_indexes: plan.required_indexes(),
            operators: plan.operators.iter().map(OperatorDocument::from_operator).collect(),
        }
    }
}

/// The plans of one query across all designs that could evaluate it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDocument {
    pub query_id: String,
    pub per_denorm: BTreeMap<String, DesignPlanDocument>,
}

impl PlanDocument {
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            per_denorm: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, design_id: impl Into<String>, plan: &QueryPlan) {
        self.per_denorm
            .insert(design_id.into(), DesignPlanDocument::from_plan(plan));
    }
}

/// One document per query, in query order
///
/// Designs that failed a query are absent from that query's `per_denorm`.
pub fn plan_documents(queries: &[QuerySpec], outcome: &RunOutcome) -> Vec<PlanDocument> {
    queries
        .iter()
        .map(|query| {
            let mut document = PlanDocument::new(&query.id);
            for design in &outcome.designs {
                if let Some(result) = design.result(&query.id) {
                    document.insert(&design.design_id, &result.plan);
                }
            }
            document
        })
        .collect()
}

/// File name stem: `Q7` -> `query7`, anything else lowercased
pub fn plan_file_stub(query_id: &str) -> String {
    match query_id.strip_prefix('Q') {
        Some(number) if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) => {
            format!("query{}", number)
        }
        _ => query_id.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::model::{
        CollectionOverride, CollectionSchema, CollectionStats, DenormalizationSpec, DesignModels,
        FieldSpec,
    };
    use crate::planner::QueryPlanner;

    fn models() -> DesignModels {
        let mut schemas = BTreeMap::new();
        schemas.insert(
            "Product".to_string(),
            CollectionSchema::new(
                "Product",
                "IDP",
                vec![FieldSpec::new("IDP", 8), FieldSpec::new("brand", 80)],
            ),
        );
        schemas.insert(
            "Stock".to_string(),
            CollectionSchema::new(
                "Stock",
                "IDS",
                vec![FieldSpec::new("IDS", 8), FieldSpec::new("IDP", 8)],
            ),
        );
        let mut stats = BTreeMap::new();
        stats.insert("Product".to_string(), CollectionStats::new(100));
        stats.insert("Stock".to_string(), CollectionStats::new(1_000));
        let design = DenormalizationSpec::new("D1")
            .with_collection("Product", CollectionOverride::default().with_indexes(["brand"]))
            .with_collection("Stock", CollectionOverride::default());
        DesignModels::build(&schemas, &stats, &design).unwrap()
    }

    #[test]
    fn test_plan_file_stub() {
        assert_eq!(plan_file_stub("Q1"), "query1");
        assert_eq!(plan_file_stub("Q12"), "query12");
        assert_eq!(plan_file_stub("Q"), "q");
        assert_eq!(plan_file_stub("Top_Brands"), "top_brands");
        assert_eq!(plan_file_stub("Q1b"), "q1b");
    }

    #[test]
    fn test_filter_operator_document() {
        let models = models();
        let query = QuerySpec::new("Q1", "SELECT brand FROM Product WHERE brand = 'Apple'");
        let plan = QueryPlanner::new(&models).plan(&query).unwrap();
        let document = DesignPlanDocument::from_plan(&plan);

        assert_eq!(document.required_indexes["Product"], vec!["brand".to_string()]);
        let json = serde_json::to_value(&document.operators[0]).unwrap();
        assert_eq!(json["type"], "filter_without_sharding");
        assert_eq!(json["target_collection"], "Product");
        assert_eq!(json["left_collection"], Value::Null);
        assert_eq!(json["join"], Value::Null);
        assert_eq!(json["filters"][0]["field"], "brand");
        assert_eq!(json["filters"][0]["value"], "Apple");
        assert_eq!(json["scan_strategy"], "index");
    }

    #[test]
    fn test_join_operator_document() {
        let models = models();
        let query = QuerySpec::new("Q2", "SELECT S.IDS FROM Stock S JOIN Product P ON S.IDP = P.IDP");
        let plan = QueryPlanner::new(&models).plan(&query).unwrap();
        let document = DesignPlanDocument::from_plan(&plan);

        let join = document.operators.last().unwrap();
        assert_eq!(join.left_collection.as_deref(), Some("Stock"));
        assert_eq!(join.right_collection.as_deref(), Some("Product"));
        assert_eq!(
            join.join,
            Some(JoinDocument {
                left: "IDP".to_string(),
                right: "IDP".to_string(),
            })
        );
        assert!(join.target_collection.is_none());
        assert!(join.scan_strategy.is_none());
    }
}
