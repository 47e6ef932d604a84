//! Explain plan output
//!
//! Produces deterministic, human-readable explain output.

use std::fmt;

use serde_json::Value;

use super::errors::PlannerError;
use super::plan::{PlanOperator, QueryPlan};
use crate::parser::FilterPredicate;

/// One operator line of an explain plan
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainOperator {
    pub name: String,
    pub kind: String,
    /// `Product` for single-collection operators, `A x B` for joins
    pub target: String,
    pub scan_strategy: Option<String>,
    pub predicates: Vec<String>,
    pub grouping_keys: Vec<String>,
    pub output_fields: Vec<String>,
    pub indexes_used: Vec<String>,
    /// Plan index of the operators feeding a join
    pub inputs: Vec<usize>,
}

/// Explain plan output
#[derive(Debug, Clone)]
pub struct ExplainPlan {
    pub query_id: String,
    /// Whether planning succeeded
    pub accepted: bool,
    pub operators: Vec<ExplainOperator>,
    pub involved_collections: Vec<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let operators = plan
            .operators
            .iter()
            .map(|op| match op {
                PlanOperator::Filter(f) => ExplainOperator {
                    name: f.name.clone(),
                    kind: f.kind().as_str().to_string(),
                    target: f.collection.clone(),
                    scan_strategy: Some(f.scan_strategy.as_str().to_string()),
                    predicates: f.filters.iter().map(describe_predicate).collect(),
                    grouping_keys: Vec::new(),
                    output_fields: f.output_fields.clone(),
                    indexes_used: f.indexes_used.clone(),
                    inputs: Vec::new(),
                },
                PlanOperator::Join(j) => ExplainOperator {
                    name: j.name.clone(),
                    kind: j.kind().as_str().to_string(),
                    target: format!("{} x {}", j.left_collection(), j.right_collection()),
                    scan_strategy: None,
                    predicates: vec![format!(
                        "{}.{} = {}.{}",
                        j.join.left_collection,
                        j.join.left_field,
                        j.join.right_collection,
                        j.join.right_field
                    )],
                    grouping_keys: Vec::new(),
                    output_fields: j.output_fields.clone(),
                    indexes_used: Vec::new(),
                    inputs: j.left_input.into_iter().chain(j.right_input).collect(),
                },
                PlanOperator::Aggregate(a) => ExplainOperator {
                    name: a.name.clone(),
                    kind: a.kind().as_str().to_string(),
                    target: a.collection.clone(),
                    scan_strategy: None,
                    predicates: a.filters.iter().map(describe_predicate).collect(),
                    grouping_keys: a.grouping_keys.clone(),
                    output_fields: a.effective_output_fields().to_vec(),
                    indexes_used: Vec::new(),
                    inputs: Vec::new(),
                },
            })
            .collect();

        Self {
            query_id: plan.query.id.clone(),
            accepted: true,
            operators,
            involved_collections: plan.involved_collections.clone(),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(query_id: impl Into<String>, err: &PlannerError) -> Self {
        Self {
            query_id: query_id.into(),
            accepted: false,
            operators: Vec::new(),
            involved_collections: Vec::new(),
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

fn describe_predicate(predicate: &FilterPredicate) -> String {
    let value = match &predicate.value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    };
    format!("{} = {}", predicate.field, value)
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "*".to_string()
    } else {
        items.join(", ")
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN {} ===", self.query_id)?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        writeln!(f, "Collections: {}", self.involved_collections.join(", "))?;
        for (i, op) in self.operators.iter().enumerate() {
            writeln!(f, "[{}] {} ({}) on {}", i, op.name, op.kind, op.target)?;
            if let Some(strategy) = &op.scan_strategy {
                writeln!(f, "    Scan: {}", strategy)?;
            }
            if !op.indexes_used.is_empty() {
                writeln!(f, "    Index: {}", op.indexes_used.join(", "))?;
            }
            if !op.inputs.is_empty() {
                let inputs: Vec<String> = op.inputs.iter().map(|i| format!("[{}]", i)).collect();
                writeln!(f, "    Inputs: {}", inputs.join(", "))?;
            }
            if !op.predicates.is_empty() {
                writeln!(f, "    Predicates:")?;
                for pred in &op.predicates {
                    writeln!(f, "      - {}", pred)?;
                }
            }
            if !op.grouping_keys.is_empty() {
                writeln!(f, "    Group By: {}", op.grouping_keys.join(", "))?;
            }
            writeln!(f, "    Output: {}", list(&op.output_fields))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CollectionOverride, CollectionSchema, CollectionStats, DenormalizationSpec,
        DesignModels, FieldSpec, QuerySpec,
    };
    use crate::planner::QueryPlanner;
    use std::collections::BTreeMap;

    fn models() -> DesignModels {
        let mut schemas = BTreeMap::new();
        schemas.insert(
            "Product".to_string(),
            CollectionSchema::new(
                "Product",
                "IDP",
                [
                    FieldSpec::new("IDP", 8),
                    FieldSpec::new("brand", 80),
                    FieldSpec::new("price", 8),
                ],
            ),
        );
        let mut stats = BTreeMap::new();
        stats.insert("Product".to_string(), CollectionStats::new(100_000));
        let design = DenormalizationSpec::new("D1").with_collection(
            "Product",
            CollectionOverride::default().with_indexes(["brand"]),
        );
        DesignModels::build(&schemas, &stats, &design).unwrap()
    }

    #[test]
    fn test_explain_accepted_plan() {
        let models = models();
        let planner = QueryPlanner::new(&models);
        let query = QuerySpec::new("Q1", "SELECT p.price FROM Product p WHERE p.brand = 'apple'");

        let plan = planner.plan(&query).unwrap();
        let explain = ExplainPlan::from_plan(&plan);

        assert!(explain.accepted);
        assert_eq!(explain.operators.len(), 1);
        assert_eq!(explain.operators[0].scan_strategy.as_deref(), Some("index"));

        let output = format!("{}", explain);
        assert!(output.contains("ACCEPTED"));
        assert!(output.contains("brand = 'apple'"));
        assert!(output.contains("Output: price"));
    }

    #[test]
    fn test_explain_rejected_plan() {
        let err = PlannerError::unknown_collection("Stock");
        let explain = ExplainPlan::from_error("Q2", &err);

        assert!(!explain.accepted);
        assert_eq!(
            explain.rejection_code,
            Some("SHARDCOST_UNKNOWN_COLLECTION".into())
        );

        let output = format!("{}", explain);
        assert!(output.contains("REJECTED"));
        assert!(output.contains("Stock"));
    }

    #[test]
    fn test_explain_deterministic() {
        let models = models();
        let planner = QueryPlanner::new(&models);
        let query = QuerySpec::new("Q1", "SELECT * FROM Product WHERE IDP = 7");

        let plan = planner.plan(&query).unwrap();
        let explain1 = format!("{}", ExplainPlan::from_plan(&plan));
        let explain2 = format!("{}", ExplainPlan::from_plan(&plan));

        assert_eq!(explain1, explain2);
        assert!(explain1.contains("filter_with_sharding"));
        assert!(explain1.contains("Output: *"));
    }
}
