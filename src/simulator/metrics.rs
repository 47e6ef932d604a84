//! Estimated volumes and costs

use crate::cost::CostBreakdown;
use crate::planner::{OperatorKind, QueryPlan};

/// Estimates for one operator
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorMetrics {
    pub operator_name: String,
    pub kind: OperatorKind,
    pub scanned_docs: u64,
    pub output_docs: u64,
    /// Bytes read from storage; shuffle traffic is counted in `shuffled_bytes`
    pub scanned_bytes: u64,
    pub output_bytes: u64,
    pub shuffled_bytes: u64,
    pub output_doc_size_bytes: u64,
    /// Total cost of the operator
    pub cost: CostBreakdown,
    /// Sub-costs making up `cost` (scan, shuffle, map, reduce)
    pub details: Vec<CostBreakdown>,
    pub notes: Vec<String>,
}

/// Estimates for one query plan against one design
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub design_id: String,
    pub plan: QueryPlan,
    pub operators: Vec<OperatorMetrics>,
    /// Elementwise sum over operators
    pub total_cost: CostBreakdown,
    pub scanned_docs: u64,
    /// Result set of the last operator
    pub output_docs: u64,
    pub scanned_bytes: u64,
    /// Result set of the last operator
    pub output_bytes: u64,
    pub shuffled_bytes: u64,
}

impl QueryResult {
    pub fn query_id(&self) -> &str {
        &self.plan.query.id
    }

    /// Workload frequency of the query
    pub fn frequency(&self) -> f64 {
        self.plan.query.frequency
    }

    pub fn operator(&self, name: &str) -> Option<&OperatorMetrics> {
        self.operators.iter().find(|m| m.operator_name == name)
    }
}
