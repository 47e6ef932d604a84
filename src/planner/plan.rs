//! Physical plan types
//!
//! A plan is an ordered list of operators. Operators are a closed set, so the
//! simulator dispatches with an exhaustive match. A join refers to the filters
//! feeding it by their position in the plan, never by name.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::errors::{PlannerError, PlannerResult};
use crate::model::QuerySpec;
use crate::parser::{FilterPredicate, JoinPredicate};

/// How a filter reaches its documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStrategy {
    /// Point lookup on the sharding key; touches a fraction of the shards
    Shard,
    /// Secondary index; reads only matching documents
    Index,
    /// Reads every document
    Full,
}

impl ScanStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStrategy::Shard => "shard",
            ScanStrategy::Index => "index",
            ScanStrategy::Full => "full",
        }
    }
}

/// Operator kind as reported in plans and summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    FilterWithSharding,
    FilterWithoutSharding,
    NestedLoopWithSharding,
    NestedLoopWithoutSharding,
    AggregateWithSharding,
    AggregateWithoutSharding,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::FilterWithSharding => "filter_with_sharding",
            OperatorKind::FilterWithoutSharding => "filter_without_sharding",
            OperatorKind::NestedLoopWithSharding => "nested_loop_with_sharding",
            OperatorKind::NestedLoopWithoutSharding => "nested_loop_without_sharding",
            OperatorKind::AggregateWithSharding => "aggregate_with_sharding",
            OperatorKind::AggregateWithoutSharding => "aggregate_without_sharding",
        }
    }
}

/// Selection over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOperator {
    pub name: String,
    pub collection: String,
    pub filters: Vec<FilterPredicate>,
    /// Canonical field paths on `collection`; empty means the whole document
    pub output_fields: Vec<String>,
    pub scan_strategy: ScanStrategy,
    pub indexes_used: Vec<String>,
}

impl FilterOperator {
    pub fn kind(&self) -> OperatorKind {
        if self.uses_sharding() {
            OperatorKind::FilterWithSharding
        } else {
            OperatorKind::FilterWithoutSharding
        }
    }

    pub fn uses_sharding(&self) -> bool {
        self.scan_strategy == ScanStrategy::Shard
    }
}

/// Nested-loop equality join of two collections
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOperator {
    pub name: String,
    pub join: JoinPredicate,
    /// `collection.field` paths, or `left.`/`right.` prefixed, or bare (left side)
    pub output_fields: Vec<String>,
    /// Both join fields are their side's sharding key
    pub aligned: bool,
    /// Plan index of the filter feeding the left side
    pub left_input: Option<usize>,
    /// Plan index of the filter feeding the right side
    pub right_input: Option<usize>,
}

impl JoinOperator {
    pub fn kind(&self) -> OperatorKind {
        if self.aligned {
            OperatorKind::NestedLoopWithSharding
        } else {
            OperatorKind::NestedLoopWithoutSharding
        }
    }

    pub fn left_collection(&self) -> &str {
        &self.join.left_collection
    }

    pub fn right_collection(&self) -> &str {
        &self.join.right_collection
    }
}

/// Single-stage map/shuffle/reduce grouping over one collection
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOperator {
    pub name: String,
    pub collection: String,
    /// Predicates already applied before grouping
    pub filters: Vec<FilterPredicate>,
    pub grouping_keys: Vec<String>,
    /// Output fields; the grouping keys when empty
    pub output_fields: Vec<String>,
    /// Sharding may be exploited when the sharding key is a grouping key
    pub use_sharding: bool,
    /// Grouping is co-located with the shards, no shuffle needed
    pub aligned: bool,
}

impl AggregateOperator {
    /// Builds an aggregate; grouping keys must not be empty
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        grouping_keys: Vec<String>,
    ) -> PlannerResult<Self> {
        let name = name.into();
        if grouping_keys.is_empty() {
            return Err(PlannerError::aggregate_config(name));
        }
        Ok(Self {
            name,
            collection: collection.into(),
            filters: Vec::new(),
            grouping_keys,
            output_fields: Vec::new(),
            use_sharding: true,
            aligned: false,
        })
    }

    pub fn with_filters(mut self, filters: Vec<FilterPredicate>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_output_fields(mut self, fields: Vec<String>) -> Self {
        self.output_fields = fields;
        self
    }

    /// Records alignment against the collection's sharding key
    pub fn aligned_on(mut self, sharding_key: &str) -> Self {
        self.aligned = self.use_sharding && self.grouping_keys.iter().any(|k| k == sharding_key);
        self
    }

    /// Fields sized for the output document
    pub fn effective_output_fields(&self) -> &[String] {
        if self.output_fields.is_empty() {
            &self.grouping_keys
        } else {
            &self.output_fields
        }
    }

    pub fn kind(&self) -> OperatorKind {
        if self.aligned {
            OperatorKind::AggregateWithSharding
        } else {
            OperatorKind::AggregateWithoutSharding
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanOperator {
    Filter(FilterOperator),
    Join(JoinOperator),
    Aggregate(AggregateOperator),
}

impl PlanOperator {
    pub fn name(&self) -> &str {
        match self {
            PlanOperator::Filter(op) => &op.name,
            PlanOperator::Join(op) => &op.name,
            PlanOperator::Aggregate(op) => &op.name,
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            PlanOperator::Filter(op) => op.kind(),
            PlanOperator::Join(op) => op.kind(),
            PlanOperator::Aggregate(op) => op.kind(),
        }
    }

    pub fn output_fields(&self) -> &[String] {
        match self {
            PlanOperator::Filter(op) => &op.output_fields,
            PlanOperator::Join(op) => &op.output_fields,
            PlanOperator::Aggregate(op) => &op.output_fields,
        }
    }

    pub fn as_filter(&self) -> Option<&FilterOperator> {
        match self {
            PlanOperator::Filter(op) => Some(op),
            _ => None,
        }
    }
}

/// Ordered operators of one query against one design
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub query: QuerySpec,
    pub operators: Vec<PlanOperator>,
    /// Collections read by the plan, sorted
    pub involved_collections: Vec<String>,
}

impl QueryPlan {
    /// Indexes each collection needs for this plan
    pub fn required_indexes(&self) -> BTreeMap<String, Vec<String>> {
        let mut required: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for op in &self.operators {
            if let PlanOperator::Filter(filter) = op {
                if !filter.indexes_used.is_empty() {
                    required
                        .entry(filter.collection.clone())
                        .or_default()
                        .extend(filter.indexes_used.iter().cloned());
                }
            }
        }
        required
            .into_iter()
            .map(|(collection, fields)| (collection, fields.into_iter().collect()))
            .collect()
    }

    /// Operator kinds joined with arrows, e.g. `filter_with_sharding -> nested_loop_with_sharding`
    pub fn summary(&self) -> String {
        self.operators
            .iter()
            .map(|op| op.kind().as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn join_count(&self) -> usize {
        self.operators
            .iter()
            .filter(|op| matches!(op, PlanOperator::Join(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(name: &str, strategy: ScanStrategy, indexes: &[&str]) -> PlanOperator {
        PlanOperator::Filter(FilterOperator {
            name: name.to_string(),
            collection: "Stock".to_string(),
            filters: vec![FilterPredicate::new("Stock", "IDW", json!(3))],
            output_fields: Vec::new(),
            scan_strategy: strategy,
            indexes_used: indexes.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_filter_kind_follows_strategy() {
        assert_eq!(
            filter("f", ScanStrategy::Shard, &[]).kind(),
            OperatorKind::FilterWithSharding
        );
        assert_eq!(
            filter("f", ScanStrategy::Index, &["IDW"]).kind(),
            OperatorKind::FilterWithoutSharding
        );
        assert_eq!(
            filter("f", ScanStrategy::Full, &[]).kind().as_str(),
            "filter_without_sharding"
        );
    }

    #[test]
    fn test_aggregate_requires_grouping_keys() {
        let err = AggregateOperator::new("Q1_aggregate", "Stock", Vec::new()).unwrap_err();
        assert_eq!(err.code().code(), "SHARDCOST_AGGREGATE_CONFIG");
    }

    #[test]
    fn test_aggregate_alignment() {
        let agg = AggregateOperator::new("a", "Stock", vec!["IDP".to_string()])
            .unwrap()
            .aligned_on("IDP");
        assert_eq!(agg.kind(), OperatorKind::AggregateWithSharding);
        assert_eq!(agg.effective_output_fields(), ["IDP".to_string()]);

        let agg = AggregateOperator::new("a", "Stock", vec!["IDW".to_string()])
            .unwrap()
            .aligned_on("IDP");
        assert_eq!(agg.kind(), OperatorKind::AggregateWithoutSharding);
    }

    #[test]
    fn test_required_indexes_and_summary() {
        let plan = QueryPlan {
            query: QuerySpec::new("Q1", "SELECT * FROM Stock"),
            operators: vec![
                filter("a", ScanStrategy::Index, &["IDW"]),
                filter("b", ScanStrategy::Index, &["IDW"]),
            ],
            involved_collections: vec!["Stock".to_string()],
        };
        let required = plan.required_indexes();
        assert_eq!(required["Stock"], vec!["IDW".to_string()]);
        assert_eq!(
            plan.summary(),
            "filter_without_sharding -> filter_without_sharding"
        );
        assert_eq!(plan.join_count(), 0);
    }
}
