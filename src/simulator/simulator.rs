//! Cost simulator
//!
//! Walks a plan in order and estimates, per operator, how many documents and
//! bytes are scanned, shuffled and returned. Estimates assume uniform value
//! distributions and independent predicates.

use super::errors::{SimulationError, SimulationResult};
use super::metrics::{OperatorMetrics, QueryResult};
use crate::cost::{bytes_to_gb, CostModel};
use crate::model::{
    unknown_field_note, ClusterConfig, CollectionModel, DesignModels, KEY_OVERHEAD_BYTES,
};
use crate::parser::FilterPredicate;
use crate::planner::{
    AggregateOperator, FilterOperator, JoinOperator, PlanOperator, QueryPlan, ScanStrategy,
};

/// Simulator bound to one design, cluster shape and cost model
pub struct CostSimulator<'a> {
    models: &'a DesignModels,
    cluster: &'a ClusterConfig,
    cost_model: &'a CostModel,
}

impl<'a> CostSimulator<'a> {
    pub fn new(
        models: &'a DesignModels,
        cluster: &'a ClusterConfig,
        cost_model: &'a CostModel,
    ) -> Self {
        Self {
            models,
            cluster,
            cost_model,
        }
    }

    /// Estimates every operator of `plan` and the plan totals
    pub fn simulate(&self, plan: &QueryPlan) -> SimulationResult<QueryResult> {
        let mut metrics: Vec<OperatorMetrics> = Vec::with_capacity(plan.operators.len());

        for operator in &plan.operators {
            let m = match operator {
                PlanOperator::Filter(op) => self.simulate_filter(op)?,
                PlanOperator::Join(op) => self.simulate_join(op, plan, &metrics)?,
                PlanOperator::Aggregate(op) => self.simulate_aggregate(op)?,
            };
            metrics.push(m);
        }

        let total_cost = self.cost_model.aggregate(
            format!("{}:total", plan.query.id),
            metrics.iter().map(|m| &m.cost),
        );
        let (output_docs, output_bytes) = metrics
            .last()
            .map(|m| (m.output_docs, m.output_bytes))
            .unwrap_or((0, 0));

        Ok(QueryResult {
            design_id: self.models.design_id().to_string(),
            plan: plan.clone(),
            total_cost,
            scanned_docs: metrics.iter().map(|m| m.scanned_docs).sum(),
            output_docs,
            scanned_bytes: metrics.iter().map(|m| m.scanned_bytes).sum(),
            output_bytes,
            shuffled_bytes: metrics.iter().map(|m| m.shuffled_bytes).sum(),
            operators: metrics,
        })
    }

    fn simulate_filter(&self, op: &FilterOperator) -> SimulationResult<OperatorMetrics> {
        let collection = self.collection(&op.name, &op.collection)?;

        let selectivity = predicate_selectivity(collection, &op.filters);
        let base_docs = collection.nb_documents();
        let output_docs = filtered_docs(base_docs, selectivity);

        let scanned_docs = match op.scan_strategy {
            ScanStrategy::Index => output_docs,
            ScanStrategy::Shard => {
                scanned_fraction(base_docs, self.cluster.sharding_access_fraction)
            }
            ScanStrategy::Full => scanned_fraction(base_docs, 1.0),
        };
        let scanned_bytes = scanned_docs.saturating_mul(collection.document_size_bytes());

        let mut notes = Vec::new();
        let output_doc_size = collection.output_document_size(&op.output_fields, &mut notes);
        let output_bytes = output_docs.saturating_mul(output_doc_size);

        let mut cost = self.cost_model.io_cost(
            format!("{}:filter", op.name),
            bytes_to_gb(scanned_bytes),
            false,
        );
        cost.notes.extend(notes.iter().cloned());

        Ok(OperatorMetrics {
            operator_name: op.name.clone(),
            kind: op.kind(),
            scanned_docs,
            output_docs,
            scanned_bytes,
            output_bytes,
            shuffled_bytes: 0,
            output_doc_size_bytes: output_doc_size,
            details: vec![cost.clone()],
            cost,
            notes,
        })
    }

    fn simulate_join(
        &self,
        op: &JoinOperator,
        plan: &QueryPlan,
        done: &[OperatorMetrics],
    ) -> SimulationResult<OperatorMetrics> {
        let left = self.collection(&op.name, op.left_collection())?;
        let right = self.collection(&op.name, op.right_collection())?;

        let left_upstream = upstream(op, plan, done, op.left_input, op.left_collection())?;
        let right_upstream = upstream(op, plan, done, op.right_input, op.right_collection())?;
        let (left_docs, left_bytes) = side_volume(left, left_upstream);
        let (right_docs, right_bytes) = side_volume(right, right_upstream);

        let join_selectivity = join_selectivity(
            left.stats().distinct(&op.join.left_field),
            right.stats().distinct(&op.join.right_field),
        );
        let output_docs = joined_docs(left_docs, right_docs, join_selectivity);

        let scan_bytes = left_bytes.saturating_add(right_bytes);
        let shuffle_bytes = if op.aligned { 0 } else { scan_bytes };

        let mut notes = Vec::new();
        let output_doc_size = join_output_size(&op.output_fields, left, right, &mut notes);
        let output_bytes = output_docs.saturating_mul(output_doc_size);

        let scan_cost = self.cost_model.io_cost(
            format!("{}:join_scan", op.name),
            bytes_to_gb(scan_bytes),
            false,
        );
        let shuffle_cost = self.cost_model.io_cost(
            format!("{}:join_shuffle", op.name),
            bytes_to_gb(shuffle_bytes),
            shuffle_bytes > 0,
        );
        let mut cost = self
            .cost_model
            .aggregate(format!("{}:join_total", op.name), [&scan_cost, &shuffle_cost]);
        cost.notes.extend(notes.iter().cloned());

        Ok(OperatorMetrics {
            operator_name: op.name.clone(),
            kind: op.kind(),
            scanned_docs: left_docs.saturating_add(right_docs),
            output_docs,
            scanned_bytes: scan_bytes.saturating_add(shuffle_bytes),
            output_bytes,
            shuffled_bytes: shuffle_bytes,
            output_doc_size_bytes: output_doc_size,
            cost,
            details: vec![scan_cost, shuffle_cost],
            notes,
        })
    }

    fn simulate_aggregate(&self, op: &AggregateOperator) -> SimulationResult<OperatorMetrics> {
        if op.grouping_keys.is_empty() {
            return Err(SimulationError::aggregate_config(&op.name));
        }
        let collection = self.collection(&op.name, &op.collection)?;

        let selectivity = predicate_selectivity(collection, &op.filters);
        let base_docs = collection.nb_documents();
        let input_docs = filtered_docs(base_docs, selectivity);
        let output_docs = group_cardinality(collection, &op.grouping_keys, input_docs);

        let mut notes = Vec::new();
        let output_doc_size =
            collection.output_document_size(op.effective_output_fields(), &mut notes);
        let output_bytes = output_docs.saturating_mul(output_doc_size);

        let fraction = if op.aligned {
            self.cluster.sharding_access_fraction
        } else {
            1.0
        };
        let scan_bytes =
            (collection.document_size_bytes() as f64 * input_docs as f64 * fraction).floor() as u64;
        let shuffle_bytes = if op.aligned {
            0
        } else {
            output_bytes.saturating_mul(self.cluster.nb_servers)
        };

        let map_cost = self.cost_model.io_cost(
            format!("{}:map", op.name),
            bytes_to_gb(scan_bytes),
            false,
        );
        let shuffle_cost = self.cost_model.io_cost(
            format!("{}:shuffle", op.name),
            bytes_to_gb(shuffle_bytes),
            shuffle_bytes > 0,
        );
        let reduce_cost = self.cost_model.io_cost(
            format!("{}:reduce", op.name),
            bytes_to_gb(shuffle_bytes.saturating_add(output_bytes)),
            false,
        );
        let mut cost = self.cost_model.aggregate(
            format!("{}:aggregate_total", op.name),
            [&map_cost, &shuffle_cost, &reduce_cost],
        );
        cost.notes.extend(notes.iter().cloned());

        Ok(OperatorMetrics {
            operator_name: op.name.clone(),
            kind: op.kind(),
            scanned_docs: input_docs,
            output_docs,
            scanned_bytes: scan_bytes.saturating_add(shuffle_bytes),
            output_bytes,
            shuffled_bytes: shuffle_bytes,
            output_doc_size_bytes: output_doc_size,
            cost,
            details: vec![map_cost, shuffle_cost, reduce_cost],
            notes,
        })
    }

    fn collection(&self, operator: &str, name: &str) -> SimulationResult<&'a CollectionModel> {
        self.models
            .collection(name)
            .ok_or_else(|| SimulationError::unknown_collection(operator, name))
    }
}

/// Metrics of the filter feeding one join side, if the plan has one
fn upstream<'m>(
    op: &JoinOperator,
    plan: &QueryPlan,
    done: &'m [OperatorMetrics],
    input: Option<usize>,
    collection: &str,
) -> SimulationResult<Option<&'m OperatorMetrics>> {
    let Some(index) = input else {
        return Ok(None);
    };
    let feeds_side = plan
        .operators
        .get(index)
        .and_then(PlanOperator::as_filter)
        .map_or(false, |filter| filter.collection == collection);
    match done.get(index) {
        Some(metrics) if feeds_side => Ok(Some(metrics)),
        _ => Err(SimulationError::missing_upstream(&op.name, index)),
    }
}

/// (docs, bytes) entering a join side
fn side_volume(collection: &CollectionModel, upstream: Option<&OperatorMetrics>) -> (u64, u64) {
    match upstream {
        Some(m) => (m.output_docs, m.output_bytes),
        None => {
            let docs = collection.nb_documents();
            (docs, docs.saturating_mul(collection.document_size_bytes()))
        }
    }
}

/// Product of per-predicate selectivities
pub(crate) fn predicate_selectivity(
    collection: &CollectionModel,
    filters: &[FilterPredicate],
) -> f64 {
    filters
        .iter()
        .map(|f| collection.selectivity(&f.field))
        .product()
}

/// Matching documents; at least one when anything can match
pub(crate) fn filtered_docs(base_docs: u64, selectivity: f64) -> u64 {
    let estimate = (base_docs as f64 * selectivity).floor() as u64;
    if base_docs > 0 && selectivity > 0.0 {
        estimate.max(1)
    } else {
        estimate
    }
}

/// Documents read when a fraction of the shards is touched; at least one
pub(crate) fn scanned_fraction(base_docs: u64, fraction: f64) -> u64 {
    let scanned = (base_docs as f64 * fraction).floor() as u64;
    if base_docs > 0 {
        scanned.max(1)
    } else {
        0
    }
}

/// `1 / max(left distinct, right distinct, 1)`
pub(crate) fn join_selectivity(left_distinct: Option<u64>, right_distinct: Option<u64>) -> f64 {
    let cardinality = left_distinct
        .unwrap_or(0)
        .max(right_distinct.unwrap_or(0))
        .max(1);
    1.0 / cardinality as f64
}

/// Joined documents; at least one when both sides are non-empty
pub(crate) fn joined_docs(left_docs: u64, right_docs: u64, selectivity: f64) -> u64 {
    let estimate = (left_docs.min(right_docs) as f64 * selectivity).floor() as u64;
    if left_docs > 0 && right_docs > 0 {
        estimate.max(1)
    } else {
        estimate
    }
}

/// Distinct groups, at most `input_docs` and never below one
pub(crate) fn group_cardinality(
    collection: &CollectionModel,
    grouping_keys: &[String],
    input_docs: u64,
) -> u64 {
    let mut groups: u64 = 1;
    for key in grouping_keys {
        let distinct = collection.stats().distinct(key).unwrap_or(input_docs);
        groups = groups.saturating_mul(distinct);
        if groups >= input_docs {
            break;
        }
    }
    groups.min(input_docs).max(1)
}

/// Output document size of a join.
///
/// Fields resolve by `left.`/`right.` or collection-name prefix; bare fields
/// belong to the left side. No fields means both whole documents.
fn join_output_size(
    fields: &[String],
    left: &CollectionModel,
    right: &CollectionModel,
    notes: &mut Vec<String>,
) -> u64 {
    if fields.is_empty() {
        return left.document_size_bytes() + right.document_size_bytes();
    }
    fields
        .iter()
        .map(|field| {
            let (side, name) = match field.split_once('.') {
                Some(("left", rest)) => (left, rest),
                Some(("right", rest)) => (right, rest),
                Some((prefix, rest)) if prefix == left.name() => (left, rest),
                Some((prefix, rest)) if prefix == right.name() => (right, rest),
                _ => (left, field.as_str()),
            };
            let size = side.field_size(name);
            if size.is_defaulted() {
                notes.push(unknown_field_note(side.name(), name));
            }
            KEY_OVERHEAD_BYTES + size.bytes()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CollectionConfig, CollectionSchema, CollectionStats, FieldSpec};

    fn stock() -> CollectionModel {
        CollectionModel::new(
            CollectionSchema::new(
                "Stock",
                "IDS",
                [FieldSpec::new("IDP", 8), FieldSpec::new("IDW", 8)],
            ),
            CollectionStats::new(1_000)
                .with_distinct("IDP", 10)
                .with_distinct("IDW", 50),
            CollectionConfig::new("IDP"),
        )
    }

    #[test]
    fn test_filtered_docs_never_zero_when_matching() {
        assert_eq!(filtered_docs(100, 0.0001), 1);
        assert_eq!(filtered_docs(100, 0.1), 10);
        assert_eq!(filtered_docs(0, 0.5), 0);
        assert_eq!(filtered_docs(100, 0.0), 0);
    }

    #[test]
    fn test_scanned_fraction_rounds_up_to_one() {
        assert_eq!(scanned_fraction(5, 0.1), 1);
        assert_eq!(scanned_fraction(100, 0.1), 10);
        assert_eq!(scanned_fraction(100, 1.0), 100);
        assert_eq!(scanned_fraction(0, 0.1), 0);
    }

    #[test]
    fn test_join_selectivity() {
        assert_eq!(join_selectivity(Some(10), Some(100)), 0.01);
        assert_eq!(join_selectivity(None, Some(4)), 0.25);
        assert_eq!(join_selectivity(None, None), 1.0);
    }

    #[test]
    fn test_joined_docs() {
        assert_eq!(joined_docs(10, 1000, 0.001), 1);
        assert_eq!(joined_docs(1000, 2000, 0.01), 10);
        assert_eq!(joined_docs(0, 2000, 0.01), 0);
    }

    #[test]
    fn test_group_cardinality_stops_early_and_clamps() {
        let stock = stock();
        // 10 * 50 = 500 < 1000
        assert_eq!(
            group_cardinality(&stock, &["IDP".to_string(), "IDW".to_string()], 1000),
            500
        );
        // 10 * 50 > 100, clamped
        assert_eq!(
            group_cardinality(&stock, &["IDP".to_string(), "IDW".to_string()], 100),
            100
        );
        // Unknown key counts as input_docs
        assert_eq!(group_cardinality(&stock, &["other".to_string()], 42), 42);
    }

    #[test]
    fn test_group_cardinality_of_empty_input_is_one() {
        let stock = stock();
        assert_eq!(group_cardinality(&stock, &["IDP".to_string()], 0), 1);
        assert_eq!(group_cardinality(&stock, &["other".to_string()], 0), 1);
    }

    #[test]
    fn test_join_output_size_resolution() {
        let left = stock();
        let mut notes = Vec::new();
        let size = join_output_size(
            &[
                "left.IDP".to_string(),
                "Stock.IDW".to_string(),
                "missing".to_string(),
            ],
            &left,
            &left,
            &mut notes,
        );
        assert_eq!(size, 3 * KEY_OVERHEAD_BYTES + 8 + 8 + 8);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("missing"));
    }
}
