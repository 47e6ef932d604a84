//! Query planner
//!
//! Turns a workload query into a physical plan against one built design.
//! Cases, checked in order:
//!
//! 1. No join. Plan against the FROM collection if the design has it; if it
//!    was embedded elsewhere, plan against the embedding target with every
//!    path prefixed by the embed path.
//! 2. Join where one side is embedded in the other. The join disappears: a
//!    single operator reads the target, embedded-side paths get the prefix.
//! 3. Join of two materialized collections. One filter per side carrying
//!    predicates, then one nested-loop join.
//!
//! Scan strategy per filter, decided by its first predicate (first match wins):
//! 1. Field is the sharding key
//! 2. Field is indexed
//! 3. Full scan
//!
//! Planning is deterministic: same design and query give the same plan.

use std::collections::BTreeSet;

use super::errors::{PlannerError, PlannerResult};
use super::plan::{
    AggregateOperator, FilterOperator, JoinOperator, PlanOperator, QueryPlan, ScanStrategy,
};
use crate::model::{CollectionConfig, DesignModels, EmbedSpec, QuerySpec};
use crate::parser::{parse_query, FilterPredicate, JoinPredicate, ParsedQuery};

/// Path rewrite applied when reading a collection through its embedding target
struct EmbedRewrite<'e> {
    /// Collection whose paths get the prefix
    owner: &'e str,
    embed: &'e EmbedSpec,
}

/// Query planner bound to one design
pub struct QueryPlanner<'a> {
    models: &'a DesignModels,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(models: &'a DesignModels) -> Self {
        Self { models }
    }

    /// Plans a query, returning an immutable plan or error
    pub fn plan(&self, query: &QuerySpec) -> PlannerResult<QueryPlan> {
        let parsed = parse_query(&query.sql)?;
        match &parsed.join {
            Some(join) => self.plan_join(query, &parsed, join),
            None => self.plan_single(query, &parsed),
        }
    }

    fn plan_single(&self, query: &QuerySpec, parsed: &ParsedQuery) -> PlannerResult<QueryPlan> {
        let source = parsed.base_collection.as_str();

        if self.models.contains(source) {
            return self.plan_collapsed(query, parsed, source, None);
        }

        let embed = self
            .models
            .embedding_of(source)
            .ok_or_else(|| PlannerError::unknown_collection(source))?;
        let rewrite = EmbedRewrite {
            owner: source,
            embed,
        };
        self.plan_collapsed(query, parsed, &embed.target, Some(rewrite))
    }

    fn plan_join(
        &self,
        query: &QuerySpec,
        parsed: &ParsedQuery,
        join: &JoinPredicate,
    ) -> PlannerResult<QueryPlan> {
        let left = join.left_collection.as_str();
        let right = join.right_collection.as_str();

        let collapse = match (self.models.embed(left, right), self.models.embed(right, left)) {
            (Some(embed), _) => Some((right, EmbedRewrite { owner: left, embed })),
            (None, Some(embed)) => Some((left, EmbedRewrite { owner: right, embed })),
            (None, None) => None,
        };
        if let Some((base, rewrite)) = collapse {
            return self.plan_collapsed(query, parsed, base, Some(rewrite));
        }

        let left_config = self.config_of(left)?;
        let right_config = self.config_of(right)?;

        if !parsed.group_by.is_empty() {
            return Err(PlannerError::unsupported_query(format!(
                "GROUP BY over a join of '{}' and '{}' needs an embedding between them",
                left, right
            )));
        }

        let mut operators = Vec::new();
        let mut side_input = |collection: &str, config: &CollectionConfig| -> Option<usize> {
            let filters: Vec<FilterPredicate> = parsed.filters_on(collection).cloned().collect();
            if filters.is_empty() {
                return None;
            }
            let (scan_strategy, indexes_used) = choose_scan_strategy(&filters, config);
            operators.push(PlanOperator::Filter(FilterOperator {
                name: format!("{}_filter_{}", query.id, collection),
                collection: collection.to_string(),
                filters,
                output_fields: Vec::new(),
                scan_strategy,
                indexes_used,
            }));
            Some(operators.len() - 1)
        };

        let left_input = side_input(left, left_config);
        let right_input = if left == right {
            left_input
        } else {
            side_input(right, right_config)
        };

        let aligned = left_config.is_sharding_key(&join.left_field)
            && right_config.is_sharding_key(&join.right_field);

        operators.push(PlanOperator::Join(JoinOperator {
            name: format!("{}_join", query.id),
            join: join.clone(),
            output_fields: parsed.select_fields.clone(),
            aligned,
            left_input,
            right_input,
        }));

        let involved: BTreeSet<String> = [left.to_string(), right.to_string()].into();
        Ok(QueryPlan {
            query: query.clone(),
            operators,
            involved_collections: involved.into_iter().collect(),
        })
    }

    /// Single operator over `base`, optionally reading an embedded collection
    fn plan_collapsed(
        &self,
        query: &QuerySpec,
        parsed: &ParsedQuery,
        base: &str,
        rewrite: Option<EmbedRewrite<'_>>,
    ) -> PlannerResult<QueryPlan> {
        let config = self.config_of(base)?;

        let filters: Vec<FilterPredicate> = parsed
            .filters
            .iter()
            .map(|predicate| {
                let field = match &rewrite {
                    Some(r) if predicate.collection == r.owner => {
                        r.embed.embedded_path(&predicate.field)
                    }
                    _ => predicate.field.clone(),
                };
                FilterPredicate::new(base, field, predicate.value.clone())
            })
            .collect();

        let output_fields = rewrite_fields(&parsed.select_fields, parsed, base, &rewrite);

        let operator = if parsed.group_by.is_empty() {
            let (scan_strategy, indexes_used) = choose_scan_strategy(&filters, config);
            PlanOperator::Filter(FilterOperator {
                name: format!("{}_filter", query.id),
                collection: base.to_string(),
                filters,
                output_fields,
                scan_strategy,
                indexes_used,
            })
        } else {
            let grouping_keys = rewrite_fields(&parsed.group_by, parsed, base, &rewrite);
            PlanOperator::Aggregate(
                AggregateOperator::new(format!("{}_aggregate", query.id), base, grouping_keys)?
                    .with_filters(filters)
                    .with_output_fields(output_fields)
                    .aligned_on(&config.sharding_key),
            )
        };

        Ok(QueryPlan {
            query: query.clone(),
            operators: vec![operator],
            involved_collections: vec![base.to_string()],
        })
    }

    fn config_of(&self, collection: &str) -> PlannerResult<&'a CollectionConfig> {
        self.models
            .collection(collection)
            .map(|model| model.config())
            .ok_or_else(|| PlannerError::unknown_collection(collection))
    }
}

/// Maps select or group-by paths onto `base`.
///
/// `base.x` becomes `x`. Paths of the embedded collection, and bare paths when
/// the whole query reads the embedded collection, get the embed prefix. Paths
/// with any other qualifier are kept as written.
fn rewrite_fields(
    fields: &[String],
    parsed: &ParsedQuery,
    base: &str,
    rewrite: &Option<EmbedRewrite<'_>>,
) -> Vec<String> {
    let single_source = parsed.join.is_none();
    fields
        .iter()
        .map(|field| {
            let qualified = field
                .split_once('.')
                .filter(|(qualifier, _)| parsed.aliases.values().any(|c| c == qualifier));

            match (qualified, rewrite) {
                (Some((qualifier, rest)), Some(r)) if qualifier == r.owner => {
                    r.embed.embedded_path(rest)
                }
                (Some((qualifier, rest)), _) if qualifier == base => rest.to_string(),
                (None, Some(r)) if single_source => r.embed.embedded_path(field),
                _ => field.clone(),
            }
        })
        .collect()
}

/// Picks the scan strategy from the first predicate on one collection
fn choose_scan_strategy(
    filters: &[FilterPredicate],
    config: &CollectionConfig,
) -> (ScanStrategy, Vec<String>) {
    let Some(field) = filters.first().map(|f| f.field.as_str()) else {
        return (ScanStrategy::Full, Vec::new());
    };

    if config.is_sharding_key(field) {
        (ScanStrategy::Shard, Vec::new())
    } else if config.is_indexed(field) {
        (ScanStrategy::Index, vec![field.to_string()])
    } else {
        (ScanStrategy::Full, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_predicate_on_sharding_key() {
        let config = CollectionConfig::new("IDP").with_indexes(["brand"]);
        let filters = vec![
            FilterPredicate::new("Product", "IDP", json!(1)),
            FilterPredicate::new("Product", "brand", json!("apple")),
        ];
        let (strategy, used) = choose_scan_strategy(&filters, &config);
        assert_eq!(strategy, ScanStrategy::Shard);
        assert!(used.is_empty());
    }

    #[test]
    fn test_later_sharding_key_predicate_ignored() {
        let config = CollectionConfig::new("IDP");
        let filters = vec![
            FilterPredicate::new("Product", "brand", json!("apple")),
            FilterPredicate::new("Product", "IDP", json!(1)),
        ];
        let (strategy, used) = choose_scan_strategy(&filters, &config);
        assert_eq!(strategy, ScanStrategy::Full);
        assert!(used.is_empty());
    }

    #[test]
    fn test_index_taken_from_first_predicate() {
        let config = CollectionConfig::new("IDP").with_indexes(["brand", "categorie"]);
        let filters = vec![
            FilterPredicate::new("Product", "categorie", json!("phone")),
            FilterPredicate::new("Product", "brand", json!("apple")),
        ];
        let (strategy, used) = choose_scan_strategy(&filters, &config);
        assert_eq!(strategy, ScanStrategy::Index);
        assert_eq!(used, vec!["categorie".to_string()]);
    }

    #[test]
    fn test_no_predicates_full_scan() {
        let config = CollectionConfig::new("IDP");
        let (strategy, used) = choose_scan_strategy(&[], &config);
        assert_eq!(strategy, ScanStrategy::Full);
        assert!(used.is_empty());
    }
}
