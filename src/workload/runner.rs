//! Designs x queries evaluation loop
//!
//! Every (design, query) evaluation is pure; this module is the only place
//! that logs around parsing, planning and simulation.

use std::cmp::Ordering;

use crate::cost::CostModel;
use crate::loader::Workload;
use crate::model::{ClusterConfig, DenormalizationSpec, DesignModels, ModelError, QuerySpec};
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::planner::QueryPlanner;
use crate::simulator::{CostSimulator, QueryResult};

use super::errors::{EvaluationError, WorkloadError, WorkloadResult};

/// What to do when a design or (design, query) pair fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and keep going
    #[default]
    Continue,
    /// Stop the run at the first failure
    Abort,
}

/// A query that could not be planned or simulated for one design
#[derive(Debug, Clone)]
pub struct QueryFailure {
    pub query_id: String,
    pub error: EvaluationError,
}

/// Frequency-weighted totals of one design
#[derive(Debug, Clone, PartialEq)]
pub struct DesignTotals {
    pub design_id: String,
    pub time: f64,
    pub carbon: f64,
    pub price: f64,
}

impl DesignTotals {
    pub fn from_results<'a>(
        design_id: impl Into<String>,
        results: impl IntoIterator<Item = &'a QueryResult>,
    ) -> Self {
        let mut totals = Self {
            design_id: design_id.into(),
            time: 0.0,
            carbon: 0.0,
            price: 0.0,
        };
        for result in results {
            let weight = result.frequency();
            totals.time += result.total_cost.time_cost * weight;
            totals.carbon += result.total_cost.carbon_cost * weight;
            totals.price += result.total_cost.price_cost * weight;
        }
        totals
    }

    /// Leaderboard order: price, then carbon, then time
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.price
            .total_cmp(&other.price)
            .then(self.carbon.total_cmp(&other.carbon))
            .then(self.time.total_cmp(&other.time))
    }
}

/// Outcome of evaluating every query against one design
#[derive(Debug, Clone)]
pub struct DesignOutcome {
    pub design_id: String,
    pub description: String,
    /// Successful evaluations in query order
    pub results: Vec<QueryResult>,
    pub failures: Vec<QueryFailure>,
    /// Set when the design's models could not be built; no query was evaluated
    pub model_error: Option<ModelError>,
}

impl DesignOutcome {
    fn new(design: &DenormalizationSpec) -> Self {
        Self {
            design_id: design.id.clone(),
            description: design.description.clone(),
            results: Vec::new(),
            failures: Vec::new(),
            model_error: None,
        }
    }

    /// True if the models were built and every query succeeded
    pub fn is_complete(&self) -> bool {
        self.model_error.is_none() && self.failures.is_empty()
    }

    pub fn totals(&self) -> DesignTotals {
        DesignTotals::from_results(&self.design_id, &self.results)
    }

    pub fn result(&self, query_id: &str) -> Option<&QueryResult> {
        self.results.iter().find(|r| r.query_id() == query_id)
    }
}

/// Outcome of a whole run, designs in input order
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub designs: Vec<DesignOutcome>,
}

impl RunOutcome {
    pub fn design(&self, design_id: &str) -> Option<&DesignOutcome> {
        self.designs.iter().find(|d| d.design_id == design_id)
    }

    /// All successful results, design-major
    pub fn results(&self) -> impl Iterator<Item = &QueryResult> {
        self.designs.iter().flat_map(|d| d.results.iter())
    }

    /// Number of failed designs plus failed (design, query) pairs
    pub fn failure_count(&self) -> usize {
        self.designs
            .iter()
            .map(|d| d.failures.len() + usize::from(d.model_error.is_some()))
            .sum()
    }

    /// Totals of the complete designs, best first
    ///
    /// Ties keep input order.
    pub fn leaderboard(&self) -> Vec<DesignTotals> {
        let mut board: Vec<DesignTotals> = self
            .designs
            .iter()
            .filter(|d| d.is_complete())
            .map(DesignOutcome::totals)
            .collect();
        board.sort_by(DesignTotals::rank_cmp);
        board
    }
}

/// Plans and simulates one query against built models
pub fn evaluate_query(
    models: &DesignModels,
    cluster: &ClusterConfig,
    cost_model: &CostModel,
    query: &QuerySpec,
) -> Result<QueryResult, EvaluationError> {
    let plan = QueryPlanner::new(models).plan(query)?;
    let result = CostSimulator::new(models, cluster, cost_model).simulate(&plan)?;
    Ok(result)
}

/// Evaluates every design of a workload against every query
pub struct WorkloadRunner<'a> {
    workload: &'a Workload,
    cost_model: &'a CostModel,
    policy: FailurePolicy,
}

impl<'a> WorkloadRunner<'a> {
    pub fn new(workload: &'a Workload, cost_model: &'a CostModel) -> Self {
        Self {
            workload,
            cost_model,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Runs all designs in input order
    ///
    /// Under [`FailurePolicy::Abort`] the first failure is returned as an error
    /// and no partial outcome is kept.
    pub fn run(&self) -> WorkloadResult<RunOutcome> {
        let mut outcome = RunOutcome::default();
        for design in &self.workload.designs {
            outcome.designs.push(self.evaluate_design(design)?);
        }
        Ok(outcome)
    }

    /// Builds the models of `design` and evaluates every query against them
    pub fn evaluate_design(&self, design: &DenormalizationSpec) -> WorkloadResult<DesignOutcome> {
        let scope = ObservationScope::with_fields("DESIGN", &[("design", design.id.as_str())]);
        let mut outcome = DesignOutcome::new(design);

        let models =
            match DesignModels::build(&self.workload.schemas, &self.workload.stats, design) {
                Ok(models) => models,
                Err(e) => {
                    scope.fail(&e.to_string());
                    if self.policy == FailurePolicy::Abort {
                        return Err(WorkloadError::aborted(&design.id, None, e.into()));
                    }
                    outcome.model_error = Some(e);
                    return Ok(outcome);
                }
            };

        for query in &self.workload.queries {
            match self.evaluate_logged(&models, query) {
                Ok(result) => outcome.results.push(result),
                Err(e) => {
                    if self.policy == FailurePolicy::Abort {
                        scope.fail(&e.to_string());
                        return Err(WorkloadError::aborted(&design.id, Some(query.id.clone()), e));
                    }
                    outcome.failures.push(QueryFailure {
                        query_id: query.id.clone(),
                        error: e,
                    });
                }
            }
        }

        let succeeded = outcome.results.len().to_string();
        let failed = outcome.failures.len().to_string();
        scope.complete_with_fields(&[
            ("queries_failed", failed.as_str()),
            ("queries_succeeded", succeeded.as_str()),
        ]);
        Ok(outcome)
    }

    fn evaluate_logged(
        &self,
        models: &DesignModels,
        query: &QuerySpec,
    ) -> Result<QueryResult, EvaluationError> {
        let design_id = models.design_id();
        let plan = match QueryPlanner::new(models).plan(query) {
            Ok(plan) => plan,
            Err(e) => {
                let e = EvaluationError::from(e);
                log_rejection(design_id, &query.id, &e);
                return Err(e);
            }
        };
        log_event_with_fields(
            Event::QueryPlanned,
            &[
                ("design", design_id),
                ("plan", plan.summary().as_str()),
                ("query", query.id.as_str()),
            ],
        );

        let simulator = CostSimulator::new(models, &self.workload.cluster, self.cost_model);
        match simulator.simulate(&plan) {
            Ok(result) => {
                let price = result.total_cost.price_cost.to_string();
                log_event_with_fields(
                    Event::QuerySimulated,
                    &[
                        ("design", design_id),
                        ("price", price.as_str()),
                        ("query", query.id.as_str()),
                    ],
                );
                Ok(result)
            }
            Err(e) => {
                let e = EvaluationError::from(e);
                log_rejection(design_id, &query.id, &e);
                Err(e)
            }
        }
    }
}

fn log_rejection(design_id: &str, query_id: &str, error: &EvaluationError) {
    log_event_with_fields(
        Event::QueryRejected,
        &[
            ("code", error.code()),
            ("design", design_id),
            ("query", query_id),
            ("reason", error.message()),
        ],
    );
}
