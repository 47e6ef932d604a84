//! Workload evaluation
//!
//! Runs every candidate design against every query, collects per-pair
//! results, weights them by query frequency and ranks the designs.

mod errors;
mod runner;

pub use errors::{EvaluationError, Severity, WorkloadError, WorkloadErrorCode, WorkloadResult};
pub use runner::{
    evaluate_query, DesignOutcome, DesignTotals, FailurePolicy, QueryFailure, RunOutcome,
    WorkloadRunner,
};
