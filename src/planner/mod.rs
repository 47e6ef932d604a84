//! Query planner subsystem
//!
//! Builds a physical operator plan for one query against one built design,
//! rewriting paths across embedding boundaries.
//!
//! # Design Principles
//!
//! - Deterministic: same design and query give the same plan
//! - Closed operator set: Filter, Join, Aggregate
//! - Canonical paths: operator output fields are already rewritten, so the
//!   simulator never resolves aliases
//!
//! # Scan Strategy Priority (strict order)
//!
//! 1. First predicate on the sharding key
//! 2. First predicate on an indexed field
//! 3. Full scan
//!
//! Later predicates only narrow selectivity.

mod errors;
mod explain;
mod plan;
mod planner;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::{ExplainOperator, ExplainPlan};
pub use plan::{
    AggregateOperator, FilterOperator, JoinOperator, OperatorKind, PlanOperator, QueryPlan,
    ScanStrategy,
};
pub use planner::QueryPlanner;
