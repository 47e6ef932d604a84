//! Cost simulator subsystem
//!
//! Estimates scan, shuffle and output volumes of each plan operator and turns
//! them into costs through the [`CostModel`](crate::cost::CostModel). Nothing
//! is executed; all work is arithmetic over the design's statistics.

mod errors;
mod metrics;
mod simulator;

pub use errors::{Severity, SimulationError, SimulationErrorCode, SimulationResult};
pub use metrics::{OperatorMetrics, QueryResult};
pub use simulator::CostSimulator;
