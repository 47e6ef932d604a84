//! shardcost - query planning and cost estimation for denormalized, sharded
//! document database designs
//!
//! Inputs are collection schemas, statistics, candidate denormalization designs
//! and a SQL-like query workload. For every (design, query) pair the crate
//! builds a physical plan and estimates scanned and shuffled volume, then
//! converts it into time, carbon and price. Nothing is executed against a
//! real database.

pub mod cli;
pub mod config;
pub mod cost;
pub mod loader;
pub mod model;
pub mod observability;
pub mod parser;
pub mod planner;
pub mod report;
pub mod simulator;
pub mod workload;
