//! Cost model: converts GB volumes into time, carbon and price

mod model;

pub use model::{bytes_to_gb, CostBreakdown, CostModel, CostRates, BYTES_PER_GB};
