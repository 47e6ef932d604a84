//! Workload query definition

use serde::{Deserialize, Serialize};

/// One query of the workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub id: String,
    /// Query text in the supported SQL subset
    pub sql: String,
    /// Relative execution frequency used to weight costs
    #[serde(default = "default_frequency")]
    pub frequency: f64,
}

fn default_frequency() -> f64 {
    1.0
}

impl QuerySpec {
    /// Query with frequency 1
    pub fn new(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sql: sql.into(),
            frequency: default_frequency(),
        }
    }

    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }
}
