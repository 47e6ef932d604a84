//! Run configuration
//!
//! Optional JSON file passed with `--config`. Every field has a default, so an
//! empty object is a valid configuration.
//!
//! ```json
//! { "cost": { "time_per_gb": 1.0, "carbon_per_gb": 0.5, "price_per_gb": 0.1,
//!             "network_multiplier": 5.0 },
//!   "leaderboard": { "time_weight": 1.0, "carbon_weight": 1.0, "price_weight": 1.0 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};
use crate::cost::CostRates;
use crate::report::LeaderboardWeights;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub cost: CostRates,
    #[serde(default)]
    pub leaderboard: LeaderboardWeights,
}

impl RunConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: RunConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Loads `path` if given, else the defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> CliResult<()> {
        self.cost
            .validate()
            .map_err(|e| CliError::config_error(format!("Invalid cost rates: {}", e)))?;
        self.leaderboard
            .validate()
            .map_err(|e| CliError::config_error(format!("Invalid leaderboard weights: {}", e)))?;
        Ok(())
    }
}
