//! Linear I/O cost model
//!
//! time   = GB x time_per_gb   x mult
//! carbon = GB x carbon_per_gb x mult
//! price  = GB x price_per_gb  x mult
//!
//! `mult` is the network multiplier for network-bound transfers, else 1.

use serde::{Deserialize, Serialize};

/// Bytes in one GB as used by every volume conversion
pub const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Converts a byte count to GB
pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Per-GB cost rates; the only source of cost constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    #[serde(default = "default_time_per_gb")]
    pub time_per_gb: f64,
    #[serde(default = "default_carbon_per_gb")]
    pub carbon_per_gb: f64,
    #[serde(default = "default_price_per_gb")]
    pub price_per_gb: f64,
    /// Applied to shuffles and other network transfers
    #[serde(default = "default_network_multiplier")]
    pub network_multiplier: f64,
}

fn default_time_per_gb() -> f64 {
    1.0
}
fn default_carbon_per_gb() -> f64 {
    0.5
}
fn default_price_per_gb() -> f64 {
    0.1
}
fn default_network_multiplier() -> f64 {
    5.0
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            time_per_gb: default_time_per_gb(),
            carbon_per_gb: default_carbon_per_gb(),
            price_per_gb: default_price_per_gb(),
            network_multiplier: default_network_multiplier(),
        }
    }
}

impl CostRates {
    /// Checks every rate is finite and non-negative and the multiplier is >= 1
    pub fn validate(&self) -> Result<(), String> {
        let rates = [
            ("time_per_gb", self.time_per_gb),
            ("carbon_per_gb", self.carbon_per_gb),
            ("price_per_gb", self.price_per_gb),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a finite value >= 0, got {}", name, value));
            }
        }
        if !self.network_multiplier.is_finite() || self.network_multiplier < 1.0 {
            return Err(format!(
                "network_multiplier must be a finite value >= 1, got {}",
                self.network_multiplier
            ));
        }
        Ok(())
    }
}

/// Cost of one unit of work (or a sum of them)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub label: String,
    pub data_scanned_gb: f64,
    pub time_cost: f64,
    pub carbon_cost: f64,
    pub price_cost: f64,
    pub notes: Vec<String>,
}

impl CostBreakdown {
    /// A zero cost
    pub fn zero(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data_scanned_gb: 0.0,
            time_cost: 0.0,
            carbon_cost: 0.0,
            price_cost: 0.0,
            notes: Vec::new(),
        }
    }

    /// Appends a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Stateless cost model over a fixed set of rates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostModel {
    rates: CostRates,
}

impl CostModel {
    pub fn new(rates: CostRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &CostRates {
        &self.rates
    }

    /// Cost of moving `data_gb` through I/O, optionally across the network
    pub fn io_cost(&self, label: impl Into<String>, data_gb: f64, network: bool) -> CostBreakdown {
        let multiplier = if network {
            self.rates.network_multiplier
        } else {
            1.0
        };
        let mut notes = Vec::new();
        if network {
            notes.push(format!("Network multiplier x{}", self.rates.network_multiplier));
        }
        CostBreakdown {
            label: label.into(),
            data_scanned_gb: data_gb,
            time_cost: data_gb * self.rates.time_per_gb * multiplier,
            carbon_cost: data_gb * self.rates.carbon_per_gb * multiplier,
            price_cost: data_gb * self.rates.price_per_gb * multiplier,
            notes,
        }
    }

    /// Elementwise sum of `parts`, notes concatenated in input order
    pub fn aggregate<'a>(
        &self,
        label: impl Into<String>,
        parts: impl IntoIterator<Item = &'a CostBreakdown>,
    ) -> CostBreakdown {
        parts
            .into_iter()
            .fold(CostBreakdown::zero(label), |mut acc, part| {
                acc.data_scanned_gb += part.data_scanned_gb;
                acc.time_cost += part.time_cost;
                acc.carbon_cost += part.carbon_cost;
                acc.price_cost += part.price_cost;
                acc.notes.extend(part.notes.iter().cloned());
                acc
            })
    }
}
