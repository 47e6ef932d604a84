//! Markdown leaderboard of design totals

use serde::{Deserialize, Serialize};

use crate::workload::DesignTotals;

/// Weights of the combined score column
///
/// The score is informational; ranking is by (price, carbon, time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardWeights {
    #[serde(default = "default_weight")]
    pub time_weight: f64,
    #[serde(default = "default_weight")]
    pub carbon_weight: f64,
    #[serde(default = "default_weight")]
    pub price_weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for LeaderboardWeights {
    fn default() -> Self {
        Self {
            time_weight: default_weight(),
            carbon_weight: default_weight(),
            price_weight: default_weight(),
        }
    }
}

impl LeaderboardWeights {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("time_weight", self.time_weight),
            ("carbon_weight", self.carbon_weight),
            ("price_weight", self.price_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a finite value >= 0, got {}", name, value));
            }
        }
        Ok(())
    }

    pub fn score(&self, totals: &DesignTotals) -> f64 {
        totals.time * self.time_weight
            + totals.carbon * self.carbon_weight
            + totals.price * self.price_weight
    }
}

/// Renders ranked totals (best first) as a Markdown table followed by the weights
pub fn leaderboard_markdown(ranked: &[DesignTotals], weights: &LeaderboardWeights) -> String {
    let mut lines = vec![
        "# Denormalization Leaderboard".to_string(),
        String::new(),
        "| Rank | Denorm | Time | Carbon | Price | Weighted |".to_string(),
        "| --- | --- | ---: | ---: | ---: | ---: |".to_string(),
    ];
    for (rank, totals) in ranked.iter().enumerate() {
        lines.push(format!(
            "| {} | {} | {:.6} | {:.6} | {:.6} | {:.6} |",
            rank + 1,
            totals.design_id,
            totals.time,
            totals.carbon,
            totals.price,
            weights.score(totals)
        ));
    }
    lines.push(String::new());
    lines.push("Weights:".to_string());
    lines.push(format!("- time: {}", weights.time_weight));
    lines.push(format!("- carbon: {}", weights.carbon_weight));
    lines.push(format!("- price: {}", weights.price_weight));
    lines.join("\n")
}
