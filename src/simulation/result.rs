//! Simulation output record
//!
//! This is the exact payload handed to the result store.

use serde::{Deserialize, Serialize};

use super::bad_year::BadYearStats;
use super::projection::{ForwardProjection, HistoricalYear};
use super::stats::ScenarioStats;

/// Complete result of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Current fully-insured trajectory
    pub baseline: ScenarioStats,
    pub self_insured: ScenarioStats,
    pub reference_based: ScenarioStats,
    pub map_drug: ScenarioStats,

    /// What-if savings for each supplied historical year
    pub historical: Vec<HistoricalYear>,
    pub total_historical_savings_if_in_place: f64,

    /// Next-year point estimate (not sampled)
    pub projection: ForwardProjection,

    pub bad_year_stats: BadYearStats,

    pub narrative: String,

    /// Volatility the sampler used
    #[serde(default)]
    pub volatility: f64,
    /// Number of iterations actually run
    #[serde(default)]
    pub iterations: usize,
}

impl SimulationResult {
    /// Scenario blocks in stacking order, with display names
    pub fn scenarios(&self) -> [(&'static str, &ScenarioStats); 4] {
        [
            ("Baseline", &self.baseline),
            ("Self-Insured", &self.self_insured),
            ("Reference-Based", &self.reference_based),
            ("MAP Drug", &self.map_drug),
        ]
    }

    /// Mean saving of the full stack against the baseline
    pub fn expected_savings(&self) -> f64 {
        self.baseline.mean - self.map_drug.mean
    }
}
