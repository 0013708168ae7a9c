//! Monte Carlo cost projection
//!
//! Each run draws `iterations` one-year cost outcomes around the current
//! cost, spikes every Nth outcome as a bad year, and stacks the discount
//! programs on every outcome. Alongside the sample statistics it computes
//! deterministic what-if savings for past years, a next-year point
//! projection and a narrative summary.

mod bad_year;
mod discount;
mod engine;
mod narrative;
mod projection;
mod result;
pub mod rng;
mod stats;
mod volatility;

pub use bad_year::{BadYearSettings, BadYearStats, BadYearTracker};
pub use discount::{DiscountLayer, DiscountStack, Program, ProgramToggles, TierCosts};
pub use engine::{
    SampleSet, SimulationEngine, DEFAULT_ITERATIONS, MAX_COST, MAX_ITERATIONS, MAX_RATE,
};
pub use narrative::{format_currency, synthesize, NarrativeInputs};
pub use projection::{
    back_project, project_forward, total_savings, ForwardProjection, HistoricalYear,
};
pub use result::SimulationResult;
pub use rng::{entropy_source, seeded_source, SequenceSource, UniformSource};
pub use stats::ScenarioStats;
pub use volatility::{estimate_volatility, population_std_dev, DEFAULT_VOLATILITY};
