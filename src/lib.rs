//! Cost Projection - Monte Carlo engine for comparing insurance cost programs
//!
//! This library provides:
//! - Form-input coercion (numbers or strings, parse-or-zero)
//! - Volatility estimation from renewal history
//! - Monte Carlo sampling with bad-year injection and stacked discount programs
//! - Historical what-if savings and a next-year point projection
//! - Narrative report synthesis
//! - Configurable doctrine constants, result persistence and batch runs

pub mod assumptions;
pub mod error;
pub mod inputs;
pub mod scenario;
pub mod simulation;
pub mod store;

// Re-export commonly used types
pub use assumptions::DoctrineConstants;
pub use error::{Error, Result};
pub use inputs::{HistoryPolicy, NumericField, SimulationInputs};
pub use scenario::ScenarioRunner;
pub use simulation::{
    ProgramToggles, ScenarioStats, SimulationEngine, SimulationResult, UniformSource,
};
pub use store::{JsonFileStore, MemoryStore, ResultStore};
