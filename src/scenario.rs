//! Scenario runner for repeated and batch simulations
//!
//! Loads the constants once, then runs as many simulations as the caller
//! needs without re-reading the constants table.

use rayon::prelude::*;

use crate::assumptions::DoctrineConstants;
use crate::inputs::SimulationInputs;
use crate::simulation::{entropy_source, seeded_source, SimulationEngine, SimulationResult};

/// Pre-loaded scenario runner
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// // Compare toggle combinations for one prospect
/// for use_map in [false, true] {
///     let inputs = SimulationInputs { use_map, ..base.clone() };
///     let result = runner.run_seeded(&inputs, 42);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    engine: SimulationEngine,
}

impl ScenarioRunner {
    /// Create runner with the doctrine constants
    pub fn new() -> Self {
        Self::with_constants(DoctrineConstants::doctrine())
    }

    /// Create runner by loading constants from the default CSV
    pub fn from_csv() -> crate::Result<Self> {
        Ok(Self::with_constants(DoctrineConstants::from_csv()?))
    }

    /// Create runner from a specific constants CSV
    pub fn from_csv_path(path: &std::path::Path) -> crate::Result<Self> {
        Ok(Self::with_constants(DoctrineConstants::from_csv_path(path)?))
    }

    pub fn with_constants(constants: DoctrineConstants) -> Self {
        Self {
            engine: SimulationEngine::new(constants),
        }
    }

    /// Run with fresh entropy; results differ between calls
    pub fn run(&self, inputs: &SimulationInputs) -> SimulationResult {
        self.engine.run(inputs, &mut entropy_source())
    }

    /// Run reproducibly from `seed`
    pub fn run_seeded(&self, inputs: &SimulationInputs, seed: u64) -> SimulationResult {
        self.engine.run(inputs, &mut seeded_source(seed))
    }

    /// Run many independent simulations in parallel
    ///
    /// Item `i` is seeded with `base_seed + i`, so a batch is reproducible
    /// and independent of thread scheduling.
    pub fn run_batch(&self, inputs: &[SimulationInputs], base_seed: u64) -> Vec<SimulationResult> {
        inputs
            .par_iter()
            .enumerate()
            .map(|(i, item)| self.run_seeded(item, base_seed.wrapping_add(i as u64)))
            .collect()
    }

    pub fn constants(&self) -> &DoctrineConstants {
        self.engine.constants()
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
