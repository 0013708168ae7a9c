//! Monte Carlo cost projection engine

use super::bad_year::BadYearTracker;
use super::discount::DiscountStack;
use super::narrative::{self, NarrativeInputs};
use super::projection::{back_project, project_forward, total_savings};
use super::result::SimulationResult;
use super::rng::UniformSource;
use super::stats::ScenarioStats;
use super::volatility::estimate_volatility;
use crate::assumptions::DoctrineConstants;
use crate::inputs::{ParsedInputs, SimulationInputs};

/// Iterations used when none (or a non-positive count) is supplied
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Upper bound on iterations accepted from callers
pub const MAX_ITERATIONS: usize = 100_000;

/// Upper bound on any input cost
pub const MAX_COST: f64 = 1.0e12;

/// Upper bound on the magnitude of any rate input, as a fraction
///
/// Together with [`MAX_COST`] this keeps every sample finite, so results
/// always serialize to JSON numbers.
pub const MAX_RATE: f64 = 100.0;

/// Raw per-iteration samples, one column per scenario tier
///
/// Every column has one entry per iteration regardless of toggles.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    pub baseline: Vec<f64>,
    pub self_insured: Vec<f64>,
    pub reference_based: Vec<f64>,
    pub map_drug: Vec<f64>,
}

impl SampleSet {
    fn with_capacity(n: usize) -> Self {
        Self {
            baseline: Vec::with_capacity(n),
            self_insured: Vec::with_capacity(n),
            reference_based: Vec::with_capacity(n),
            map_drug: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }
}

/// Main simulation engine
///
/// Stateless apart from its constants; every run is a pure function of the
/// inputs and the random source.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    constants: DoctrineConstants,
}

impl SimulationEngine {
    pub fn new(constants: DoctrineConstants) -> Self {
        Self { constants }
    }

    pub fn constants(&self) -> &DoctrineConstants {
        &self.constants
    }

    /// Coerce raw inputs and run the full simulation
    pub fn run<S: UniformSource + ?Sized>(
        &self,
        inputs: &SimulationInputs,
        source: &mut S,
    ) -> SimulationResult {
        self.run_parsed(&inputs.parse(), source)
    }

    /// Run the full simulation on already-coerced inputs
    pub fn run_parsed<S: UniformSource + ?Sized>(
        &self,
        inputs: &ParsedInputs,
        source: &mut S,
    ) -> SimulationResult {
        let stack = DiscountStack::new(&self.constants, inputs.toggles);
        let volatility = estimate_volatility(&inputs.renewals, inputs.volatility_override);

        log::debug!(
            "simulating {} iterations: cost={:.2} volatility={:.5} bad_year=1/{}",
            inputs.iterations,
            inputs.current_cost,
            volatility,
            inputs.bad_year.frequency
        );

        let (samples, tracker) = self.sample_with(inputs, &stack, volatility, source);

        let historical = back_project(&inputs.historical_costs, &stack);
        let total_historical_savings = total_savings(&historical);
        let projection = project_forward(inputs.current_cost, &inputs.renewals, &stack);
        let bad_year_stats = tracker.finish(inputs.bad_year.frequency);

        let narrative = narrative::synthesize(&NarrativeInputs {
            stack: &stack,
            historical_years: historical.len(),
            total_historical_savings,
            projection: &projection,
            bad_years: &bad_year_stats,
            bad_year_settings: &inputs.bad_year,
            iterations: samples.len(),
        });

        SimulationResult {
            baseline: ScenarioStats::from_samples(&samples.baseline),
            self_insured: ScenarioStats::from_samples(&samples.self_insured),
            reference_based: ScenarioStats::from_samples(&samples.reference_based),
            map_drug: ScenarioStats::from_samples(&samples.map_drug),
            historical,
            total_historical_savings_if_in_place: total_historical_savings,
            projection,
            bad_year_stats,
            narrative,
            volatility,
            iterations: samples.len(),
        }
    }

    /// Draw the raw samples only
    pub fn sample<S: UniformSource + ?Sized>(
        &self,
        inputs: &ParsedInputs,
        source: &mut S,
    ) -> SampleSet {
        let stack = DiscountStack::new(&self.constants, inputs.toggles);
        let volatility = estimate_volatility(&inputs.renewals, inputs.volatility_override);
        self.sample_with(inputs, &stack, volatility, source).0
    }

    fn sample_with<S: UniformSource + ?Sized>(
        &self,
        inputs: &ParsedInputs,
        stack: &DiscountStack,
        volatility: f64,
        source: &mut S,
    ) -> (SampleSet, BadYearTracker) {
        let n = inputs.iterations;
        let settings = &inputs.bad_year;

        let mut samples = SampleSet::with_capacity(n);
        let mut tracker = BadYearTracker::with_capacity(n / settings.frequency.max(1) + 1);

        for i in 0..n {
            let multiplier = 1.0 + (source.next_uniform() - 0.5) * 2.0 * volatility;
            let mut cost = inputs.current_cost * multiplier;

            if settings.is_bad_year(i) {
                let spike = settings.spike(source.next_uniform());
                let normal_cost = cost;
                cost *= 1.0 + spike;
                tracker.record(i, spike, cost - normal_cost);
            }

            samples.baseline.push(cost);

            let tiers = stack.apply(cost);
            samples.self_insured.push(tiers.self_insured);
            samples.reference_based.push(tiers.reference_based);
            samples.map_drug.push(tiers.map_drug);
        }

        (samples, tracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::rng::{seeded_source, SequenceSource};
    use crate::simulation::ProgramToggles;
    use approx::assert_relative_eq;

    fn scenario_inputs() -> SimulationInputs {
        SimulationInputs {
            renewal1: Some(5.0.into()),
            renewal2: Some(7.0.into()),
            renewal3: Some(6.0.into()),
            current_cost: Some(100_000.0.into()),
            iterations: Some(1000.0.into()),
            use_self_insured: true,
            use_reference_based: true,
            use_map: true,
            bad_year_frequency: Some(5.0.into()),
            bad_year_increase_min: Some(30.0.into()),
            bad_year_increase_max: Some(40.0.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let engine = SimulationEngine::default();
        let result = engine.run(&scenario_inputs(), &mut seeded_source(7));

        assert_eq!(result.iterations, 1000);
        assert!((result.volatility - 0.008164966).abs() < 1e-8);
        assert_eq!(result.bad_year_stats.count, 200);

        // One in five iterations spiked by ~35% on average
        let expected_baseline = 100_000.0 * (1.0 + 0.2 * 0.35);
        assert_relative_eq!(result.baseline.mean, expected_baseline, max_relative = 0.01);

        let base = result.baseline.mean;
        let si = result.self_insured.mean;
        let rbp = result.reference_based.mean;
        assert_relative_eq!(si, base * 0.75, max_relative = 1e-9);
        assert_relative_eq!(rbp, si * 0.85, max_relative = 1e-9);
        assert_relative_eq!(result.map_drug.mean, rbp * 0.64, max_relative = 1e-9);
    }

    #[test]
    fn test_monotonic_discount_ordering() {
        let engine = SimulationEngine::default();
        for seed in [1, 2, 3, 99] {
            let r = engine.run(&scenario_inputs(), &mut seeded_source(seed));
            assert!(r.map_drug.mean <= r.reference_based.mean);
            assert!(r.reference_based.mean <= r.self_insured.mean);
            assert!(r.self_insured.mean <= r.baseline.mean);
        }
    }

    #[test]
    fn test_percentile_ordering() {
        let mut inputs = scenario_inputs();
        inputs.volatility_override = Some(0.2.into());
        let r = SimulationEngine::default().run(&inputs, &mut seeded_source(11));

        for (name, s) in r.scenarios() {
            assert!(s.p5 <= s.mean && s.mean <= s.p95, "{name}: {s:?}");
        }
    }

    #[test]
    fn test_toggle_off_passthrough() {
        let mut inputs = scenario_inputs();
        inputs.use_self_insured = false;
        inputs.use_reference_based = false;
        inputs.use_map = false;

        let samples = SimulationEngine::default().sample(&inputs.parse(), &mut seeded_source(5));

        assert_eq!(samples.len(), 1000);
        assert_eq!(samples.self_insured, samples.baseline);
        assert_eq!(samples.reference_based, samples.baseline);
        assert_eq!(samples.map_drug, samples.baseline);
    }

    #[test]
    fn test_partial_toggles_keep_column_lengths() {
        let mut inputs = scenario_inputs();
        inputs.use_reference_based = false;

        let samples = SimulationEngine::default().sample(&inputs.parse(), &mut seeded_source(5));
        assert_eq!(samples.self_insured.len(), samples.len());
        assert_eq!(samples.reference_based, samples.self_insured);
        assert_eq!(samples.map_drug.len(), samples.len());
    }

    #[test]
    fn test_bad_year_count_independent_of_seed() {
        let engine = SimulationEngine::default();
        for seed in 0..5 {
            let r = engine.run(&scenario_inputs(), &mut seeded_source(seed));
            assert_eq!(r.bad_year_stats.count, 200);
            assert_eq!(r.bad_year_stats.iterations[..3], [0usize, 5, 10]);
        }
    }

    #[test]
    fn test_deterministic_with_scripted_source() {
        // Midpoint draws: no volatility effect, spike exactly 35%
        let inputs = SimulationInputs {
            current_cost: Some(1000.0.into()),
            iterations: Some(2.0.into()),
            bad_year_frequency: Some(2.0.into()),
            use_self_insured: true,
            ..Default::default()
        };
        let result = SimulationEngine::default().run(&inputs, &mut SequenceSource::constant(0.5));

        // Iteration 0 spiked to 1350, iteration 1 stays 1000
        assert_relative_eq!(result.baseline.mean, 1175.0, max_relative = 1e-12);
        assert_eq!(result.baseline.p5, 1000.0);
        assert_relative_eq!(result.baseline.p95, 1350.0, max_relative = 1e-12);
        assert_relative_eq!(result.bad_year_stats.avg_spike_pct, 35.0, max_relative = 1e-12);
        assert_relative_eq!(result.bad_year_stats.total_extra_cost, 350.0, max_relative = 1e-12);
        assert_relative_eq!(result.self_insured.mean, 1175.0 * 0.75, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_iterations_fall_back_to_default() {
        let mut inputs = scenario_inputs();
        inputs.iterations = Some(0.0.into());
        let r = SimulationEngine::default().run(&inputs, &mut seeded_source(3));
        assert_eq!(r.iterations, DEFAULT_ITERATIONS);

        inputs.iterations = Some((-10.0).into());
        let r = SimulationEngine::default().run(&inputs, &mut seeded_source(3));
        assert_eq!(r.iterations, DEFAULT_ITERATIONS);
    }

    #[test]
    fn test_single_iteration_and_zero_cost() {
        let inputs = SimulationInputs {
            iterations: Some(1.0.into()),
            ..Default::default()
        };
        let r = SimulationEngine::default().run(&inputs, &mut seeded_source(3));

        assert_eq!(r.iterations, 1);
        assert_eq!(r.baseline.mean, 0.0);
        assert_eq!(r.bad_year_stats.count, 1);
        assert_eq!(r.bad_year_stats.avg_extra_per_bad_year, 0.0);
        assert!(r.narrative.contains("Applied programs: None."));
    }

    #[test]
    fn test_historical_savings_non_negative() {
        let mut inputs = scenario_inputs();
        inputs.use_reference_based = false;
        inputs.use_map = false;
        inputs.historical_cost1 = Some(94_000.0.into());
        inputs.historical_cost2 = Some("88000".into());

        let r = SimulationEngine::default().run(&inputs, &mut seeded_source(3));
        assert_eq!(r.historical.len(), 2);
        assert!(r.total_historical_savings_if_in_place >= 0.0);
        assert_relative_eq!(
            r.total_historical_savings_if_in_place,
            0.25 * 182_000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_projection_decoupled_from_samples() {
        let r = SimulationEngine::default().run(&scenario_inputs(), &mut seeded_source(8));
        assert_relative_eq!(r.projection.baseline, 106_000.0, max_relative = 1e-12);
        assert_eq!(
            r.projection,
            crate::simulation::project_forward(
                100_000.0,
                &[0.05, 0.07, 0.06],
                &DiscountStack::doctrine(ProgramToggles::all())
            )
        );
    }

    #[test]
    fn test_result_round_trips_through_json() {
        let r = SimulationEngine::default().run(&scenario_inputs(), &mut seeded_source(4));
        let json = serde_json::to_string(&r).unwrap();
        let back: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bad_year_stats.iterations, r.bad_year_stats.iterations);
        assert_eq!(back.historical.len(), r.historical.len());
        assert_eq!(back.narrative, r.narrative);
        assert_relative_eq!(back.map_drug.p95, r.map_drug.p95, max_relative = 1e-12);
    }
}
