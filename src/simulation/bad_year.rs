//! Catastrophic-claim ("bad year") injection and aggregation

use serde::{Deserialize, Serialize};

/// When bad years happen and how hard they hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadYearSettings {
    /// Every `frequency`-th iteration (starting at 0) is a bad year
    pub frequency: usize,
    /// Lower spike bound as a fraction (0.30 = +30%)
    pub increase_min: f64,
    /// Upper spike bound as a fraction
    pub increase_max: f64,
}

impl Default for BadYearSettings {
    fn default() -> Self {
        Self {
            frequency: 5,
            increase_min: 0.30,
            increase_max: 0.40,
        }
    }
}

impl BadYearSettings {
    pub fn is_bad_year(&self, iteration: usize) -> bool {
        self.frequency > 0 && iteration % self.frequency == 0
    }

    /// Spike fraction for a uniform draw `u` in [0, 1)
    pub fn spike(&self, u: f64) -> f64 {
        self.increase_min + u * (self.increase_max - self.increase_min)
    }
}

/// Collects bad-year events during sampling
#[derive(Debug, Clone, Default)]
pub struct BadYearTracker {
    iterations: Vec<usize>,
    spike_pcts: Vec<f64>,
    extra_costs: Vec<f64>,
}

impl BadYearTracker {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            iterations: Vec::with_capacity(capacity),
            spike_pcts: Vec::with_capacity(capacity),
            extra_costs: Vec::with_capacity(capacity),
        }
    }

    /// Record one spiked iteration; `spike` is a fraction
    pub fn record(&mut self, iteration: usize, spike: f64, extra_cost: f64) {
        self.iterations.push(iteration);
        self.spike_pcts.push(spike * 100.0);
        self.extra_costs.push(extra_cost);
    }

    pub fn count(&self) -> usize {
        self.iterations.len()
    }

    pub fn finish(self, frequency: usize) -> BadYearStats {
        let count = self.iterations.len();
        let total_extra_cost: f64 = self.extra_costs.iter().sum();
        let (avg_spike_pct, avg_extra_per_bad_year) = if count > 0 {
            (
                self.spike_pcts.iter().sum::<f64>() / count as f64,
                total_extra_cost / count as f64,
            )
        } else {
            (0.0, 0.0)
        };

        BadYearStats {
            count,
            frequency,
            avg_spike_pct,
            total_extra_cost,
            avg_extra_per_bad_year,
            iterations: self.iterations,
        }
    }
}

/// Aggregated bad-year impact across a simulation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BadYearStats {
    pub count: usize,
    pub frequency: usize,
    /// Mean spike in percent (35.0 = +35%)
    pub avg_spike_pct: f64,
    pub total_extra_cost: f64,
    pub avg_extra_per_bad_year: f64,
    /// Indices of the spiked iterations
    pub iterations: Vec<usize>,
}

impl BadYearStats {
    /// Chance of at least one bad year over three years: 1 - (1 - 1/N)^3
    pub fn three_year_probability(&self) -> f64 {
        if self.frequency == 0 {
            return 0.0;
        }
        1.0 - (1.0 - 1.0 / self.frequency as f64).powi(3)
    }

    /// Share of `total_iterations` that were bad years, as a fraction
    pub fn share_of(&self, total_iterations: usize) -> f64 {
        if total_iterations == 0 {
            return 0.0;
        }
        self.count as f64 / total_iterations as f64
    }
}
