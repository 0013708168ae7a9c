//! Summary statistics over a simulated sample

use serde::{Deserialize, Serialize};

use super::volatility::mean;

/// Mean and nearest-rank 5th/95th percentiles
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioStats {
    pub mean: f64,
    pub p5: f64,
    pub p95: f64,
}

impl ScenarioStats {
    /// Summarize a sample; an empty sample gives all zeros
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            mean: mean(&sorted),
            p5: nearest_rank(&sorted, 0.05),
            p95: nearest_rank(&sorted, 0.95),
        }
    }

    /// Width of the P5..P95 band
    pub fn spread(&self) -> f64 {
        self.p95 - self.p5
    }
}

/// Element at floor(n * q), clamped into range. Not interpolated.
fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    let idx = (sorted.len() as f64 * q).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_rank_percentiles() {
        let samples: Vec<f64> = (0..100).rev().map(|v| v as f64).collect();
        let stats = ScenarioStats::from_samples(&samples);

        assert_eq!(stats.p5, 5.0);
        assert_eq!(stats.p95, 95.0);
        assert!((stats.mean - 49.5).abs() < 1e-12);
    }

    #[test]
    fn test_small_samples_clamp() {
        let one = ScenarioStats::from_samples(&[42.0]);
        assert_eq!(one, ScenarioStats { mean: 42.0, p5: 42.0, p95: 42.0 });

        // floor(3 * 0.95) = 2, last element
        let three = ScenarioStats::from_samples(&[3.0, 1.0, 2.0]);
        assert_eq!(three.p5, 1.0);
        assert_eq!(three.p95, 3.0);
    }

    #[test]
    fn test_empty_sample_is_zero() {
        assert_eq!(ScenarioStats::from_samples(&[]), ScenarioStats::default());
    }
}
