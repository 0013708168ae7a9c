//! Uniform random sources for the sampler

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Anything that yields uniform floats in [0, 1)
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Entropy-seeded generator; results differ on every call
pub fn entropy_source() -> StdRng {
    StdRng::from_entropy()
}

/// Deterministic generator for reproducible runs
pub fn seeded_source(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Replays a fixed sequence of uniforms, cycling when exhausted
///
/// An empty sequence yields 0.5, the midpoint of every draw.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    /// Every draw returns `value`
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }
}
