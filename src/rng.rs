//! Shared random source threaded through every stochastic operation.
//!
//! A single [`RandomSource`] is owned by the engine and lent to populations,
//! genomes and allele sets by `&mut`. For a fixed seed a run is reproducible
//! as long as each operation keeps its documented draw order.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::prelude::*;
use rand_distr::Binomial;

use crate::error::{GaError, Result};

/// Seedable random number generator wrapper.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Uniform integer in the inclusive range `[lo, hi]`.
    ///
    /// Returns `lo` without drawing when the range is empty or a single value.
    pub fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform `usize` in the inclusive range `[lo, hi]`. Degenerate ranges
    /// return `lo` without drawing, as in [`Self::uniform_int`].
    pub fn uniform_usize(&mut self, lo: usize, hi: usize) -> usize {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn uniform_index(&mut self, len: usize) -> usize {
        self.uniform_usize(0, len.saturating_sub(1))
    }

    /// Uniform real in `[lo, hi)`, or `lo` without drawing if `hi <= lo`.
    pub fn uniform_real(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Bernoulli trial: one uniform draw in `[0, 1)` compared against `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.r#gen::<f64>() < p
    }

    /// Number of successes in `trials` Bernoulli trials with probability `p`.
    pub fn binomial(&mut self, trials: u64, p: f64) -> Result<u64> {
        let dist = Binomial::new(trials, p)
            .map_err(|e| GaError::Configuration(format!("invalid binomial parameters: {e}")))?;
        Ok(dist.sample(&mut self.rng))
    }

    /// Build a discrete distribution over `0..weights.len()`.
    pub fn discrete(&self, weights: &[f64]) -> Result<DiscreteSampler> {
        DiscreteSampler::new(weights)
    }

    /// Draw one index from a discrete distribution.
    pub fn sample(&mut self, sampler: &DiscreteSampler) -> usize {
        sampler.index.sample(&mut self.rng)
    }

    /// Generate next u64 for seeding child sources.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// Split off an independent source, e.g. one per parallel task.
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_seed())
    }
}

/// Discrete distribution over indices, proportional to non-negative weights.
#[derive(Debug, Clone)]
pub struct DiscreteSampler {
    index: WeightedIndex<f64>,
    len: usize,
}

impl DiscreteSampler {
    /// Build a sampler from non-negative weights.
    ///
    /// When every weight is zero the sampler falls back to a uniform
    /// distribution over all indices.
    pub fn new(weights: &[f64]) -> Result<Self> {
        let index = match WeightedIndex::new(weights) {
            Ok(index) => index,
            Err(WeightedError::AllWeightsZero) => {
                log::warn!(
                    "all {} selection weights are zero, sampling uniformly",
                    weights.len()
                );
                WeightedIndex::new(vec![1.0; weights.len()])
                    .map_err(|e| GaError::Configuration(format!("invalid weights: {e}")))?
            }
            Err(e) => return Err(GaError::Configuration(format!("invalid weights: {e}"))),
        };
        Ok(Self {
            index,
            len: weights.len(),
        })
    }

    /// Number of indices the sampler draws from.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sampler covers no indices (never true for a built sampler).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
