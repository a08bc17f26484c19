//! Genome representations and their genetic operators.
//!
//! A genome is one candidate solution: an ordered sequence of allele values
//! plus the fitness bookkeeping the population needs for scaling, selection
//! and sorting.
//!
//! # Representations
//!
//! - [`ListGenome`]: variable length, every position drawn from one allele set.
//!   Mutation replaces, deletes or inserts alleles; single-point crossover
//!   cuts each parent independently, so lengths drift across generations.
//! - [`ArrayGenome`]: fixed length, one allele set per position, k-point
//!   crossover that preserves positions.
//!
//! Any other representation plugs in by implementing [`Genome`].

mod allele;
mod array;
mod list;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GaError, Result, check_rate};
use crate::rng::RandomSource;

pub use allele::*;
pub use array::*;
pub use list::*;

/// Fitness bookkeeping carried by every genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    raw: f64,
    scaled: f64,
    temp: f64,
    rank: usize,
    minimize: bool,
    mutation_rate: f64,
    num_children: usize,
    evaluated: bool,
    #[serde(default)]
    offered: bool,
}

impl Fitness {
    /// Create an unevaluated record.
    pub fn new(minimize: bool, mutation_rate: f64, num_children: usize) -> Result<Self> {
        let mut fitness = Self {
            raw: 0.0,
            scaled: 0.0,
            temp: 0.0,
            rank: 0,
            minimize,
            mutation_rate: 0.0,
            num_children: 1,
            evaluated: false,
            offered: false,
        };
        fitness.set_mutation_rate(mutation_rate)?;
        fitness.set_num_children(num_children)?;
        Ok(fitness)
    }

    /// Raw fitness as assigned by the evaluator.
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// Selection weight derived from raw fitness by the population's scaling.
    pub fn scaled(&self) -> f64 {
        self.scaled
    }

    /// Working weight used by roulette wheel selection.
    pub fn temp(&self) -> f64 {
        self.temp
    }

    /// Rank in the population after the last sort, 1 = best.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether lower raw fitness is better.
    pub fn minimize(&self) -> bool {
        self.minimize
    }

    /// Per-position mutation probability.
    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Number of children produced by one crossover.
    pub fn num_children(&self) -> usize {
        self.num_children
    }

    /// Whether the raw fitness reflects the current alleles.
    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// Whether these alleles have already been offered to an elite archive.
    pub fn is_offered(&self) -> bool {
        self.offered
    }

    /// Record raw fitness from the evaluator and mark the genome evaluated.
    pub fn assign(&mut self, raw: f64) {
        self.raw = raw;
        self.evaluated = true;
    }

    /// Mark the raw fitness stale. The alleles count as new to the archive.
    pub fn invalidate(&mut self) {
        self.evaluated = false;
        self.offered = false;
    }

    /// Set the per-position mutation probability.
    pub fn set_mutation_rate(&mut self, rate: f64) -> Result<()> {
        self.mutation_rate = check_rate("mutation_rate", rate)?;
        Ok(())
    }

    /// Set the number of children per crossover. Must be positive.
    pub fn set_num_children(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(GaError::Configuration(
                "a crossover must produce at least one child".into(),
            ));
        }
        self.num_children = n;
        Ok(())
    }

    pub(crate) fn set_scaled(&mut self, scaled: f64) {
        self.scaled = scaled;
    }

    pub(crate) fn set_temp(&mut self, temp: f64) {
        self.temp = temp;
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    pub(crate) fn set_offered(&mut self, offered: bool) {
        self.offered = offered;
    }

    /// Fitness order: ascending raw fitness when minimizing, descending
    /// otherwise. `Less` means `self` is fitter. Signed zeros compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        // `-0.0 + 0.0` is `+0.0`
        let (a, b) = (self.raw + 0.0, other.raw + 0.0);
        if self.minimize {
            a.total_cmp(&b)
        } else {
            b.total_cmp(&a)
        }
    }
}

/// A candidate solution.
///
/// `Clone` must produce a fully independent deep copy: genomes are copied on
/// every reproduction event.
pub trait Genome: Clone + fmt::Debug + Send + Sync {
    /// Fitness bookkeeping.
    fn fitness(&self) -> &Fitness;

    /// Mutable fitness bookkeeping.
    fn fitness_mut(&mut self) -> &mut Fitness;

    /// Reset to a fresh random instance and clear the evaluated flag.
    fn initialize(&mut self, rng: &mut RandomSource);

    /// Stochastic in-place perturbation.
    fn mutate(&mut self, rng: &mut RandomSource);

    /// Recombine with `partner`, producing `num_children` independent,
    /// unevaluated children.
    fn cross_with(&self, partner: &Self, rng: &mut RandomSource) -> Vec<Self>;

    /// Number of allele values.
    fn len(&self) -> usize;

    /// Human-readable allele listing.
    fn describe(&self) -> String;

    /// Whether the genome holds no alleles.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fitness order between two genomes.
    fn compare(&self, other: &Self) -> Ordering {
        self.fitness().compare(other.fitness())
    }

    /// Strictly fitter than `other`.
    fn is_better_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Raw fitness shorthand.
    fn raw_fitness(&self) -> f64 {
        self.fitness().raw()
    }

    /// Evaluated flag shorthand.
    fn is_evaluated(&self) -> bool {
        self.fitness().is_evaluated()
    }
}
