//! Variable-length list genome.

use std::sync::Arc;

use crate::error::Result;
use crate::rng::RandomSource;
use crate::schema::ListGenomeConfig;

use super::{AlleleSet, Fitness, Genome};

/// Variable-length genome whose alleles all come from one allele set.
#[derive(Debug)]
pub struct ListGenome<S: AlleleSet> {
    alleles: Vec<S::Value>,
    min_len: usize,
    max_len: usize,
    allele_set: Arc<S>,
    fitness: Fitness,
}

/// Mutation action applied at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Replace,
    Delete,
    Insert,
}

impl Edit {
    fn draw(rng: &mut RandomSource) -> Self {
        match rng.uniform_int(1, 3) {
            1 => Self::Replace,
            2 => Self::Delete,
            _ => Self::Insert,
        }
    }
}

impl<S: AlleleSet> Clone for ListGenome<S> {
    fn clone(&self) -> Self {
        Self {
            alleles: self.alleles.clone(),
            min_len: self.min_len,
            max_len: self.max_len,
            allele_set: Arc::clone(&self.allele_set),
            fitness: self.fitness.clone(),
        }
    }
}

impl<S: AlleleSet> ListGenome<S> {
    /// Create an empty, unevaluated template. Call `initialize` to draw alleles.
    pub fn from_config(config: &ListGenomeConfig, allele_set: Arc<S>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            alleles: Vec::new(),
            min_len: config.min_len,
            max_len: config.max_len,
            allele_set,
            fitness: Fitness::new(config.minimize, config.mutation_rate, config.num_children)?,
        })
    }

    /// Alleles in position order.
    pub fn alleles(&self) -> &[S::Value] {
        &self.alleles
    }

    /// Replace the alleles; the genome becomes unevaluated.
    pub fn set_alleles(&mut self, alleles: Vec<S::Value>) {
        self.alleles = alleles;
        self.fitness.invalidate();
    }

    /// Length bounds used by `initialize`.
    pub fn length_bounds(&self) -> (usize, usize) {
        (self.min_len, self.max_len)
    }

    /// Shared allele domain.
    pub fn allele_set(&self) -> &S {
        &self.allele_set
    }

    /// Build one child from `self[0..cut_mom]` followed by
    /// `dad[cut_dad..]`. Cuts are clamped to the parents' lengths.
    ///
    /// The child keeps this genome's parameters and is unevaluated.
    pub fn splice(&self, dad: &Self, cut_mom: usize, cut_dad: usize) -> Self {
        let cut_mom = cut_mom.min(self.alleles.len());
        let cut_dad = cut_dad.min(dad.alleles.len());

        let mut alleles = Vec::with_capacity(cut_mom + dad.alleles.len() - cut_dad);
        alleles.extend_from_slice(&self.alleles[..cut_mom]);
        alleles.extend_from_slice(&dad.alleles[cut_dad..]);

        let mut fitness = self.fitness.clone();
        fitness.invalidate();

        Self {
            alleles,
            min_len: self.min_len,
            max_len: self.max_len,
            allele_set: Arc::clone(&self.allele_set),
            fitness,
        }
    }
}

impl<S: AlleleSet> Genome for ListGenome<S> {
    fn fitness(&self) -> &Fitness {
        &self.fitness
    }

    fn fitness_mut(&mut self) -> &mut Fitness {
        &mut self.fitness
    }

    fn initialize(&mut self, rng: &mut RandomSource) {
        let len = rng.uniform_usize(self.min_len, self.max_len);
        self.alleles = (0..len)
            .map(|_| self.allele_set.random_value(rng))
            .collect();
        self.fitness.invalidate();
    }

    /// Visits each original position exactly once, in order. A mutated
    /// position is replaced, deleted, or preceded by a fresh allele with
    /// equal probability; inserted alleles are never revisited.
    fn mutate(&mut self, rng: &mut RandomSource) {
        let rate = self.fitness.mutation_rate();
        let original = std::mem::take(&mut self.alleles);
        let mut mutated = Vec::with_capacity(original.len() + 1);
        let mut changed = false;

        for allele in original {
            if !rng.chance(rate) {
                mutated.push(allele);
                continue;
            }
            changed = true;
            match Edit::draw(rng) {
                Edit::Replace => mutated.push(self.allele_set.random_value(rng)),
                Edit::Delete => {}
                Edit::Insert => {
                    mutated.push(self.allele_set.random_value(rng));
                    mutated.push(allele);
                }
            }
        }

        self.alleles = mutated;
        if changed {
            self.fitness.invalidate();
        }
    }

    /// Single-point crossover with independent cut points per parent.
    fn cross_with(&self, dad: &Self, rng: &mut RandomSource) -> Vec<Self> {
        (0..self.fitness.num_children())
            .map(|_| {
                let cut_mom = rng.uniform_usize(0, self.alleles.len());
                let cut_dad = rng.uniform_usize(0, dad.alleles.len());
                self.splice(dad, cut_mom, cut_dad)
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.alleles.len()
    }

    fn describe(&self) -> String {
        self.alleles
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
