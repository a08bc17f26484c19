//! Fixed-length array genome with one allele set per position.

use std::sync::Arc;

use crate::error::{GaError, Result};
use crate::rng::RandomSource;
use crate::schema::ArrayGenomeConfig;

use super::{AlleleSet, Fitness, Genome};

/// Fixed-length genome; position `i` always draws from allele set `i`.
#[derive(Debug)]
pub struct ArrayGenome<S: AlleleSet> {
    alleles: Vec<S::Value>,
    allele_sets: Arc<[S]>,
    crossover_points: usize,
    fitness: Fitness,
}

impl<S: AlleleSet> Clone for ArrayGenome<S> {
    fn clone(&self) -> Self {
        Self {
            alleles: self.alleles.clone(),
            allele_sets: Arc::clone(&self.allele_sets),
            crossover_points: self.crossover_points,
            fitness: self.fitness.clone(),
        }
    }
}

impl<S: AlleleSet> ArrayGenome<S> {
    /// Create a template and draw its initial alleles.
    pub fn from_config(
        config: &ArrayGenomeConfig,
        allele_sets: Vec<S>,
        rng: &mut RandomSource,
    ) -> Result<Self> {
        config.validate()?;
        if allele_sets.is_empty() {
            return Err(GaError::Configuration(
                "an array genome needs at least one allele set".into(),
            ));
        }
        let mut genome = Self {
            alleles: Vec::with_capacity(allele_sets.len()),
            allele_sets: allele_sets.into(),
            crossover_points: config.crossover_points,
            fitness: Fitness::new(config.minimize, config.mutation_rate, config.num_children)?,
        };
        genome.initialize(rng);
        Ok(genome)
    }

    /// Alleles in position order.
    pub fn alleles(&self) -> &[S::Value] {
        &self.alleles
    }

    /// Replace the alleles; the genome becomes unevaluated.
    ///
    /// The length must match the number of allele sets.
    pub fn set_alleles(&mut self, alleles: Vec<S::Value>) -> Result<()> {
        if alleles.len() != self.allele_sets.len() {
            return Err(GaError::Configuration(format!(
                "array genome expects {} alleles, got {}",
                self.allele_sets.len(),
                alleles.len()
            )));
        }
        self.alleles = alleles;
        self.fitness.invalidate();
        Ok(())
    }

    /// Cut points used per crossover.
    pub fn crossover_points(&self) -> usize {
        self.crossover_points
    }

    /// Draw distinct, sorted cut positions in `1..len`.
    fn draw_cuts(&self, rng: &mut RandomSource) -> Vec<usize> {
        let len = self.alleles.len();
        if len < 2 {
            return Vec::new();
        }
        let mut candidates: Vec<usize> = (1..len).collect();
        let k = self.crossover_points.min(candidates.len());
        // partial Fisher-Yates
        for i in 0..k {
            let j = rng.uniform_usize(i, candidates.len() - 1);
            candidates.swap(i, j);
        }
        candidates.truncate(k);
        candidates.sort_unstable();
        candidates
    }
}

impl<S: AlleleSet> Genome for ArrayGenome<S> {
    fn fitness(&self) -> &Fitness {
        &self.fitness
    }

    fn fitness_mut(&mut self) -> &mut Fitness {
        &mut self.fitness
    }

    fn initialize(&mut self, rng: &mut RandomSource) {
        self.alleles = self
            .allele_sets
            .iter()
            .map(|set| set.random_value(rng))
            .collect();
        self.fitness.invalidate();
    }

    fn mutate(&mut self, rng: &mut RandomSource) {
        let rate = self.fitness.mutation_rate();
        let mut changed = false;
        for (allele, set) in self.alleles.iter_mut().zip(self.allele_sets.iter()) {
            if rng.chance(rate) {
                *allele = set.random_value(rng);
                changed = true;
            }
        }
        if changed {
            self.fitness.invalidate();
        }
    }

    /// K-point crossover. Each child starts copying from `self` and switches
    /// parent at every cut.
    fn cross_with(&self, dad: &Self, rng: &mut RandomSource) -> Vec<Self> {
        (0..self.fitness.num_children())
            .map(|_| {
                let cuts = self.draw_cuts(rng);
                let mut from_mom = true;
                let mut next_cut = cuts.iter().peekable();
                let alleles = (0..self.alleles.len())
                    .map(|i| {
                        if next_cut.next_if(|&&cut| cut == i).is_some() {
                            from_mom = !from_mom;
                        }
                        match (from_mom, dad.alleles.get(i)) {
                            (false, Some(value)) => value.clone(),
                            _ => self.alleles[i].clone(),
                        }
                    })
                    .collect();

                let mut fitness = self.fitness.clone();
                fitness.invalidate();
                Self {
                    alleles,
                    allele_sets: Arc::clone(&self.allele_sets),
                    crossover_points: self.crossover_points,
                    fitness,
                }
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
