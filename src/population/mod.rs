//! Populations: a pool of genomes evolved by generational replacement.
//!
//! One generation step scales, sorts and prepares selection over the
//! current genomes, then builds the next generation from three sources:
//!
//! 1. survivors, the best `(1 - replacement_rate)` fraction carried over;
//! 2. replacers, the first `archive_replacement_rate` fraction of the
//!    elite archive;
//! 3. bred children, filled in by selection, crossover and mutation.
//!
//! The target size is a hard cap on the next generation.

mod archive;
mod scaling;
mod selection;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use log::{debug, trace};

use crate::error::{GaError, Result, check_rate};
use crate::genome::Genome;
use crate::rng::RandomSource;
use crate::schema::{ArchivePolicy, PopulationConfig, ScalingMethod, SelectionMethod};

pub use selection::Selector;

/// A pool of genomes of one representation.
#[derive(Debug, Clone)]
pub struct Population<G: Genome> {
    genomes: Vec<G>,
    archive: Vec<G>,
    archive_size: usize,
    scaling: ScalingMethod,
    selector: Selector,
    archive_policy: ArchivePolicy,
    generation: usize,
    crossover_rate: f64,
    replacement_rate: f64,
    archive_replacement_rate: f64,
    best: Option<G>,
}

impl<G: Genome> Default for Population<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Genome> Population<G> {
    /// Empty population: roulette wheel selection, identity scaling, full
    /// replacement, no archive.
    pub fn new() -> Self {
        Self {
            genomes: Vec::new(),
            archive: Vec::new(),
            archive_size: 0,
            scaling: ScalingMethod::default(),
            selector: Selector::default(),
            archive_policy: ArchivePolicy::default(),
            generation: 1,
            crossover_rate: 1.0,
            replacement_rate: 1.0,
            archive_replacement_rate: 0.0,
            best: None,
        }
    }

    /// Build a population and fill it with `config.size` fresh copies of
    /// `template`.
    pub fn from_config(config: &PopulationConfig, template: &G, rng: &mut RandomSource) -> Result<Self> {
        config.validate()?;
        let mut population = Self {
            archive_size: config.archive_size,
            scaling: config.scaling,
            selector: Selector::from_method(config.selection)?,
            archive_policy: config.archive,
            ..Self::new()
        };
        population.set_crossover_rate(config.crossover_rate)?;
        population.set_replacement_rate(config.replacement_rate)?;
        population.set_archive_replacement_rate(config.archive_replacement_rate)?;
        population.initialize_with(template, config.size, rng);
        Ok(population)
    }

    /// Replace the genomes with `count` independent copies of `template`,
    /// each initialized with fresh random alleles. Clears the archive and
    /// the best-genome record.
    pub fn initialize_with(&mut self, template: &G, count: usize, rng: &mut RandomSource) {
        self.genomes = (0..count)
            .map(|_| {
                let mut genome = template.clone();
                genome.initialize(rng);
                genome
            })
            .collect();
        self.archive.clear();
        self.best = None;
        self.selector.reset();
    }

    // Parameters

    pub fn crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    /// Probability that a selected pair is recombined rather than copied.
    pub fn set_crossover_rate(&mut self, rate: f64) -> Result<()> {
        self.crossover_rate = check_rate("crossover_rate", rate)?;
        Ok(())
    }

    pub fn replacement_rate(&self) -> f64 {
        self.replacement_rate
    }

    /// Fraction of the population replaced each generation. Lowering it
    /// below the archive replacement rate lowers that rate too.
    pub fn set_replacement_rate(&mut self, rate: f64) -> Result<()> {
        self.replacement_rate = check_rate("replacement_rate", rate)?;
        self.archive_replacement_rate = self.archive_replacement_rate.min(self.replacement_rate);
        Ok(())
    }

    pub fn archive_replacement_rate(&self) -> f64 {
        self.archive_replacement_rate
    }

    /// Fraction of the next generation copied from the archive, clamped to
    /// the replacement rate.
    pub fn set_archive_replacement_rate(&mut self, rate: f64) -> Result<()> {
        let rate = check_rate("archive_replacement_rate", rate)?;
        self.archive_replacement_rate = rate.min(self.replacement_rate);
        Ok(())
    }

    pub fn archive_size(&self) -> usize {
        self.archive_size
    }

    /// Archive capacity. Shrinking drops the worst members.
    pub fn set_archive_size(&mut self, size: usize) {
        self.archive_size = size;
        self.archive.truncate(size);
    }

    pub fn scaling(&self) -> ScalingMethod {
        self.scaling
    }

    pub fn set_scaling(&mut self, scaling: ScalingMethod) {
        self.scaling = scaling;
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn set_selector(&mut self, selector: Selector) {
        self.selector = selector;
    }

    /// Replace the selector from a configuration value.
    pub fn set_selection(&mut self, method: SelectionMethod) -> Result<()> {
        self.selector = Selector::from_method(method)?;
        Ok(())
    }

    pub fn archive_policy(&self) -> ArchivePolicy {
        self.archive_policy
    }

    pub fn set_archive_policy(&mut self, policy: ArchivePolicy) {
        self.archive_policy = policy;
    }

    /// Generation counter, starting at 1.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    // Contents

    pub fn genomes(&self) -> &[G] {
        &self.genomes
    }

    pub fn genome(&self, index: usize) -> Option<&G> {
        self.genomes.get(index)
    }

    /// Replace the genomes wholesale.
    pub fn set_genomes(&mut self, genomes: Vec<G>) {
        self.genomes = genomes;
        self.selector.reset();
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Elite archive, best first.
    pub fn archive(&self) -> &[G] {
        &self.archive
    }

    /// Best evaluated genome seen since initialization.
    pub fn best(&self) -> Option<&G> {
        self.best.as_ref()
    }

    /// Raw fitness of every genome, in population order.
    pub fn raw_fitness_values(&self) -> Vec<f64> {
        self.genomes.iter().map(|g| g.raw_fitness()).collect()
    }

    /// Scaled fitness of every genome, in population order.
    pub fn scaled_fitness_values(&self) -> Vec<f64> {
        self.genomes.iter().map(|g| g.fitness().scaled()).collect()
    }

    // Evaluation

    /// Assign raw fitness to every genome from `f`.
    pub fn score_with<F>(&mut self, mut f: F)
    where
        F: FnMut(&G) -> f64,
    {
        for genome in &mut self.genomes {
            let raw = f(genome);
            genome.fitness_mut().assign(raw);
        }
    }

    /// Assign raw fitness to every genome from `f`, in parallel.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn score_with_par<F>(&mut self, f: F)
    where
        F: Fn(&G) -> f64 + Sync + Send,
    {
        self.genomes.par_iter_mut().for_each(|genome| {
            let raw = f(genome);
            genome.fitness_mut().assign(raw);
        });
    }

    /// Sequential fallback where threads are unavailable.
    #[cfg(target_arch = "wasm32")]
    pub fn score_with_par<F>(&mut self, f: F)
    where
        F: Fn(&G) -> f64 + Sync + Send,
    {
        self.score_with(f);
    }

    /// Assign raw fitness to one genome.
    pub fn record_fitness(&mut self, index: usize, raw: f64) -> Result<()> {
        let len = self.genomes.len();
        let genome = self.genomes.get_mut(index).ok_or_else(|| {
            GaError::Evaluation(format!("genome index {index} out of range for population of {len}"))
        })?;
        genome.fitness_mut().assign(raw);
        Ok(())
    }

    // Generation step

    /// Assign scaled fitness. Every genome must be evaluated.
    pub fn scale(&mut self) -> Result<()> {
        self.scaling.scale(&mut self.genomes)
    }

    /// Sort into fitness order, assign ranks, record the best genome and
    /// offer the evaluated genomes to the archive.
    ///
    /// A genome is offered once; it is offered again only after its alleles
    /// change.
    pub fn sort(&mut self) {
        self.genomes.sort_by(|a, b| a.compare(b));
        for (i, genome) in self.genomes.iter_mut().enumerate() {
            genome.fitness_mut().set_rank(i + 1);
        }

        if let Some(top) = self.genomes.iter().find(|g| g.is_evaluated()) {
            let improved = self.best.as_ref().is_none_or(|best| top.is_better_than(best));
            if improved {
                trace!("new best raw fitness {}", top.raw_fitness());
                self.best = Some(top.clone());
            }
        }

        self.archive_policy.update(
            self.genomes.iter().filter(|g| g.is_evaluated() && !g.fitness().is_offered()),
            &mut self.archive,
            self.archive_size,
        );
        for genome in self.genomes.iter_mut().chain(self.archive.iter_mut()) {
            if genome.is_evaluated() {
                genome.fitness_mut().set_offered(true);
            }
        }
    }

    /// Prepare the selector for the current genomes.
    pub fn initialize_selector(&mut self) -> Result<()> {
        self.selector.prepare(&mut self.genomes)
    }

    /// Independent copy of a selected genome.
    pub fn select(&self, rng: &mut RandomSource) -> Result<G> {
        let index = self.selector.select(&self.genomes, rng)?;
        Ok(self.genomes[index].clone())
    }

    /// Replace the genomes with a next generation of exactly `target_size`
    /// genomes and advance the generation counter.
    ///
    /// Fails if any genome is unevaluated, or if the population is empty
    /// and `target_size` is positive.
    pub fn evolve_next_generation(&mut self, target_size: usize, rng: &mut RandomSource) -> Result<()> {
        if self.genomes.is_empty() {
            if target_size > 0 {
                return Err(GaError::Configuration(format!(
                    "cannot breed {target_size} genomes from an empty population"
                )));
            }
            self.generation += 1;
            return Ok(());
        }

        self.scale()?;
        self.sort();
        self.initialize_selector()?;

        let current = self.genomes.len();
        let mut next = Vec::with_capacity(target_size);

        let survivors = portion(current, 1.0 - self.replacement_rate).min(target_size);
        next.extend_from_slice(&self.genomes[..survivors]);

        let replacers = portion(current, self.archive_replacement_rate)
            .min(self.archive.len())
            .min(target_size - next.len());
        next.extend_from_slice(&self.archive[..replacers]);

        while next.len() < target_size {
            let dad = self.selector.select(&self.genomes, rng)?;
            let mom = self.selector.select(&self.genomes, rng)?;
            let (mom, dad) = (&self.genomes[mom], &self.genomes[dad]);

            let children = if rng.chance(self.crossover_rate) {
                mom.cross_with(dad, rng)
            } else {
                vec![mom.clone(), dad.clone()]
            };
            for mut child in children {
                child.mutate(rng);
                next.push(child);
                if next.len() == target_size {
                    break;
                }
            }
        }

        debug!(
            "generation {}: {survivors} survivors, {replacers} archived, {} bred",
            self.generation,
            target_size - survivors - replacers
        );

        self.genomes = next;
        self.selector.reset();
        self.generation += 1;
        Ok(())
    }

    /// One generation step keeping the current size.
    pub fn evolve(&mut self, rng: &mut RandomSource) -> Result<()> {
        self.evolve_next_generation(self.genomes.len(), rng)
    }

    /// Remove and return the first `count` genomes.
    pub(crate) fn take_front(&mut self, count: usize) -> Vec<G> {
        let count = count.min(self.genomes.len());
        self.selector.reset();
        self.genomes
            .drain(..count)
            .map(|mut genome| {
                // new to the receiving archive
                genome.fitness_mut().set_offered(false);
                genome
            })
            .collect()
    }

    /// Append genomes and restore fitness order.
    pub(crate) fn receive(&mut self, migrants: Vec<G>) {
        if migrants.is_empty() {
            return;
        }
        self.genomes.extend(migrants);
        self.selector.reset();
        self.sort();
    }

    /// Multi-line parameter summary.
    pub fn describe(&self) -> String {
        let best = self
            .best
            .as_ref()
            .map_or_else(|| "none".to_string(), |g| g.raw_fitness().to_string());
        format!(
            "population: {} genomes, generation {}\n\
             selection: {:?}\n\
             scaling: {:?}\n\
             crossover rate: {}\n\
             replacement rate: {}\n\
             archive: {:?}, size {}/{}, replacement rate {}\n\
             best raw fitness: {best}",
            self.genomes.len(),
            self.generation,
            self.selector.method(),
            self.scaling,
            self.crossover_rate,
            self.replacement_rate,
            self.archive_policy,
            self.archive.len(),
            self.archive_size,
            self.archive_replacement_rate,
        )
    }
}

/// `floor(count * fraction)`.
fn portion(count: usize, fraction: f64) -> usize {
    (count as f64 * fraction).floor() as usize
}
