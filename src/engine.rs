//! Engine driving evaluate, evolve and migrate across every species.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{GaError, Result};
use crate::genome::Genome;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::schema::EngineConfig;
use crate::species::Species;

/// Assigns raw fitness to every genome of every population of every species.
///
/// An evaluator sees all species at once, so co-evolutionary fitness
/// (genomes scored against other species) is expressible. After `evaluate`
/// returns, every genome must be evaluated.
pub trait Evaluator<G: Genome> {
    fn evaluate(&mut self, species: &mut [Species<G>]);
}

/// Evaluator scoring each genome independently with a plain function.
#[derive(Debug, Clone)]
pub struct FitnessFn<F> {
    f: F,
    parallel: bool,
}

impl<F> FitnessFn<F> {
    /// Sequential evaluator.
    pub fn new(f: F) -> Self {
        Self { f, parallel: false }
    }

    /// Score genomes on the rayon thread pool (sequential on wasm).
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl<G, F> Evaluator<G> for FitnessFn<F>
where
    G: Genome,
    F: Fn(&G) -> f64 + Send + Sync,
{
    fn evaluate(&mut self, species: &mut [Species<G>]) {
        let f = &self.f;
        for population in species.iter_mut().flat_map(Species::populations_mut) {
            if self.parallel {
                population.score_with_par(f);
            } else {
                population.score_with(f);
            }
        }
    }
}

/// Evaluator wrapping a closure over all species.
pub struct EvaluateFn<F>(pub F);

impl<G, F> Evaluator<G> for EvaluateFn<F>
where
    G: Genome,
    F: FnMut(&mut [Species<G>]),
{
    fn evaluate(&mut self, species: &mut [Species<G>]) {
        (self.0)(species)
    }
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No generation has been stepped.
    Constructed,
    /// Stepping; the generation limit has not been reached.
    Running,
    /// The generation limit has been reached or the run was cancelled.
    Done,
}

/// Snapshot of one population after a generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationReport {
    /// Current number of genomes.
    pub size: usize,
    /// Population generation counter.
    pub generation: usize,
    /// Raw fitness of the best genome seen so far.
    pub best_raw_fitness: Option<f64>,
}

/// Snapshot of the engine passed to progress callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Engine generation counter.
    pub generation: usize,
    /// Generation limit.
    pub num_generations: usize,
    /// Per species, per population.
    pub species: Vec<Vec<PopulationReport>>,
}

impl GenerationReport {
    /// Best raw fitness in one species, by that species' fitness order.
    pub fn best_in_species(&self, species: usize, minimize: bool) -> Option<f64> {
        let values = self.species.get(species)?.iter().filter_map(|p| p.best_raw_fitness);
        if minimize {
            values.reduce(f64::min)
        } else {
            values.reduce(f64::max)
        }
    }
}

/// Generational evolution over one or more species.
pub struct Engine<G: Genome, E: Evaluator<G>> {
    species: Vec<Species<G>>,
    evaluator: E,
    num_generations: usize,
    generation: usize,
    state: EngineState,
    rng: RandomSource,
    cancelled: Arc<AtomicBool>,
}

impl<G: Genome, E: Evaluator<G>> fmt::Debug for Engine<G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("species", &self.species.len())
            .field("num_generations", &self.num_generations)
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<G: Genome, E: Evaluator<G>> Engine<G, E> {
    /// Create an engine. `num_generations` must not be negative.
    pub fn new(
        num_generations: i64,
        species: Vec<Species<G>>,
        evaluator: E,
        rng: RandomSource,
    ) -> Result<Self> {
        Ok(Self {
            species,
            evaluator,
            num_generations: check_generations(num_generations)?,
            generation: 1,
            state: EngineState::Constructed,
            rng,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Create an engine seeded from `config.random_seed`, or from entropy
    /// when unset.
    pub fn from_config(config: &EngineConfig, species: Vec<Species<G>>, evaluator: E) -> Result<Self> {
        config.validate()?;
        let rng = config
            .random_seed
            .map_or_else(RandomSource::random, RandomSource::new);
        Self::new(config.generations, species, evaluator, rng)
    }

    pub fn species(&self) -> &[Species<G>] {
        &self.species
    }

    pub fn species_mut(&mut self) -> &mut [Species<G>] {
        &mut self.species
    }

    /// Consume the engine, returning the evolved species.
    pub fn into_species(self) -> Vec<Species<G>> {
        self.species
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Shared random source, e.g. for initializing extra populations.
    pub fn rng_mut(&mut self) -> &mut RandomSource {
        &mut self.rng
    }

    pub fn num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn set_num_generations(&mut self, num_generations: i64) -> Result<()> {
        self.num_generations = check_generations(num_generations)?;
        if self.state != EngineState::Constructed {
            self.refresh_state();
        }
        Ok(())
    }

    /// Generation counter, starting at 1.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Handle that stops `evolve` before its next step when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Run the evaluator over every species.
    pub fn evaluate(&mut self) {
        self.evaluator.evaluate(&mut self.species);
    }

    /// One generation step in every population of every species.
    pub fn evolve_all_species(&mut self) -> Result<()> {
        for species in &mut self.species {
            species.evolve_all_populations(&mut self.rng)?;
        }
        Ok(())
    }

    /// Migrate within every species. Returns the number of genomes moved.
    pub fn perform_migration(&mut self) -> Result<usize> {
        let mut moved = 0;
        for species in &mut self.species {
            moved += species.migrate(&mut self.rng)?;
        }
        Ok(moved)
    }

    /// Evaluate, evolve and migrate once. The generation counter advances
    /// only if every step succeeds.
    pub fn step_generation(&mut self) -> Result<()> {
        self.evaluate();
        self.evolve_all_species()?;
        let moved = self.perform_migration()?;
        self.generation += 1;
        self.refresh_state();
        debug!("engine generation {} complete, {moved} migrants", self.generation);
        Ok(())
    }

    /// Step exactly `n` generations, ignoring the generation limit.
    pub fn step_generations(&mut self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.step_generation()?;
        }
        Ok(())
    }

    /// Step until the generation limit is reached.
    pub fn evolve(&mut self) -> Result<()> {
        self.evolve_with_callback(|_| {})
    }

    /// Step until the generation limit is reached or the run is cancelled,
    /// reporting after every step.
    pub fn evolve_with_callback<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(&GenerationReport),
    {
        info!(
            "evolving {} species from generation {} to {}",
            self.species.len(),
            self.generation,
            self.num_generations
        );
        while self.generation < self.num_generations {
            if self.cancelled.load(Ordering::Relaxed) {
                info!("evolution cancelled at generation {}", self.generation);
                break;
            }
            self.step_generation()?;
            callback(&self.report());
        }
        self.state = EngineState::Done;
        Ok(())
    }

    /// Current per-population summary.
    pub fn report(&self) -> GenerationReport {
        GenerationReport {
            generation: self.generation,
            num_generations: self.num_generations,
            species: self
                .species
                .iter()
                .map(|species| species.populations().iter().map(population_report).collect())
                .collect(),
        }
    }

    fn refresh_state(&mut self) {
        self.state = if self.generation >= self.num_generations {
            EngineState::Done
        } else {
            EngineState::Running
        };
    }
}

fn population_report<G: Genome>(population: &Population<G>) -> PopulationReport {
    PopulationReport {
        size: population.len(),
        generation: population.generation(),
        best_raw_fitness: population.best().map(Genome::raw_fitness),
    }
}

fn check_generations(num_generations: i64) -> Result<usize> {
    usize::try_from(num_generations).map_err(|_| {
        GaError::Configuration(format!(
            "the number of generations must not be negative, got {num_generations}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{IntegerAlleleSet, ListGenome};
    use crate::schema::{ListGenomeConfig, PopulationConfig, SelectionMethod, SpeciesConfig};

    type TestGenome = ListGenome<IntegerAlleleSet>;

    fn ones(g: &TestGenome) -> f64 {
        g.alleles().iter().filter(|a| a.0 == 1).count() as f64
    }

    fn species(rng: &mut RandomSource, migration_rate: f64) -> Vec<Species<TestGenome>> {
        let set = Arc::new(IntegerAlleleSet::new(0, 1).unwrap());
        let genome = ListGenomeConfig {
            min_len: 8,
            max_len: 8,
            mutation_rate: 0.05,
            ..Default::default()
        };
        let template = ListGenome::from_config(&genome, set).unwrap();
        let population = PopulationConfig {
            size: 20,
            replacement_rate: 0.8,
            archive_size: 2,
            selection: SelectionMethod::Tournament { size: 2 },
            ..Default::default()
        };
        let config = SpeciesConfig {
            migration_rate,
            populations: vec![population.clone(), population],
        };
        vec![Species::from_config(&config, &template, rng).unwrap()]
    }

    fn engine(generations: i64) -> Engine<TestGenome, FitnessFn<fn(&TestGenome) -> f64>> {
        let mut rng = RandomSource::new(99);
        let species = species(&mut rng, 0.1);
        Engine::new(generations, species, FitnessFn::new(ones as fn(&TestGenome) -> f64), rng).unwrap()
    }

    #[test]
    fn test_negative_generations_rejected() {
        let mut rng = RandomSource::new(1);
        let species = species(&mut rng, 0.0);
        let err = Engine::new(-1, species, FitnessFn::new(ones), rng).unwrap_err();
        assert!(err.is_configuration());

        let mut engine = engine(5);
        assert!(engine.set_num_generations(-2).is_err());
        assert_eq!(engine.num_generations(), 5);
    }

    #[test]
    fn test_evolve_runs_to_limit() {
        let mut engine = engine(6);
        assert_eq!(engine.state(), EngineState::Constructed);
        let mut reports = Vec::new();
        engine.evolve_with_callback(|r| reports.push(r.generation)).unwrap();
        assert_eq!(engine.generation(), 6);
        assert_eq!(engine.state(), EngineState::Done);
        assert_eq!(reports, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_zero_and_one_generation_do_nothing() {
        for limit in [0, 1] {
            let mut engine = engine(limit);
            engine.evolve().unwrap();
            assert_eq!(engine.generation(), 1);
            assert_eq!(engine.state(), EngineState::Done);
        }
    }

    #[test]
    fn test_step_generations_ignores_limit() {
        let mut engine = engine(2);
        engine.step_generation().unwrap();
        assert_eq!(engine.state(), EngineState::Done);
        engine.step_generations(3).unwrap();
        assert_eq!(engine.generation(), 5);
    }

    #[test]
    fn test_sizes_conserved_across_species() {
        let mut engine = engine(10);
        engine.evolve().unwrap();
        assert_eq!(engine.species()[0].total_genomes(), 40);
        let report = engine.report();
        assert_eq!(report.species[0].len(), 2);
        assert!(report.best_in_species(0, false).is_some());
    }

    #[test]
    fn test_best_improves_on_onemax() {
        let mut engine = engine(30);
        engine.evolve().unwrap();
        let best = engine.report().best_in_species(0, false).unwrap();
        assert!(best >= 7.0);
    }

    #[test]
    fn test_failed_step_keeps_generation() {
        let mut rng = RandomSource::new(3);
        let species = species(&mut rng, 0.0);
        // leaves every genome unevaluated
        let mut engine = Engine::new(5, species, EvaluateFn(|_: &mut [Species<TestGenome>]| {}), rng).unwrap();
        assert!(engine.step_generation().is_err());
        assert_eq!(engine.generation(), 1);
        assert_eq!(engine.state(), EngineState::Constructed);
    }

    #[test]
    fn test_cancel_stops_evolve() {
        let mut engine = engine(50);
        let cancel = engine.cancel_handle();
        let mut steps = 0;
        engine
            .evolve_with_callback(|r| {
                steps += 1;
                if r.generation == 4 {
                    cancel.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();
        assert_eq!(steps, 3);
        assert_eq!(engine.generation(), 4);
        assert_eq!(engine.state(), EngineState::Done);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = engine(8);
        let mut b = engine(8);
        a.evolve().unwrap();
        b.evolve().unwrap();
        assert_eq!(a.report(), b.report());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = RandomSource::new(5);
        let species_a = species(&mut rng, 0.2);
        let species_b = species_a.clone();
        let mut seq = Engine::new(4, species_a, FitnessFn::new(ones), rng.clone()).unwrap();
        let mut par = Engine::new(4, species_b, FitnessFn::new(ones).parallel(), rng).unwrap();
        seq.evolve().unwrap();
        par.evolve().unwrap();
        assert_eq!(seq.report(), par.report());
    }
}
