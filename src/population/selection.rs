//! Parent selection: roulette wheel and tournament.
//!
//! Selection samples with replacement and never removes candidates from the
//! pool; it is called once per offspring slot.

use crate::error::{GaError, Result};
use crate::genome::Genome;
use crate::rng::{DiscreteSampler, RandomSource};
use crate::schema::SelectionMethod;

/// Runtime selector built from a [`SelectionMethod`].
#[derive(Debug, Clone)]
pub enum Selector {
    /// Fitness-proportionate selection; must be prepared every generation.
    RouletteWheel {
        /// Distribution over the population prepared for this generation.
        sampler: Option<DiscreteSampler>,
    },
    /// Best of `size` uniformly drawn genomes.
    Tournament {
        /// Genomes drawn per tournament.
        size: usize,
    },
}

impl Default for Selector {
    fn default() -> Self {
        Self::roulette_wheel()
    }
}

impl Selector {
    /// Unprepared roulette wheel selector.
    pub fn roulette_wheel() -> Self {
        Self::RouletteWheel { sampler: None }
    }

    /// Tournament selector. `size` must be positive.
    pub fn tournament(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(GaError::Configuration(
                "tournament size must be a positive integer".into(),
            ));
        }
        Ok(Self::Tournament { size })
    }

    /// Build from configuration.
    pub fn from_method(method: SelectionMethod) -> Result<Self> {
        match method {
            SelectionMethod::RouletteWheel => Ok(Self::roulette_wheel()),
            SelectionMethod::Tournament { size } => Self::tournament(size),
        }
    }

    /// Configuration this selector was built from.
    pub fn method(&self) -> SelectionMethod {
        match self {
            Self::RouletteWheel { .. } => SelectionMethod::RouletteWheel,
            Self::Tournament { size } => SelectionMethod::Tournament { size: *size },
        }
    }

    /// Per-generation setup.
    ///
    /// Roulette wheel: copies scaled fitness to the genomes' working weight,
    /// shifts all weights by `-1.1 * min` when the minimum is negative,
    /// inverts non-zero weights when minimizing, then builds the sampler.
    pub fn prepare<G: Genome>(&mut self, genomes: &mut [G]) -> Result<()> {
        let Self::RouletteWheel { sampler } = self else {
            return Ok(());
        };
        let Some(first) = genomes.first() else {
            return Err(GaError::Configuration(
                "cannot prepare selection over an empty population".into(),
            ));
        };
        let minimize = first.fitness().minimize();

        let min = genomes
            .iter()
            .map(|g| g.fitness().scaled())
            .fold(f64::INFINITY, f64::min);
        let shift = if min < 0.0 { -1.1 * min } else { 0.0 };

        let mut weights = Vec::with_capacity(genomes.len());
        for genome in genomes.iter_mut() {
            let mut weight = genome.fitness().scaled() + shift;
            if minimize && weight != 0.0 {
                weight = weight.recip();
            }
            genome.fitness_mut().set_temp(weight);
            weights.push(weight);
        }

        *sampler = Some(DiscreteSampler::new(&weights)?);
        Ok(())
    }

    /// Forget per-generation state.
    pub fn reset(&mut self) {
        if let Self::RouletteWheel { sampler } = self {
            *sampler = None;
        }
    }

    /// Index of the selected genome.
    pub fn select<G: Genome>(&self, genomes: &[G], rng: &mut RandomSource) -> Result<usize> {
        match self {
            Self::RouletteWheel { sampler } => match sampler {
                Some(sampler) if sampler.len() == genomes.len() => Ok(rng.sample(sampler)),
                _ => Err(GaError::SelectorNotInitialized),
            },
            Self::Tournament { size } => {
                if genomes.is_empty() {
                    return Err(GaError::Configuration(
                        "cannot select from an empty population".into(),
                    ));
                }
                let mut best = rng.uniform_index(genomes.len());
                for _ in 1..*size {
                    let challenger = rng.uniform_index(genomes.len());
                    if genomes[challenger].is_better_than(&genomes[best]) {
                        best = challenger;
                    }
                }
                Ok(best)
            }
        }
    }
}
