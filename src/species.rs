//! Species: populations sharing one genome representation, linked by
//! migration.

use log::debug;

use crate::error::{GaError, Result, check_rate};
use crate::genome::Genome;
use crate::population::Population;
use crate::rng::RandomSource;
use crate::schema::SpeciesConfig;

/// A group of populations of the same genome type.
#[derive(Debug, Clone)]
pub struct Species<G: Genome> {
    populations: Vec<Population<G>>,
    migration_rate: f64,
}

impl<G: Genome> Species<G> {
    /// Create from existing populations.
    pub fn new(populations: Vec<Population<G>>, migration_rate: f64) -> Result<Self> {
        if populations.is_empty() {
            return Err(GaError::Configuration(
                "a species needs at least one population".into(),
            ));
        }
        Ok(Self {
            populations,
            migration_rate: check_rate("migration_rate", migration_rate)?,
        })
    }

    /// Build every configured population from `template`.
    pub fn from_config(config: &SpeciesConfig, template: &G, rng: &mut RandomSource) -> Result<Self> {
        config.validate()?;
        let populations = config
            .populations
            .iter()
            .map(|population| Population::from_config(population, template, rng))
            .collect::<Result<Vec<_>>>()?;
        Self::new(populations, config.migration_rate)
    }

    pub fn populations(&self) -> &[Population<G>] {
        &self.populations
    }

    /// Mutable access to the populations; the set itself is fixed.
    pub fn populations_mut(&mut self) -> &mut [Population<G>] {
        &mut self.populations
    }

    pub fn migration_rate(&self) -> f64 {
        self.migration_rate
    }

    pub fn set_migration_rate(&mut self, rate: f64) -> Result<()> {
        self.migration_rate = check_rate("migration_rate", rate)?;
        Ok(())
    }

    /// Genomes across all populations.
    pub fn total_genomes(&self) -> usize {
        self.populations.iter().map(Population::len).sum()
    }

    /// Move genomes between populations. Returns the number moved.
    ///
    /// Each population sends a binomially distributed number of emigrants,
    /// taken from the front of its genome list; every emigrant goes to a
    /// uniformly chosen population other than its source. Receivers are
    /// re-sorted. The total genome count is unchanged.
    pub fn migrate(&mut self, rng: &mut RandomSource) -> Result<usize> {
        let count = self.populations.len();
        if count < 2 || self.migration_rate <= 0.0 {
            return Ok(0);
        }

        let mut inbound: Vec<Vec<G>> = (0..count).map(|_| Vec::new()).collect();
        let mut moved = 0;
        for source in 0..count {
            let size = self.populations[source].len() as u64;
            let emigrants = rng.binomial(size, self.migration_rate)? as usize;
            for migrant in self.populations[source].take_front(emigrants) {
                let mut destination = source;
                while destination == source {
                    destination = rng.uniform_index(count);
                }
                inbound[destination].push(migrant);
                moved += 1;
            }
        }

        for (population, migrants) in self.populations.iter_mut().zip(inbound) {
            population.receive(migrants);
        }
        debug!("migrated {moved} genomes across {count} populations");
        Ok(moved)
    }

    /// One generation step for every population, keeping each size.
    pub fn evolve_all_populations(&mut self, rng: &mut RandomSource) -> Result<()> {
        for population in &mut self.populations {
            population.evolve(rng)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::genome::{ListGenome, RealAlleleSet};
    use crate::schema::{ListGenomeConfig, PopulationConfig};

    type TestGenome = ListGenome<RealAlleleSet>;

    fn template() -> TestGenome {
        let set = Arc::new(RealAlleleSet::new(0.0, 1.0).unwrap());
        let config = ListGenomeConfig {
            min_len: 2,
            max_len: 4,
            ..Default::default()
        };
        ListGenome::from_config(&config, set).unwrap()
    }

    fn build(sizes: &[usize], migration_rate: f64, rng: &mut RandomSource) -> Species<TestGenome> {
        let config = SpeciesConfig {
            migration_rate,
            populations: sizes
                .iter()
                .map(|&size| PopulationConfig {
                    size,
                    ..Default::default()
                })
                .collect(),
        };
        let mut species = Species::from_config(&config, &template(), rng).unwrap();
        for population in species.populations_mut() {
            population.score_with(|g| g.len() as f64);
        }
        species
    }

    #[test]
    fn test_requires_population() {
        assert!(Species::<TestGenome>::new(Vec::new(), 0.0).is_err());
        assert!(Species::<TestGenome>::new(vec![Population::new()], 1.5).is_err());
    }

    #[test]
    fn test_migration_conserves_genomes() {
        let mut rng = RandomSource::new(17);
        let mut species = build(&[10, 20, 5], 0.3, &mut rng);
        assert_eq!(species.total_genomes(), 35);
        let mut moved = 0;
        for _ in 0..20 {
            moved += species.migrate(&mut rng).unwrap();
            assert_eq!(species.total_genomes(), 35);
        }
        assert!(moved > 0);
    }

    fn sequences(species: &Species<TestGenome>) -> Vec<Vec<String>> {
        species
            .populations()
            .iter()
            .map(|p| p.genomes().iter().map(|g| g.describe()).collect())
            .collect()
    }

    #[test]
    fn test_migration_noops() {
        let mut rng = RandomSource::new(18);
        let mut single = build(&[10], 1.0, &mut rng);
        let before = sequences(&single);
        assert_eq!(single.migrate(&mut rng).unwrap(), 0);
        assert_eq!(sequences(&single), before);

        let mut still = build(&[10, 10], 0.0, &mut rng);
        let before = sequences(&still);
        assert_eq!(still.migrate(&mut rng).unwrap(), 0);
        assert_eq!(sequences(&still), before);
    }

    #[test]
    fn test_full_migration_moves_everyone() {
        let mut rng = RandomSource::new(19);
        let mut species = build(&[4, 6], 1.0, &mut rng);
        assert_eq!(species.migrate(&mut rng).unwrap(), 10);
        // with two populations every emigrant lands in the other one
        assert_eq!(species.populations()[0].len(), 6);
        assert_eq!(species.populations()[1].len(), 4);
    }

    #[test]
    fn test_evolve_all_keeps_sizes() {
        let mut rng = RandomSource::new(20);
        let mut species = build(&[8, 12], 0.0, &mut rng);
        species.evolve_all_populations(&mut rng).unwrap();
        let sizes: Vec<usize> = species.populations().iter().map(Population::len).collect();
        assert_eq!(sizes, vec![8, 12]);
        assert!(species.populations().iter().all(|p| p.generation() == 2));
    }
}
