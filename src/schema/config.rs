//! Configuration types for genomes, populations, species and runs.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GaError, Result, check_rate};

/// Parameters for a variable-length [`ListGenome`](crate::genome::ListGenome).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListGenomeConfig {
    /// Minimum number of alleles drawn by `initialize`.
    #[serde(default)]
    pub min_len: usize,
    /// Maximum number of alleles drawn by `initialize`.
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    /// Per-position mutation probability (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Children produced by one crossover.
    #[serde(default = "default_num_children")]
    pub num_children: usize,
    /// Lower raw fitness is better.
    #[serde(default)]
    pub minimize: bool,
}

impl Default for ListGenomeConfig {
    fn default() -> Self {
        Self {
            min_len: 0,
            max_len: default_max_len(),
            mutation_rate: default_mutation_rate(),
            num_children: default_num_children(),
            minimize: false,
        }
    }
}

impl ListGenomeConfig {
    /// Validate genome parameters.
    pub fn validate(&self) -> Result<()> {
        if self.min_len > self.max_len {
            return Err(GaError::Configuration(format!(
                "list genome min_len ({}) > max_len ({})",
                self.min_len, self.max_len
            )));
        }
        check_rate("mutation_rate", self.mutation_rate)?;
        check_children(self.num_children)
    }
}

/// Parameters for a fixed-length [`ArrayGenome`](crate::genome::ArrayGenome).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayGenomeConfig {
    /// Per-position mutation probability (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Children produced by one crossover.
    #[serde(default = "default_num_children")]
    pub num_children: usize,
    /// Cut points per crossover.
    #[serde(default = "default_crossover_points")]
    pub crossover_points: usize,
    /// Lower raw fitness is better.
    #[serde(default)]
    pub minimize: bool,
}

impl Default for ArrayGenomeConfig {
    fn default() -> Self {
        Self {
            mutation_rate: default_mutation_rate(),
            num_children: default_num_children(),
            crossover_points: default_crossover_points(),
            minimize: false,
        }
    }
}

impl ArrayGenomeConfig {
    /// Validate genome parameters.
    pub fn validate(&self) -> Result<()> {
        check_rate("mutation_rate", self.mutation_rate)?;
        check_children(self.num_children)?;
        if self.crossover_points == 0 {
            return Err(GaError::Configuration(
                "crossover_points must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_len() -> usize {
    10
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_num_children() -> usize {
    2
}
fn default_crossover_points() -> usize {
    1
}

fn check_children(n: usize) -> Result<()> {
    if n == 0 {
        return Err(GaError::Configuration(
            "num_children must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Selection method for breeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "method")]
pub enum SelectionMethod {
    /// Fitness-proportionate selection over scaled fitness.
    #[default]
    RouletteWheel,
    /// Best of `size` uniformly drawn genomes.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
}

fn default_tournament_size() -> usize {
    2
}

/// Raw to scaled fitness transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScalingMethod {
    /// Scaled fitness equals raw fitness.
    #[default]
    Identity,
    /// Scaled fitness is `N - rank + 1`.
    Rank,
}

/// Policy maintaining a population's all-time elite archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ArchivePolicy {
    /// Keep the best genomes ever seen.
    #[default]
    Elite,
}

/// Population parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of genomes created by initialization.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Probability that a selected pair is recombined (0.0-1.0).
    #[serde(default = "default_rate_one")]
    pub crossover_rate: f64,
    /// Fraction of the population replaced each generation (0.0-1.0).
    #[serde(default = "default_rate_one")]
    pub replacement_rate: f64,
    /// Capacity of the elite archive.
    #[serde(default)]
    pub archive_size: usize,
    /// Fraction of the next generation copied from the archive. Clamped to
    /// `replacement_rate`.
    #[serde(default)]
    pub archive_replacement_rate: f64,
    /// Selection method.
    #[serde(default)]
    pub selection: SelectionMethod,
    /// Fitness scaling.
    #[serde(default)]
    pub scaling: ScalingMethod,
    /// Archive update policy.
    #[serde(default)]
    pub archive: ArchivePolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            crossover_rate: default_rate_one(),
            replacement_rate: default_rate_one(),
            archive_size: 0,
            archive_replacement_rate: 0.0,
            selection: SelectionMethod::default(),
            scaling: ScalingMethod::default(),
            archive: ArchivePolicy::default(),
        }
    }
}

impl PopulationConfig {
    /// Validate population parameters.
    pub fn validate(&self) -> Result<()> {
        check_rate("crossover_rate", self.crossover_rate)?;
        check_rate("replacement_rate", self.replacement_rate)?;
        check_rate("archive_replacement_rate", self.archive_replacement_rate)?;
        if let SelectionMethod::Tournament { size: 0 } = self.selection {
            return Err(GaError::Configuration(
                "tournament size must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

fn default_population_size() -> usize {
    50
}
fn default_rate_one() -> f64 {
    1.0
}

/// Species parameters: populations sharing one genome representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Rate at which genomes emigrate to other populations (0.0-1.0).
    #[serde(default)]
    pub migration_rate: f64,
    /// One entry per population.
    #[serde(default = "default_populations")]
    pub populations: Vec<PopulationConfig>,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            migration_rate: 0.0,
            populations: default_populations(),
        }
    }
}

impl SpeciesConfig {
    /// Validate species parameters and every population.
    pub fn validate(&self) -> Result<()> {
        check_rate("migration_rate", self.migration_rate)?;
        if self.populations.is_empty() {
            return Err(GaError::Configuration(
                "a species needs at least one population".into(),
            ));
        }
        for population in &self.populations {
            population.validate()?;
        }
        Ok(())
    }
}

fn default_populations() -> Vec<PopulationConfig> {
    vec![PopulationConfig::default()]
}

/// Engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Generation count at which `evolve` stops. Must not be negative.
    #[serde(default = "default_generations")]
    pub generations: i64,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generations: default_generations(),
            random_seed: None,
        }
    }
}

impl EngineConfig {
    /// Validate engine parameters.
    pub fn validate(&self) -> Result<()> {
        if self.generations < 0 {
            return Err(GaError::Configuration(format!(
                "the number of generations must not be negative, got {}",
                self.generations
            )));
        }
        Ok(())
    }
}

fn default_generations() -> i64 {
    100
}

/// Top-level configuration for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// One entry per species.
    #[serde(default)]
    pub species: Vec<SpeciesConfig>,
}

impl RunConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate the engine and every species.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        for species in &self.species {
            species.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_valid() {
        assert!(ListGenomeConfig::default().validate().is_ok());
        assert!(ArrayGenomeConfig::default().validate().is_ok());
        assert!(PopulationConfig::default().validate().is_ok());
        assert!(SpeciesConfig::default().validate().is_ok());
        assert!(EngineConfig::default().validate().is_ok());
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let list = ListGenomeConfig {
            min_len: 5,
            max_len: 2,
            ..Default::default()
        };
        assert!(list.validate().unwrap_err().is_configuration());

        let pop = PopulationConfig {
            selection: SelectionMethod::Tournament { size: 0 },
            ..Default::default()
        };
        assert!(pop.validate().is_err());

        let pop = PopulationConfig {
            replacement_rate: 1.5,
            ..Default::default()
        };
        assert!(pop.validate().is_err());

        let species = SpeciesConfig {
            populations: Vec::new(),
            ..Default::default()
        };
        assert!(species.validate().is_err());

        let engine = EngineConfig {
            generations: -1,
            ..Default::default()
        };
        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_json_defaults() {
        let config = RunConfig::from_json_str(
            r#"{
                "engine": { "generations": 20, "random_seed": 55 },
                "species": [{
                    "migration_rate": 0.1,
                    "populations": [
                        { "size": 30, "selection": { "method": "Tournament", "size": 3 } },
                        { "scaling": "Rank" }
                    ]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.engine.generations, 20);
        assert_eq!(config.engine.random_seed, Some(55));
        let pops = &config.species[0].populations;
        assert_eq!(pops[0].size, 30);
        assert_eq!(pops[0].selection, SelectionMethod::Tournament { size: 3 });
        assert_eq!(pops[1].size, 50);
        assert_eq!(pops[1].scaling, ScalingMethod::Rank);
        assert_eq!(pops[1].selection, SelectionMethod::RouletteWheel);
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let err = RunConfig::from_json_str(r#"{ "engine": { "generations": -3 } }"#).unwrap_err();
        assert!(err.is_configuration());

        let err = RunConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, GaError::Json(_)));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = RunConfig {
            species: vec![SpeciesConfig::default()],
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed = RunConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.species.len(), 1);
        assert_eq!(parsed.engine.generations, config.engine.generations);
    }
}
