//! Genetica - generic evolutionary optimization.
//!
//! Candidate solutions ("genomes") live in populations, populations of one
//! genome representation are grouped into species, and an [`Engine`] drives
//! evaluation, generational replacement and migration for a fixed number of
//! generations. Fitness evaluation is supplied by the caller through the
//! [`Evaluator`] trait and may look at all species at once.
//!
//! # Architecture
//!
//! - `rng`: seedable random source shared by every stochastic operation
//! - `genome`: the `Genome` trait, fitness bookkeeping, list and array genomes
//! - `population`: scaling, selection, elite archive and replacement
//! - `species`: populations linked by migration
//! - `engine`: the evaluate, evolve, migrate loop
//! - `schema`: serde configuration types
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use genetica::{
//!     engine::{Engine, FitnessFn},
//!     genome::{Genome, ListGenome, RealAlleleSet},
//!     rng::RandomSource,
//!     schema::{ListGenomeConfig, SpeciesConfig},
//!     species::Species,
//! };
//!
//! let mut rng = RandomSource::new(55);
//! let alleles = Arc::new(RealAlleleSet::new(0.0, 10.0).unwrap());
//! let template = ListGenome::from_config(&ListGenomeConfig::default(), alleles).unwrap();
//! let species = Species::from_config(&SpeciesConfig::default(), &template, &mut rng).unwrap();
//!
//! // Maximize the sum of the alleles.
//! let fitness = FitnessFn::new(|g: &ListGenome<RealAlleleSet>| {
//!     g.alleles().iter().map(|a| a.0).sum::<f64>()
//! });
//!
//! let mut engine = Engine::new(100, vec![species], fitness, rng).unwrap();
//! engine.evolve().unwrap();
//!
//! let best = engine.species()[0].populations()[0].best().unwrap();
//! println!("best: {} -> {}", best.describe(), best.raw_fitness());
//! ```

pub mod engine;
pub mod error;
pub mod genome;
pub mod population;
pub mod rng;
pub mod schema;
pub mod species;

// Re-export commonly used types
pub use engine::{Engine, EngineState, Evaluator, FitnessFn, GenerationReport};
pub use error::{GaError, Result};
pub use genome::{Fitness, Genome};
pub use population::Population;
pub use rng::RandomSource;
pub use schema::RunConfig;
pub use species::Species;
