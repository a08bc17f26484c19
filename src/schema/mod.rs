//! Schema module - Configuration types for genomes, populations, species and runs.

mod config;

pub use config::*;
