//! Genetica CLI - Evolve list genomes towards an ascending target sequence.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use genetica::{
    GaError, Result,
    engine::{Engine, FitnessFn, GenerationReport},
    genome::{Genome, ListGenome, RealAlleleSet},
    rng::RandomSource,
    schema::{
        EngineConfig, ListGenomeConfig, PopulationConfig, RunConfig, ScalingMethod,
        SelectionMethod, SpeciesConfig,
    },
    species::Species,
};

/// Run configuration plus the target-sequence problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProblemConfig {
    #[serde(flatten)]
    run: RunConfig,
    #[serde(default)]
    genome: ListGenomeConfig,
    /// Length of the target sequence `0, 1, ..., target_len - 1`.
    #[serde(default = "default_target_len")]
    target_len: usize,
    /// Alleles are drawn from `[0, allele_max)`.
    #[serde(default = "default_allele_max")]
    allele_max: f64,
}

fn default_target_len() -> usize {
    10
}

fn default_allele_max() -> f64 {
    10.0
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Evolve list genomes towards the sequence 0, 1, ..., n - 1.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to run configuration file");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    if let Err(e) = run(PathBuf::from(&args[1])) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config_path: PathBuf) -> Result<()> {
    let config: ProblemConfig = serde_json::from_str(&fs::read_to_string(&config_path)?)?;
    config.run.validate()?;
    if config.run.species.is_empty() {
        return Err(GaError::Configuration(
            "the configuration needs at least one species".into(),
        ));
    }

    let mut rng = config
        .run
        .engine
        .random_seed
        .map_or_else(RandomSource::random, RandomSource::new);
    let alleles = Arc::new(RealAlleleSet::new(0.0, config.allele_max)?);
    let template = ListGenome::from_config(&config.genome, alleles)?;
    let species = config
        .run
        .species
        .iter()
        .map(|s| Species::from_config(s, &template, &mut rng))
        .collect::<Result<Vec<_>>>()?;

    let target_len = config.target_len;
    let fitness = FitnessFn::new(move |g: &ListGenome<RealAlleleSet>| distance(g, target_len)).parallel();
    let minimize = config.genome.minimize;
    let mut engine = Engine::new(config.run.engine.generations, species, fitness, rng)?;

    println!("Genetica");
    println!("========");
    println!("Species: {}", engine.species().len());
    for (i, species) in engine.species().iter().enumerate() {
        println!("Species {i}: migration rate {}", species.migration_rate());
        for population in species.populations() {
            for line in population.describe().lines() {
                println!("  {line}");
            }
        }
    }
    println!("Generations: {}", engine.num_generations());
    println!();

    println!("Evolving...");
    let start = Instant::now();
    let every = (engine.num_generations() / 10).max(1);
    engine.evolve_with_callback(|report: &GenerationReport| {
        if report.generation % every == 0 {
            let best: Vec<String> = (0..report.species.len())
                .map(|i| {
                    report
                        .best_in_species(i, minimize)
                        .map_or_else(|| "-".to_string(), |b| format!("{b:.3}"))
                })
                .collect();
            println!(
                "  Generation {}/{}: best {}, {:.1} gen/s",
                report.generation,
                report.num_generations,
                best.join(" "),
                report.generation as f64 / start.elapsed().as_secs_f64()
            );
        }
    })?;

    println!();
    println!("Finished in {:.2?}", start.elapsed());
    for (i, species) in engine.species().iter().enumerate() {
        for (j, population) in species.populations().iter().enumerate() {
            if let Some(best) = population.best() {
                println!(
                    "Species {i}, population {j}: {:.4} [{}]",
                    best.raw_fitness(),
                    best.describe()
                );
            }
        }
    }
    Ok(())
}

/// Absolute error against `0, 1, ...` over the first `target_len` alleles,
/// plus the allele range per allele of length difference.
fn distance(genome: &ListGenome<RealAlleleSet>, target_len: usize) -> f64 {
    let alleles = genome.alleles();
    let error: f64 = alleles
        .iter()
        .take(target_len)
        .enumerate()
        .map(|(i, a)| (a.0 - i as f64).abs())
        .sum();
    let penalty = genome.allele_set().max() - genome.allele_set().min();
    error + penalty * alleles.len().abs_diff(target_len) as f64
}

fn print_example_config() {
    let config = ProblemConfig {
        run: RunConfig {
            engine: EngineConfig {
                generations: 100,
                random_seed: Some(55),
            },
            species: vec![SpeciesConfig {
                migration_rate: 0.0,
                populations: vec![PopulationConfig {
                    size: 50,
                    crossover_rate: 0.8,
                    replacement_rate: 0.9,
                    scaling: ScalingMethod::Rank,
                    selection: SelectionMethod::Tournament { size: 2 },
                    ..Default::default()
                }],
            }],
        },
        genome: ListGenomeConfig {
            min_len: 0,
            max_len: 7,
            mutation_rate: 0.1,
            num_children: 2,
            minimize: true,
        },
        target_len: default_target_len(),
        allele_max: default_allele_max(),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    );
}
