//! Fitness scaling: raw fitness to selection weight.

use crate::error::{GaError, Result};
use crate::genome::Genome;
use crate::schema::ScalingMethod;

impl ScalingMethod {
    /// Assign scaled fitness to every genome.
    ///
    /// Fails without touching any genome if one of them is unevaluated.
    /// Rank scaling sorts `genomes` into fitness order.
    pub fn scale<G: Genome>(&self, genomes: &mut [G]) -> Result<()> {
        if let Some(index) = genomes.iter().position(|g| !g.is_evaluated()) {
            return Err(GaError::Evaluation(format!(
                "genome {index} must be evaluated before scaling"
            )));
        }

        match self {
            Self::Identity => {
                for genome in genomes.iter_mut() {
                    let raw = genome.raw_fitness();
                    genome.fitness_mut().set_scaled(raw);
                }
            }
            Self::Rank => {
                genomes.sort_by(|a, b| a.compare(b));
                let count = genomes.len();
                // rank i + 1 scores count - rank + 1
                for (i, genome) in genomes.iter_mut().enumerate() {
                    genome.fitness_mut().set_scaled((count - i) as f64);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::genome::{ListGenome, RealAlleleSet};
    use crate::schema::ListGenomeConfig;

    fn genomes(raw: &[f64], minimize: bool) -> Vec<ListGenome<RealAlleleSet>> {
        let set = Arc::new(RealAlleleSet::new(0.0, 1.0).unwrap());
        let config = ListGenomeConfig {
            minimize,
            ..Default::default()
        };
        let template = ListGenome::from_config(&config, set).unwrap();
        raw.iter()
            .map(|&r| {
                let mut g = template.clone();
                g.fitness_mut().assign(r);
                g
            })
            .collect()
    }

    #[test]
    fn test_identity_copies_raw() {
        let mut pop = genomes(&[-2.0, 5.5, 0.0], false);
        ScalingMethod::Identity.scale(&mut pop).unwrap();
        let scaled: Vec<f64> = pop.iter().map(|g| g.fitness().scaled()).collect();
        assert_eq!(scaled, vec![-2.0, 5.5, 0.0]);
    }

    #[test]
    fn test_rank_minimize() {
        let mut pop = genomes(&[30.0, 10.0, 20.0, 1000.0], true);
        ScalingMethod::Rank.scale(&mut pop).unwrap();
        let pairs: Vec<(f64, f64)> = pop
            .iter()
            .map(|g| (g.raw_fitness(), g.fitness().scaled()))
            .collect();
        assert_eq!(
            pairs,
            vec![(10.0, 4.0), (20.0, 3.0), (30.0, 2.0), (1000.0, 1.0)]
        );
    }

    #[test]
    fn test_rank_maximize_sum() {
        let mut pop = genomes(&[0.1, 9.0, -4.0, 3.0, 3.5], false);
        ScalingMethod::Rank.scale(&mut pop).unwrap();
        assert_eq!(pop[0].raw_fitness(), 9.0);
        assert_eq!(pop[0].fitness().scaled(), 5.0);
        let sum: f64 = pop.iter().map(|g| g.fitness().scaled()).sum();
        assert_eq!(sum, 15.0);
    }

    #[test]
    fn test_unevaluated_genome_rejected() {
        let mut pop = genomes(&[1.0, 2.0], true);
        pop[1].fitness_mut().invalidate();
        let err = ScalingMethod::Rank.scale(&mut pop).unwrap_err();
        assert!(matches!(err, GaError::Evaluation(_)));
        // nothing was written
        assert!(pop.iter().all(|g| g.fitness().scaled() == 0.0));
        assert!(ScalingMethod::Identity.scale(&mut pop).is_err());
    }
}
