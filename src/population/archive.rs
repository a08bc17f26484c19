//! Elite archive maintenance.

use log::trace;

use crate::genome::Genome;
use crate::schema::ArchivePolicy;

impl ArchivePolicy {
    /// Offer `candidates` (best first) to `archive`, keeping it sorted and at
    /// most `max_size` long. Returns how many candidates were admitted.
    ///
    /// Candidates fill the archive unconditionally while it has room. Once
    /// full, a candidate replaces the worst member only if strictly fitter;
    /// the first candidate that is not stops the scan.
    pub fn update<'a, G, I>(&self, candidates: I, archive: &mut Vec<G>, max_size: usize) -> usize
    where
        G: Genome + 'a,
        I: IntoIterator<Item = &'a G>,
    {
        match self {
            Self::Elite => {
                archive.truncate(max_size);
                if max_size == 0 {
                    return 0;
                }

                let mut admitted = 0;
                for candidate in candidates {
                    if archive.len() >= max_size {
                        let Some(worst) = archive.last() else { break };
                        if !candidate.is_better_than(worst) {
                            break;
                        }
                        archive.pop();
                    }
                    archive.push(candidate.clone());
                    archive.sort_by(|a, b| a.compare(b));
                    admitted += 1;
                }

                if admitted > 0 {
                    trace!("elite archive admitted {admitted}, holds {}", archive.len());
                }
                admitted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::genome::{ListGenome, RealAlleleSet};
    use crate::schema::ListGenomeConfig;

    fn genomes(raw: &[f64]) -> Vec<ListGenome<RealAlleleSet>> {
        let set = Arc::new(RealAlleleSet::new(0.0, 1.0).unwrap());
        let config = ListGenomeConfig {
            minimize: true,
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

    fn raws(archive: &[ListGenome<RealAlleleSet>]) -> Vec<f64> {
        archive.iter().map(|g| g.raw_fitness()).collect()
    }

    #[test]
    fn test_fills_then_replaces_worst() {
        let mut archive = Vec::new();
        let first = genomes(&[3.0, 5.0, 7.0]);
        assert_eq!(ArchivePolicy::Elite.update(&first, &mut archive, 3), 3);
        assert_eq!(raws(&archive), vec![3.0, 5.0, 7.0]);

        let second = genomes(&[1.0, 4.0, 6.0]);
        assert_eq!(ArchivePolicy::Elite.update(&second, &mut archive, 3), 2);
        assert_eq!(raws(&archive), vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_stops_at_first_rejected_candidate() {
        let mut archive = genomes(&[1.0, 2.0]);
        let candidates = genomes(&[5.0, 0.5]);
        assert_eq!(ArchivePolicy::Elite.update(&candidates, &mut archive, 2), 0);
        assert_eq!(raws(&archive), vec![1.0, 2.0]);
    }

    #[test]
    fn test_equal_fitness_not_admitted_when_full() {
        let mut archive = genomes(&[1.0, 2.0]);
        let candidates = genomes(&[2.0]);
        assert_eq!(ArchivePolicy::Elite.update(&candidates, &mut archive, 2), 0);
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let mut archive = genomes(&[0.0]);
        let candidates = genomes(&[-0.0]);
        assert_eq!(ArchivePolicy::Elite.update(&candidates, &mut archive, 1), 0);
        assert!(archive[0].raw_fitness().is_sign_positive());
    }

    #[test]
    fn test_zero_capacity_and_shrink() {
        let mut archive = genomes(&[1.0, 2.0, 3.0]);
        let candidates = genomes(&[0.0]);
        assert_eq!(ArchivePolicy::Elite.update(&candidates, &mut archive, 0), 0);
        assert!(archive.is_empty());

        let mut archive = genomes(&[1.0, 2.0, 3.0]);
        ArchivePolicy::Elite.update(&[] as &[ListGenome<RealAlleleSet>], &mut archive, 2);
        assert_eq!(raws(&archive), vec![1.0, 2.0]);
    }

    #[test]
    fn test_fill_accepts_worse_candidates() {
        let mut archive = genomes(&[1.0]);
        let candidates = genomes(&[9.0, 8.0]);
        assert_eq!(ArchivePolicy::Elite.update(&candidates, &mut archive, 3), 2);
        assert_eq!(raws(&archive), vec![1.0, 8.0, 9.0]);
    }
}
