//! Allele values and the domains that generate them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GaError, Result};
use crate::rng::RandomSource;

/// One unit of genetic information.
///
/// `Clone` must be a fully independent deep copy.
pub trait AlleleValue: Clone + fmt::Debug + fmt::Display + Send + Sync {}

impl<T> AlleleValue for T where T: Clone + fmt::Debug + fmt::Display + Send + Sync {}

/// Generator of valid random allele values for a domain.
pub trait AlleleSet: fmt::Debug + Send + Sync {
    /// Allele type produced by this set.
    type Value: AlleleValue;

    /// Draw a fresh random value from the domain.
    fn random_value(&self, rng: &mut RandomSource) -> Self::Value;
}

/// Real-valued allele, displayed with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RealAllele(pub f64);

impl fmt::Display for RealAllele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Integer-valued allele.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntegerAllele(pub i64);

impl fmt::Display for IntegerAllele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniform real values in `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealAlleleSet {
    min: f64,
    max: f64,
}

impl RealAlleleSet {
    /// Create a domain. Requires finite bounds with `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(GaError::Configuration(format!(
                "real allele set requires min < max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound (exclusive).
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl AlleleSet for RealAlleleSet {
    type Value = RealAllele;

    fn random_value(&self, rng: &mut RandomSource) -> RealAllele {
        RealAllele(rng.uniform_real(self.min, self.max))
    }
}

/// Uniform integer values in `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerAlleleSet {
    min: i64,
    max: i64,
}

impl IntegerAlleleSet {
    /// Create a domain. Requires `min < max`.
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min >= max {
            return Err(GaError::Configuration(format!(
                "integer allele set requires min < max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(&self) -> i64 {
        self.max
    }
}

impl AlleleSet for IntegerAlleleSet {
    type Value = IntegerAllele;

    fn random_value(&self, rng: &mut RandomSource) -> IntegerAllele {
        IntegerAllele(rng.uniform_int(self.min, self.max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_set_bounds() {
        let set = RealAlleleSet::new(0.0, 10.0).unwrap();
        let mut rng = RandomSource::new(1);
        for _ in 0..1000 {
            let RealAllele(v) = set.random_value(&mut rng);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn test_integer_set_inclusive() {
        let set = IntegerAlleleSet::new(-1, 1).unwrap();
        let mut rng = RandomSource::new(2);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let IntegerAllele(v) = set.random_value(&mut rng);
            seen[(v + 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(RealAlleleSet::new(1.0, 1.0).unwrap_err().is_configuration());
        assert!(RealAlleleSet::new(2.0, 1.0).is_err());
        assert!(RealAlleleSet::new(0.0, f64::INFINITY).is_err());
        assert!(IntegerAlleleSet::new(5, 5).is_err());
        assert!(IntegerAlleleSet::new(5, 4).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(RealAllele(1.23456).to_string(), "1.23");
        assert_eq!(IntegerAllele(-7).to_string(), "-7");
    }
}
