//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - step count and step size,
//! - gravitational constant and softening (`G`, `softening`),
//! - the squared-distance floor `min_r2` applied before dividing,
//! - random seed for generated rosters
//!
//! The benchmark and the astronomical demo use unrelated constant sets, so both
//! are exposed as presets instead of a single global `G`.

use crate::error::SimError;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub steps: usize, // fixed step count for batch runs
    pub dt: f64, // step size
    pub G: f64, // gravitational constant
    pub softening: f64, // additive epsilon on the distance
    pub min_r2: f64, // floor on the squared distance
    pub seed: u64, // deterministic seed
}

impl Parameters {
    /// Unit-scale constants used by the synthetic benchmark roster
    pub fn benchmark() -> Self {
        Self {
            steps: 3,
            dt: 0.1,
            G: 1.0e-4,
            softening: 1.0e-5,
            min_r2: 1.0e-10,
            seed: 42,
        }
    }

    /// SI constants for the solar-system demo, dt in seconds
    pub fn solar() -> Self {
        Self {
            steps: 1000,
            dt: 100_000.0,
            G: 6.674e-11,
            softening: 1.0e-5,
            min_r2: 1.0e-10,
            seed: 0,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(invalid("dt", format!("must be positive and finite, got {}", self.dt)));
        }
        if !self.G.is_finite() {
            return Err(invalid("G", format!("must be finite, got {}", self.G)));
        }
        if !(self.softening.is_finite() && self.softening >= 0.0) {
            return Err(invalid("softening", format!("must be non-negative, got {}", self.softening)));
        }
        if !(self.min_r2.is_finite() && self.min_r2 > 0.0) {
            return Err(invalid("min_r2", format!("must be positive, got {}", self.min_r2)));
        }
        Ok(())
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::benchmark()
    }
}

fn invalid(name: &'static str, reason: String) -> SimError {
    SimError::InvalidParameter { name, reason }
}
