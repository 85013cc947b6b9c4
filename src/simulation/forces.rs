//! Pairwise force laws for the n-body engine
//!
//! Both integrators only ever ask "what force does `from` exert on `on`",
//! so the law is a stateless trait over two body snapshots

use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2};

/// A force law evaluated on one ordered pair of bodies
pub trait PairForce {
    /// Force that `from` exerts on `on`
    fn force(&self, on: &Body, from: &Body) -> NVec2;
}

/// 2D Newtonian gravity with additive softening and a squared-distance floor
///
/// ```text
/// d  = x_from - x_on
/// r2 = max(|d|^2, min_r2)
/// r  = sqrt(r2) + softening
/// F  = G m_on m_from / r2
/// f  = F d / r
/// ```
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonianGravity {
    pub G: f64, // gravitational constant
    pub softening: f64, // added to |d|, keeps the direction term bounded
    pub min_r2: f64, // clamp for coincident bodies
}

impl NewtonianGravity {
    pub fn from_params(p: &Parameters) -> Self {
        Self {
            G: p.G,
            softening: p.softening,
            min_r2: p.min_r2,
        }
    }
}

impl PairForce for NewtonianGravity {
    fn force(&self, on: &Body, from: &Body) -> NVec2 {
        // Displacement from `on` toward `from`, attraction points along +d
        let d = from.x - on.x;

        // Coincident bodies would divide by ~0 below, clamp instead of faulting
        let r2 = d.dot(&d).max(self.min_r2);
        let r = r2.sqrt() + self.softening;

        let magnitude = self.G * on.mass() * from.mass() / r2;
        NVec2::new(magnitude * d.x / r, magnitude * d.y / r)
    }
}

/// Compute the net force on every body for the current positions
/// - `out[i]` is overwritten with the sum over every `j != i`, in index order
pub fn accumulate_forces<F: PairForce + ?Sized>(law: &F, bodies: &[Body], out: &mut [NVec2]) {
    debug_assert_eq!(bodies.len(), out.len());

    for (i, total) in out.iter_mut().enumerate() {
        *total = NVec2::zeros();
        let on = &bodies[i];
        for (j, from) in bodies.iter().enumerate() {
            if i != j {
                *total += law.force(on, from);
            }
        }
    }
}
