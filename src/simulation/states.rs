//! Core state types for the N-body simulation.
//!
//! Defines the 2D body/system structs:
//! - `NVec2` the value type used for positions, velocities and forces
//! - `Body` a single point mass with its per-step force scratch
//! - `System` the roster of bodies and the current simulation time `t`

use nalgebra::Vector2;

use crate::error::SimError;

pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: usize, // stable index within the roster
    pub name: String, // label used when broadcasting
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    m: f64, // mass, always > 0
    force: NVec2, // accumulated force for the current step
}

impl Body {
    /// Create a body, rejecting masses that would fault the `F / m` division
    /// and non-finite state that would poison every other body after one step
    pub fn new(id: usize, name: impl Into<String>, x: NVec2, v: NVec2, m: f64) -> Result<Self, SimError> {
        let name = name.into();
        if !(m.is_finite() && m > 0.0) {
            return Err(SimError::InvalidMass { name, mass: m });
        }
        if !x.iter().all(|c| c.is_finite()) {
            return Err(SimError::NonFiniteState { name, field: "position" });
        }
        if !v.iter().all(|c| c.is_finite()) {
            return Err(SimError::NonFiniteState { name, field: "velocity" });
        }

        Ok(Self {
            id,
            name,
            x,
            v,
            m,
            force: NVec2::zeros(),
        })
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    /// Force accumulated so far in the current step
    pub fn force(&self) -> NVec2 {
        self.force
    }

    /// Clear the force scratch, must happen before the first contribution of a step
    pub fn reset_force(&mut self) {
        self.force = NVec2::zeros();
    }

    pub fn add_force(&mut self, f: NVec2) {
        self.force += f;
    }

    /// Explicit Euler update from the accumulated force
    /// a = F / m, v += a dt, x += v dt
    pub fn integrate(&mut self, dt: f64) {
        let a = self.force / self.m;
        self.v += a * dt;
        self.x += self.v * dt;
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // roster
    pub t: f64, // time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
