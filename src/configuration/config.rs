//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – which integrator runs and whether the run is batch or live
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "parallel"  # or "sequential"
//!   mode: "batch"           # or "live"
//!   frame_interval_ms: 100  # live mode pacing, optional
//!
//! parameters:
//!   steps: 3                # batch step count
//!   dt: 1.0                 # step size
//!   G: 1.0                  # gravitational constant
//!   softening: 1.0e-5       # added to the pair distance, optional
//!   min_r2: 1.0e-10         # squared distance floor, optional
//!   seed: 42                # seed for generated rosters, optional
//!
//! bodies:
//!   - name: "a"
//!     x: [ 0.0, 0.0 ]
//!     v: [ 0.0, 0.0 ]
//!     m: 10.0
//!   - name: "b"
//!     x: [ 10.0, 0.0 ]
//!     v: [ 0.0, 0.0 ]
//!     m: 10.0
//! ```
//!
//! `Scenario::build_scenario` maps this into runtime types and validates it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::SimError;

/// Which integrator advances the roster
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "sequential")] // single thread, direct n^2 sum
    Sequential,

    #[serde(rename = "parallel")] // one actor per body behind a step barrier
    Parallel,
}

/// Batch runs stop after `steps`, live runs stream until shut down
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeConfig {
    #[default]
    #[serde(rename = "batch")]
    Batch,

    #[serde(rename = "live")]
    Live,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // how steps are computed
    #[serde(default)]
    pub mode: ModeConfig, // batch or live
    #[serde(default)]
    pub frame_interval_ms: Option<u64>, // pause between live steps
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub steps: usize, // number of steps in batch mode
    pub dt: f64, // time step size
    pub G: f64, // gravitational constant
    #[serde(default = "default_softening")]
    pub softening: f64, // additive epsilon on the pair distance
    #[serde(default = "default_min_r2")]
    pub min_r2: f64, // floor on the squared pair distance
    #[serde(default)]
    pub seed: u64, // deterministic seed to make runs reproducible
}

fn default_softening() -> f64 {
    1.0e-5
}

fn default_min_r2() -> f64 {
    1.0e-10
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: String, // label carried into broadcast records
    pub x: [f64; 2], // initial position
    pub v: [f64; 2], // initial velocity
    pub m: f64, // mass, must be positive
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // integrator and run mode
    pub parameters: ParametersConfig, // numerical and physical parameters
    pub bodies: Vec<BodyConfig>, // initial roster
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, SimError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }
}
