//! Build fully-initialized simulation scenarios
//!
//! A `Scenario` is the runtime bundle both integrators consume:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - system state (`System` with bodies at t = 0)
//! - the pairwise force law (`NewtonianGravity`)
//!
//! Rosters come from a YAML `ScenarioConfig`, from a seeded random generator
//! (benchmark), or from the built-in solar system (live demo)

use std::collections::HashSet;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{BodyConfig, IntegratorConfig, ModeConfig, ScenarioConfig};
use crate::error::SimError;
use crate::simulation::actors::run_parallel_with;
use crate::simulation::engine::Engine;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::run_sequential_with;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, System};
use crate::simulation::{RunControl, RunReport, StepObserver};

/// Name, mass (kg), orbital radius (m) and orbital speed (m/s) on the +x axis
const SOLAR_SYSTEM: [(&str, f64, f64, f64); 10] = [
    ("sol", 1.989e30, 0.0, 0.0),
    ("mercurio", 3.301e23, 5.79e10, 47362.0),
    ("venus", 4.867e24, 1.082e11, 35020.0),
    ("tierra", 5.972e24, 1.496e11, 29783.0),
    ("marte", 6.39e23, 2.279e11, 24077.0),
    ("jupiter", 1.898e27, 7.785e11, 13060.0),
    ("saturno", 5.683e26, 1.434e12, 9680.0),
    ("urano", 8.681e25, 2.871e12, 6810.0),
    ("neptuno", 1.024e26, 4.498e12, 5430.0),
    ("pluton", 1.303e22, 5.906e12, 4748.0),
];

#[derive(Debug, Clone)]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub system: System,
    pub law: NewtonianGravity,
}

impl Scenario {
    /// Validate a loaded configuration and map it onto runtime types
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        // Bodies: map `BodyConfig` -> runtime `Body`, rejecting bad masses
        let bodies = cfg
            .bodies
            .iter()
            .enumerate()
            .map(|(id, bc): (usize, &BodyConfig)| {
                Body::new(id, bc.name.clone(), NVec2::new(bc.x[0], bc.x[1]), NVec2::new(bc.v[0], bc.v[1]), bc.m)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            steps: p_cfg.steps,
            dt: p_cfg.dt,
            G: p_cfg.G,
            softening: p_cfg.softening,
            min_r2: p_cfg.min_r2,
            seed: p_cfg.seed,
        };

        let e_cfg = cfg.engine;
        let engine = Engine {
            integrator: e_cfg.integrator,
            mode: e_cfg.mode,
            frame_interval: e_cfg.frame_interval_ms.map(Duration::from_millis),
        };

        Self::new(engine, parameters, bodies)
    }

    /// Random roster of `n` bodies with the benchmark constants
    pub fn random(n: usize, parameters: Parameters) -> Result<Self, SimError> {
        let bodies = random_roster(n, parameters.seed)?;
        Self::new(Engine::default(), parameters, bodies)
    }

    /// The ten-body solar system with SI constants
    pub fn solar_system(parameters: Parameters) -> Result<Self, SimError> {
        Self::new(Engine::default(), parameters, solar_system_roster()?)
    }

    pub fn new(engine: Engine, parameters: Parameters, bodies: Vec<Body>) -> Result<Self, SimError> {
        parameters.validate()?;

        // Names are the only identity a broadcast record carries
        let mut names = HashSet::with_capacity(bodies.len());
        if let Some(dup) = bodies.iter().find(|b| !names.insert(b.name.as_str())) {
            return Err(SimError::DuplicateBody { name: dup.name.clone() });
        }

        let law = NewtonianGravity::from_params(&parameters);

        Ok(Self {
            engine,
            parameters,
            system: System::new(bodies),
            law,
        })
    }

    /// Run with the configured integrator until `control` stops
    pub fn run<O: StepObserver + ?Sized>(self, control: RunControl, observer: &mut O) -> Result<RunReport, SimError> {
        let Scenario {
            engine,
            parameters,
            system,
            law,
        } = self;

        match engine.integrator {
            IntegratorConfig::Sequential => Ok(run_sequential_with(system, &law, &parameters, control, observer)),
            IntegratorConfig::Parallel => run_parallel_with(system, &law, &parameters, control, observer),
        }
    }

    /// Run control implied by the engine mode
    /// - batch: `parameters.steps`
    /// - live: until `shutdown` fires, paced by `frame_interval`
    pub fn control(&self, shutdown: Option<Receiver<()>>) -> RunControl {
        match self.engine.mode {
            ModeConfig::Batch => RunControl {
                steps: Some(self.parameters.steps),
                frame_interval: None,
                shutdown,
            },
            ModeConfig::Live => RunControl {
                steps: None,
                frame_interval: self.engine.frame_interval,
                shutdown,
            },
        }
    }
}

/// `n` bodies with mass in [1, 11), position in [0, 100)^2 and zero velocity
pub fn random_roster(n: usize, seed: u64) -> Result<Vec<Body>, SimError> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n)
        .map(|id| {
            let m = rng.random_range(1.0..11.0);
            let x = NVec2::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0));
            Body::new(id, format!("body-{id}"), x, NVec2::zeros(), m)
        })
        .collect()
}

/// Sun and nine planets lined up on +x, each moving in +y
pub fn solar_system_roster() -> Result<Vec<Body>, SimError> {
    SOLAR_SYSTEM
        .iter()
        .enumerate()
        .map(|(id, &(name, m, r, speed))| Body::new(id, name, NVec2::new(r, 0.0), NVec2::new(0.0, speed), m))
        .collect()
}
