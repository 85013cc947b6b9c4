//! Error type for the simulation kernel.

use thiserror::Error;

/// Recoverable errors raised while building or running a simulation.
///
/// Barrier protocol violations are not represented here; they indicate a
/// topology mismatch and panic inside the kernel.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("body `{name}` has non-positive or non-finite mass {mass}")]
    InvalidMass { name: String, mass: f64 },

    #[error("body `{name}` has a non-finite {field}")]
    NonFiniteState { name: String, field: &'static str },

    #[error("body name `{name}` appears more than once in the roster")]
    DuplicateBody { name: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("unable to read scenario file")]
    ScenarioIo(#[from] std::io::Error),

    #[error("unable to parse scenario file")]
    ScenarioParse(#[from] serde_yaml::Error),

    #[error("failed to spawn actor thread for body `{name}`")]
    ActorSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn the broadcast coordinator thread")]
    HubSpawn(#[source] std::io::Error),
}
