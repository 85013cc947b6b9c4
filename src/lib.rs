pub mod simulation;
pub mod configuration;
pub mod broadcast;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Body, System, NVec2};
pub use simulation::params::Parameters;
pub use simulation::forces::{PairForce, NewtonianGravity, accumulate_forces};
pub use simulation::integrator::{euler_integrator, run_sequential, run_sequential_with};
pub use simulation::actors::{run_parallel, run_parallel_with};
pub use simulation::scenario::{Scenario, random_roster, solar_system_roster};
pub use simulation::{NoopObserver, RunControl, RunReport, StepObserver};

pub use configuration::config::{IntegratorConfig, ModeConfig, EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig};

pub use broadcast::consumer::{ChannelConsumer, Consumer, ConsumerId, DeliveryError, WriterConsumer};
pub use broadcast::hub::{BroadcastHub, HubHandle};
pub use broadcast::record::{BodyRecord, SinkObserver};

pub use benchmark::benchmark::{bench_integrators, max_position_deviation, print_bench_csv, BenchResult};

pub use error::SimError;
