//! High-level runtime engine settings
//!
//! Selects the integrator and the run mode used when running a `Scenario`

use std::time::Duration;

use crate::configuration::config::{IntegratorConfig, ModeConfig};

#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorConfig, // sequential or parallel
    pub mode: ModeConfig, // batch or live
    pub frame_interval: Option<Duration>, // live pacing between steps
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::Parallel,
            mode: ModeConfig::Batch,
            frame_interval: None,
        }
    }
}
