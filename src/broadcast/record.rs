//! Per-body records published after every step

use serde::{Deserialize, Serialize};

use crate::simulation::states::Body;
use crate::simulation::StepObserver;

use super::hub::HubHandle;

/// `{"x": .., "y": .., "name": ..}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

impl BodyRecord {
    pub fn from_body(body: &Body) -> Self {
        Self {
            x: body.x.x,
            y: body.x.y,
            name: body.name.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Step observer that publishes one record per body per step
pub struct SinkObserver {
    hub: HubHandle,
}

impl SinkObserver {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }
}

impl StepObserver for SinkObserver {
    fn on_step(&mut self, _step: usize, bodies: &[Body]) {
        for body in bodies {
            match BodyRecord::from_body(body).to_json() {
                Ok(json) => self.hub.publish(json),
                Err(err) => tracing::warn!(body = %body.name, %err, "unable to encode record"),
            }
        }
    }
}
