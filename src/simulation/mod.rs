pub mod states;
pub mod params;
pub mod forces;
pub mod integrator;
pub mod actors;
pub mod engine;
pub mod scenario;

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use states::{Body, System};

/// Receives the canonical roster after every completed step
pub trait StepObserver {
    fn on_step(&mut self, step: usize, bodies: &[Body]);
}

impl<F> StepObserver for F
where
    F: FnMut(usize, &[Body]),
{
    fn on_step(&mut self, step: usize, bodies: &[Body]) {
        self(step, bodies)
    }
}

/// Observer that ignores every step
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&mut self, _step: usize, _bodies: &[Body]) {}
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub system: System, // final state
    pub steps: usize, // completed steps
    pub force_messages: usize, // force messages routed to actors, 0 for sequential
    pub step_reports: usize, // step-complete reports collected, 0 for sequential
}

/// When a run stops issuing steps
///
/// `frame_interval` only paces a continuous run between barriers, it is never
/// used to wait for actors
#[derive(Debug, Default)]
pub struct RunControl {
    pub steps: Option<usize>, // None runs until shutdown
    pub frame_interval: Option<Duration>, // pause between completed steps
    pub shutdown: Option<Receiver<()>>, // a message or disconnect stops the run
}

impl RunControl {
    /// Batch run of exactly `steps` rounds
    pub fn fixed(steps: usize) -> Self {
        Self {
            steps: Some(steps),
            ..Default::default()
        }
    }

    /// Unbounded run that ends when `shutdown` fires or disconnects
    pub fn continuous(shutdown: Receiver<()>) -> Self {
        Self {
            steps: None,
            frame_interval: None,
            shutdown: Some(shutdown),
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    pub fn with_step_limit(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Decide whether another round starts after `completed` rounds
    pub(crate) fn proceed(&self, completed: usize) -> bool {
        if self.steps.is_some_and(|limit| completed >= limit) {
            return false;
        }

        // No pacing before the first round
        let pause = if completed == 0 { None } else { self.frame_interval };

        match (&self.shutdown, pause) {
            (Some(rx), Some(d)) => matches!(rx.recv_timeout(d), Err(RecvTimeoutError::Timeout)),
            (Some(rx), None) => matches!(rx.try_recv(), Err(TryRecvError::Empty)),
            (None, Some(d)) => {
                thread::sleep(d);
                true
            }
            (None, None) => true,
        }
    }
}

