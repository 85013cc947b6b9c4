//! Actor-per-body parallel integrator
//!
//! Every body gets its own thread and a private inbox sized to exactly the
//! `N - 1` force messages it receives per step. A single dispatcher (the
//! calling thread) owns the canonical roster and drives a generation barrier:
//!
//! 1. release every actor with `Control::Advance` (rendezvous, one per actor)
//! 2. fan out `N (N - 1)` pairwise forces, `N - 1` into each inbox
//! 3. each actor sums its inbox, integrates itself and sends a `StepReport`
//! 4. the dispatcher collects exactly `N` reports before the next release
//!
//! No actor can start accumulating step `k + 1` before the dispatcher has seen
//! every report of step `k`, because the next `Advance` is only sent then.
//! Between barriers each actor owns its body exclusively, so nothing is locked.
//!
//! Count mismatches are topology bugs and panic in the dispatcher. When the
//! dispatcher unwinds, the pool drops every channel and joins the actors.

use std::any::Any;
use std::panic;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, trace};

use crate::error::SimError;

use super::forces::PairForce;
use super::params::Parameters;
use super::states::{Body, NVec2, System};
use super::{NoopObserver, RunControl, RunReport, StepObserver};

/// Barrier signal sent from the dispatcher to one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Advance,
    Stop,
}

/// Published by an actor once its body has integrated the current step
#[derive(Debug)]
struct StepReport {
    index: usize, // slot in the canonical roster
    step: usize, // step the actor believes it finished
    received: usize, // force messages consumed this step
    stale: usize, // messages still queued after the expected count
    body: Body, // fully updated state
}

/// Thread-side state of one body
struct BodyActor {
    index: usize,
    body: Body,
    expected: usize, // N - 1
    dt: f64,
    inbox: Receiver<NVec2>,
    control: Receiver<Control>,
    reports: SyncSender<StepReport>,
}

impl BodyActor {
    /// Actor loop, returns the number of steps it completed
    fn run(mut self) -> usize {
        let mut step = 0;

        loop {
            match self.control.recv() {
                Ok(Control::Advance) => {}
                Ok(Control::Stop) | Err(_) => return step,
            }

            // Scratch is per step, never carried over
            self.body.reset_force();

            let mut received = 0;
            while received < self.expected {
                match self.inbox.recv() {
                    Ok(f) => {
                        self.body.add_force(f);
                        received += 1;
                    }
                    // Dispatcher is gone, nothing left to integrate against
                    Err(_) => return step,
                }
            }

            // Anything still queued belongs to no step at all
            let mut stale = 0;
            while self.inbox.try_recv().is_ok() {
                stale += 1;
            }

            self.body.integrate(self.dt);
            trace!(body = %self.body.name, step, received, "actor integrated");

            let report = StepReport {
                index: self.index,
                step,
                received,
                stale,
                body: self.body.clone(),
            };
            if self.reports.send(report).is_err() {
                return step;
            }
            step += 1;
        }
    }
}

/// Dispatcher-side handles to every actor
struct ActorPool {
    inboxes: Vec<SyncSender<NVec2>>,
    controls: Vec<SyncSender<Control>>,
    handles: Vec<JoinHandle<usize>>,
}

impl ActorPool {
    /// Spawn one actor per body, all reporting into `reports`
    fn spawn(bodies: &[Body], dt: f64, reports: &SyncSender<StepReport>) -> Result<Self, SimError> {
        let n = bodies.len();
        let expected = n.saturating_sub(1);

        let mut pool = Self {
            inboxes: Vec::with_capacity(n),
            controls: Vec::with_capacity(n),
            handles: Vec::with_capacity(n),
        };

        for (index, body) in bodies.iter().enumerate() {
            // Exactly one step's worth of forces fits, the dispatcher never blocks on a drained inbox
            let (inbox_tx, inbox_rx) = mpsc::sync_channel(expected);
            // Rendezvous: the send completes only once the actor has taken it
            let (control_tx, control_rx) = mpsc::sync_channel(0);

            let actor = BodyActor {
                index,
                body: body.clone(),
                expected,
                dt,
                inbox: inbox_rx,
                control: control_rx,
                reports: reports.clone(),
            };

            // On error `pool` drops here, which closes and joins the actors spawned so far
            let handle = thread::Builder::new()
                .name(format!("body-{}", body.name))
                .spawn(move || actor.run())
                .map_err(|source| SimError::ActorSpawn {
                    name: body.name.clone(),
                    source,
                })?;

            pool.inboxes.push(inbox_tx);
            pool.controls.push(control_tx);
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    /// Release every actor into the next step
    fn advance(&mut self) {
        for index in 0..self.controls.len() {
            if self.controls[index].send(Control::Advance).is_err() {
                self.actor_lost(index);
            }
        }
    }

    fn send_force(&mut self, index: usize, f: NVec2) {
        if self.inboxes[index].send(f).is_err() {
            self.actor_lost(index);
        }
    }

    /// Stop every actor and wait for it, returning each actor's step count
    fn shutdown(mut self) -> Vec<usize> {
        for control in &self.controls {
            // A dead actor is reported through its join handle below
            let _ = control.send(Control::Stop);
        }
        self.inboxes.clear();
        self.controls.clear();

        let handles = std::mem::take(&mut self.handles);
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| resume(payload)))
            .collect()
    }

    /// An actor hung up mid-protocol, surface its panic if it had one
    fn actor_lost(&mut self, index: usize) -> ! {
        self.inboxes.clear();
        self.controls.clear();

        let handle = self.handles.remove(index);
        match handle.join() {
            Err(payload) => resume(payload),
            Ok(step) => panic!("actor {index} exited after {step} steps while the run was still active"),
        }
    }
}

impl Drop for ActorPool {
    fn drop(&mut self) {
        // Closing both channels unblocks every actor wherever it is suspended
        self.inboxes.clear();
        self.controls.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn resume(payload: Box<dyn Any + Send>) -> ! {
    panic::resume_unwind(payload)
}

/// Panics unless `report` is the first, well-formed report of its body for `step`
fn check_report(report: &StepReport, step: usize, expected: usize, seen: &mut [bool]) {
    assert_eq!(report.step, step, "body {} reported step {} during step {step}", report.index, report.step);
    assert_eq!(report.received, expected, "body {} consumed {} force messages, expected {expected}", report.index, report.received);
    assert_eq!(report.stale, 0, "body {} had {} extra force messages in step {step}", report.index, report.stale);
    assert!(!seen[report.index], "body {} reported twice in step {step}", report.index);
    seen[report.index] = true;
}

/// Run `params.steps` lockstep rounds with one actor per body
pub fn run_parallel<F: PairForce + ?Sized>(sys: System, law: &F, params: &Parameters) -> Result<RunReport, SimError> {
    run_parallel_with(sys, law, params, RunControl::fixed(params.steps), &mut NoopObserver)
}

/// Run with explicit stop conditions, reporting every completed barrier to `observer`
///
/// `control.steps` overrides `params.steps`. The call returns only after every
/// actor thread has exited.
pub fn run_parallel_with<F, O>(
    sys: System,
    law: &F,
    params: &Parameters,
    control: RunControl,
    observer: &mut O,
) -> Result<RunReport, SimError>
where
    F: PairForce + ?Sized,
    O: StepObserver + ?Sized,
{
    let System { mut bodies, mut t } = sys;
    let n = bodies.len();
    let expected = n.saturating_sub(1);

    info!(bodies = n, steps = ?control.steps, dt = params.dt, "starting actor run");

    // Buffered for one full generation so no actor blocks on its report
    let (report_tx, report_rx) = mpsc::sync_channel::<StepReport>(n.max(1));
    let mut pool = ActorPool::spawn(&bodies, params.dt, &report_tx)?;
    drop(report_tx);

    let mut completed = 0;
    let mut force_messages = 0;
    let mut step_reports = 0;

    while control.proceed(completed) {
        pool.advance();

        // Fan-out against the positions of the previous barrier
        let mut sent = 0;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let f = law.force(&bodies[i], &bodies[j]);
                    pool.send_force(i, f);
                    sent += 1;
                }
            }
        }
        assert_eq!(sent, n * expected, "fan-out produced {sent} messages for {n} bodies");

        // Barrier: exactly one report per body
        let mut seen = vec![false; n];
        let mut received = 0;
        for _ in 0..n {
            let report = report_rx
                .recv()
                .unwrap_or_else(|_| panic!("all actors hung up during step {completed}"));

            check_report(&report, completed, expected, &mut seen);
            received += report.received;
            bodies[report.index] = report.body;
        }

        force_messages += received;
        step_reports += n;
        t += params.dt;

        debug!(step = completed, t, messages = received, "barrier cleared");
        observer.on_step(completed, &bodies);
        completed += 1;
    }

    let actor_steps = pool.shutdown();
    for (index, steps) in actor_steps.iter().enumerate() {
        assert_eq!(*steps, completed, "body {index} completed {steps} steps, dispatcher completed {completed}");
    }

    info!(steps = completed, t, force_messages, "actor run finished");

    Ok(RunReport {
        system: System { bodies, t },
        steps: completed,
        force_messages,
        step_reports,
    })
}
