//! Sequential reference integrator
//!
//! Single-threaded explicit Euler with a direct O(n^2) force sum. This is the
//! baseline the actor integrator in `actors` is checked against

use tracing::{debug, info};

use super::forces::{accumulate_forces, PairForce};
use super::params::Parameters;
use super::states::{NVec2, System};
use super::{NoopObserver, RunControl, RunReport, StepObserver};

/// Advance the system by one step using explicit Euler
/// All forces are computed from the current positions before any body moves
pub fn euler_integrator<F: PairForce + ?Sized>(sys: &mut System, law: &F, params: &Parameters, scratch: &mut Vec<NVec2>) {
    let n = sys.bodies.len();
    if n == 0 { // no bodies, only time advances
        sys.t += params.dt;
        return;
    }

    scratch.resize(n, NVec2::zeros());

    // Pass 1: forces at x_n, nothing is mutated yet
    accumulate_forces(law, &sys.bodies, scratch);

    // Pass 2: v_n+1 = v_n + dt F/m, x_n+1 = x_n + dt v_n+1
    for (b, f) in sys.bodies.iter_mut().zip(scratch.iter()) {
        b.reset_force();
        b.add_force(*f);
        b.integrate(params.dt);
    }

    sys.t += params.dt;
}

/// Run `params.steps` steps on a single thread
pub fn run_sequential<F: PairForce + ?Sized>(sys: System, law: &F, params: &Parameters) -> RunReport {
    run_sequential_with(sys, law, params, RunControl::fixed(params.steps), &mut NoopObserver)
}

/// Run until `control` stops, reporting every completed step to `observer`
pub fn run_sequential_with<F, O>(mut sys: System, law: &F, params: &Parameters, control: RunControl, observer: &mut O) -> RunReport
where
    F: PairForce + ?Sized,
    O: StepObserver + ?Sized,
{
    info!(bodies = sys.len(), steps = ?control.steps, dt = params.dt, "starting sequential run");

    let mut scratch = Vec::with_capacity(sys.len());
    let mut completed = 0;
    while control.proceed(completed) {
        euler_integrator(&mut sys, law, params, &mut scratch);
        debug!(step = completed, t = sys.t, "sequential step complete");
        observer.on_step(completed, &sys.bodies);
        completed += 1;
    }

    info!(steps = completed, t = sys.t, "sequential run finished");

    RunReport {
        system: sys,
        steps: completed,
        force_messages: 0,
        step_reports: 0,
    }
}
