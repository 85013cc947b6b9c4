use std::time::Instant;

use crate::error::SimError;
use crate::simulation::actors::run_parallel;
use crate::simulation::forces::NewtonianGravity;
use crate::simulation::integrator::run_sequential;
use crate::simulation::params::Parameters;
use crate::simulation::scenario::random_roster;
use crate::simulation::states::{Body, System};

/// Timing of both integrators on one roster size
#[derive(Debug, Clone)]
pub struct BenchResult {
    pub n: usize,
    pub steps: usize,
    pub sequential_ms: f64,
    pub parallel_ms: f64,
    pub max_deviation: f64, // largest |x_seq - x_par| over all bodies
}

/// Time the sequential and actor integrators on identical random rosters
pub fn bench_integrators(ns: &[usize], params: &Parameters) -> Result<Vec<BenchResult>, SimError> {
    params.validate()?;
    let law = NewtonianGravity::from_params(params);
    let mut results = Vec::with_capacity(ns.len());

    for &n in ns {
        let template = System::new(random_roster(n, params.seed)?);

        // Sequential
        let t0 = Instant::now();
        let seq = run_sequential(template.clone(), &law, params);
        let sequential_ms = t0.elapsed().as_secs_f64() * 1000.0;

        // Actor per body
        let t1 = Instant::now();
        let par = run_parallel(template, &law, params)?;
        let parallel_ms = t1.elapsed().as_secs_f64() * 1000.0;

        let max_deviation = max_position_deviation(&seq.system.bodies, &par.system.bodies);

        results.push(BenchResult {
            n,
            steps: params.steps,
            sequential_ms,
            parallel_ms,
            max_deviation,
        });
    }

    Ok(results)
}

/// Largest position difference between two rosters of the same bodies
pub fn max_position_deviation(a: &[Body], b: &[Body]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| (p.x - q.x).norm())
        .fold(0.0, f64::max)
}

/// Print results as csv, paste straight into a spreadsheet
pub fn print_bench_csv(results: &[BenchResult]) {
    println!("N,steps,sequential_ms,parallel_ms,max_deviation");
    for r in results {
        println!("{},{},{:.6},{:.6},{:e}", r.n, r.steps, r.sequential_ms, r.parallel_ms, r.max_deviation);
    }
}
