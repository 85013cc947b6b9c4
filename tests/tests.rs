use std::sync::mpsc;
use std::time::Duration;

use nbody_actors::{
    bench_integrators, max_position_deviation, random_roster, run_parallel, run_parallel_with, run_sequential, run_sequential_with, solar_system_roster, Body, BodyRecord,
    BroadcastHub, ChannelConsumer, NVec2, NewtonianGravity, PairForce, Parameters, RunControl, Scenario, ScenarioConfig,
    SimError, SinkObserver, System,
};

/// Two bodies of mass `m`, `dist` apart on the x axis, at rest
pub fn two_body_system(dist: f64, m: f64) -> System {
    let a = Body::new(0, "a", NVec2::new(0.0, 0.0), NVec2::zeros(), m).unwrap();
    let b = Body::new(1, "b", NVec2::new(dist, 0.0), NVec2::zeros(), m).unwrap();
    System::new(vec![a, b])
}

/// Unit gravity, unit step
pub fn unit_params(steps: usize) -> Parameters {
    Parameters {
        steps,
        dt: 1.0,
        G: 1.0,
        softening: 1.0e-5,
        min_r2: 1.0e-10,
        seed: 7,
    }
}

pub fn gravity(p: &Parameters) -> NewtonianGravity {
    NewtonianGravity::from_params(p)
}

fn assert_close(a: f64, b: f64, rel: f64) {
    let scale = a.abs().max(b.abs()).max(1e-300);
    assert!((a - b).abs() <= rel * scale, "{a} != {b} (rel tol {rel})");
}

// ==================================================================================
// Body tests
// ==================================================================================

#[test]
fn body_rejects_non_positive_mass() {
    for m in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = Body::new(0, "bad", NVec2::zeros(), NVec2::zeros(), m).unwrap_err();
        assert!(matches!(err, SimError::InvalidMass { .. }), "mass {m} accepted");
    }
}

#[test]
fn reset_clears_accumulated_force() {
    let mut b = Body::new(0, "a", NVec2::zeros(), NVec2::zeros(), 2.0).unwrap();
    b.add_force(NVec2::new(4.0, -2.0));
    b.reset_force();
    b.add_force(NVec2::new(1.0, 1.0));
    assert_eq!(b.force(), NVec2::new(1.0, 1.0));
}

// ==================================================================================
// Force tests
// ==================================================================================

#[test]
fn force_is_equal_and_opposite() {
    let sys = two_body_system(3.0, 5.0);
    let law = gravity(&unit_params(1));

    let on_a = law.force(&sys.bodies[0], &sys.bodies[1]);
    let on_b = law.force(&sys.bodies[1], &sys.bodies[0]);

    assert_eq!(on_a, -on_b);
    assert!(on_a.x > 0.0, "force on a should point toward b");
}

#[test]
fn force_matches_softened_formula() {
    let sys = two_body_system(10.0, 10.0);
    let law = gravity(&unit_params(1));

    let f = law.force(&sys.bodies[0], &sys.bodies[1]);
    let expected = 1.0 * 10.0 * 10.0 / 100.0 * 10.0 / (10.0 + 1.0e-5);

    assert_close(f.x, expected, 1e-12);
    assert_eq!(f.y, 0.0);
}

#[test]
fn coincident_bodies_stay_finite() {
    let a = Body::new(0, "a", NVec2::new(1.0, 1.0), NVec2::zeros(), 1.0).unwrap();
    let b = Body::new(1, "b", NVec2::new(1.0, 1.0 + 1e-12), NVec2::zeros(), 1.0).unwrap();
    let law = gravity(&unit_params(1));

    let f = law.force(&a, &b);
    assert!(f.x.is_finite() && f.y.is_finite(), "force not clamped: {f:?}");
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn two_body_free_fall_sequential() {
    let p = unit_params(1);
    let report = run_sequential(two_body_system(10.0, 10.0), &gravity(&p), &p);
    let [a, b] = &report.system.bodies[..] else { panic!("expected two bodies") };

    assert_close(a.v.x, 0.1, 1e-5);
    assert_close(a.x.x, 0.1, 1e-5);
    assert_close(b.v.x, -0.1, 1e-5);
    assert_close(b.x.x, 10.0 - 0.1, 1e-5);
    assert_eq!(a.x.y, 0.0);
}

#[test]
fn two_body_free_fall_parallel() {
    let p = unit_params(1);
    let report = run_parallel(two_body_system(10.0, 10.0), &gravity(&p), &p).unwrap();
    let [a, b] = &report.system.bodies[..] else { panic!("expected two bodies") };

    assert_close(a.v.x, 0.1, 1e-5);
    assert_close(a.x.x, 0.1, 1e-5);
    assert_close(b.v.x, -0.1, 1e-5);
    assert_close(b.x.x, 9.9, 1e-5);
}

#[test]
fn lone_body_does_not_move() {
    let p = unit_params(10);
    let body = Body::new(0, "alone", NVec2::new(3.0, -4.0), NVec2::zeros(), 2.5).unwrap();

    let seq = run_sequential(System::new(vec![body.clone()]), &gravity(&p), &p);
    let par = run_parallel(System::new(vec![body.clone()]), &gravity(&p), &p).unwrap();

    for r in [&seq, &par] {
        assert_eq!(r.system.bodies[0].x, body.x);
        assert_eq!(r.system.bodies[0].v, body.v);
        assert_eq!(r.steps, 10);
    }
    assert_eq!(par.force_messages, 0);
    assert_eq!(par.step_reports, 10);
}

#[test]
fn sequential_and_parallel_agree() {
    let p = Parameters {
        steps: 5,
        ..Parameters::benchmark()
    };
    let sys = System::new(random_roster(24, 11).unwrap());
    let law = gravity(&p);

    let seq = run_sequential(sys.clone(), &law, &p);
    let par = run_parallel(sys, &law, &p).unwrap();

    assert_close(seq.system.t, par.system.t, 1e-12);
    for (s, q) in seq.system.bodies.iter().zip(par.system.bodies.iter()) {
        assert_eq!(s.id, q.id);
        assert_close(s.x.x, q.x.x, 1e-9);
        assert_close(s.x.y, q.x.y, 1e-9);
        assert_close(s.v.x, q.v.x, 1e-9);
        assert_close(s.v.y, q.v.y, 1e-9);
    }
}

#[test]
fn solar_system_agrees_across_integrators() {
    let p = Parameters {
        steps: 20,
        ..Parameters::solar()
    };
    let sys = System::new(solar_system_roster().unwrap());
    let law = gravity(&p);

    let seq = run_sequential(sys.clone(), &law, &p);
    let par = run_parallel(sys, &law, &p).unwrap();

    for (s, q) in seq.system.bodies.iter().zip(par.system.bodies.iter()) {
        assert_close(s.x.x, q.x.x, 1e-9);
        assert_close(s.x.y, q.x.y, 1e-9);
    }
}

// ==================================================================================
// Actor protocol tests
// ==================================================================================

#[test]
fn message_counts_per_step() {
    let p = Parameters {
        steps: 3,
        ..Parameters::benchmark()
    };
    let law = gravity(&p);

    for n in 0..=6 {
        let sys = System::new(random_roster(n, n as u64).unwrap());
        let report = run_parallel(sys, &law, &p).unwrap();

        assert_eq!(report.steps, 3);
        assert_eq!(report.force_messages, 3 * n * n.saturating_sub(1), "n = {n}");
        assert_eq!(report.step_reports, 3 * n, "n = {n}");
    }
}

#[test]
fn runs_exactly_the_requested_steps() {
    let p = unit_params(3);
    let mut rounds = Vec::new();

    let mut observer = |step: usize, bodies: &[Body]| {
        assert_eq!(bodies.len(), 2);
        rounds.push(step);
    };
    let report = run_parallel_with(two_body_system(10.0, 1.0), &gravity(&p), &p, RunControl::fixed(3), &mut observer).unwrap();

    assert_eq!(rounds, vec![0, 1, 2]);
    assert_eq!(report.steps, 3);
    assert_close(report.system.t, 3.0, 1e-12);
}

#[test]
fn zero_steps_spawns_and_joins_cleanly() {
    let p = unit_params(0);
    let report = run_parallel(two_body_system(10.0, 1.0), &gravity(&p), &p).unwrap();

    assert_eq!(report.steps, 0);
    assert_eq!(report.force_messages, 0);
    assert_eq!(report.system.bodies[1].x, NVec2::new(10.0, 0.0));
}

#[test]
fn continuous_run_stops_on_shutdown() {
    let p = unit_params(0);
    let (shutdown_tx, shutdown_rx) = mpsc::channel();

    let mut observer = |step: usize, _bodies: &[Body]| {
        if step == 4 {
            shutdown_tx.send(()).unwrap();
        }
    };
    let report = run_parallel_with(
        two_body_system(10.0, 1.0),
        &gravity(&p),
        &p,
        RunControl::continuous(shutdown_rx),
        &mut observer,
    )
    .unwrap();

    assert_eq!(report.steps, 5);
    assert_eq!(report.step_reports, 10);
}

#[test]
fn continuous_run_stops_when_shutdown_disconnects() {
    let p = unit_params(0);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    drop(shutdown_tx);

    let control = RunControl::continuous(shutdown_rx).with_frame_interval(Duration::from_millis(1));
    let report = run_sequential_with(two_body_system(10.0, 1.0), &gravity(&p), &p, control, &mut nbody_actors::NoopObserver);

    assert_eq!(report.steps, 0);
}

#[test]
fn frame_interval_only_paces() {
    let p = unit_params(0);
    let control = RunControl::fixed(3).with_frame_interval(Duration::from_millis(1));
    let report = run_parallel_with(two_body_system(10.0, 1.0), &gravity(&p), &p, control, &mut nbody_actors::NoopObserver).unwrap();

    assert_eq!(report.steps, 3);
    assert_eq!(report.force_messages, 6);
}

// ==================================================================================
// Scenario tests
// ==================================================================================

const TWO_BODY_YAML: &str = r#"
engine:
  integrator: "sequential"
parameters:
  steps: 1
  dt: 1.0
  G: 1.0
bodies:
  - { name: "a", x: [0.0, 0.0], v: [0.0, 0.0], m: 10.0 }
  - { name: "b", x: [10.0, 0.0], v: [0.0, 0.0], m: 10.0 }
"#;

#[test]
fn scenario_from_yaml_runs() {
    let cfg = ScenarioConfig::from_yaml_str(TWO_BODY_YAML).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();

    assert_eq!(scenario.parameters.softening, 1.0e-5);
    assert_eq!(scenario.parameters.min_r2, 1.0e-10);

    let control = scenario.control(None);
    let report = scenario.run(control, &mut nbody_actors::NoopObserver).unwrap();
    assert_close(report.system.bodies[0].x.x, 0.1, 1e-5);
}

#[test]
fn scenario_rejects_zero_mass() {
    let yaml = TWO_BODY_YAML.replace("m: 10.0 }\n  - { name: \"b\"", "m: 0.0 }\n  - { name: \"b\"");
    let cfg = ScenarioConfig::from_yaml_str(&yaml).unwrap();

    let err = Scenario::build_scenario(cfg).unwrap_err();
    assert!(matches!(err, SimError::InvalidMass { ref name, .. } if name == "a"));
}

#[test]
fn scenario_rejects_bad_dt() {
    let p = Parameters {
        dt: 0.0,
        ..Parameters::benchmark()
    };
    let err = Scenario::random(3, p).unwrap_err();
    assert!(matches!(err, SimError::InvalidParameter { name: "dt", .. }));
}

#[test]
fn scenario_rejects_duplicate_names() {
    let yaml = TWO_BODY_YAML.replace("name: \"b\"", "name: \"a\"");
    let cfg = ScenarioConfig::from_yaml_str(&yaml).unwrap();

    let err = Scenario::build_scenario(cfg).unwrap_err();
    assert!(matches!(err, SimError::DuplicateBody { ref name } if name == "a"));
}

#[test]
fn scenario_rejects_non_finite_state() {
    let yaml = TWO_BODY_YAML.replace("x: [10.0, 0.0]", "x: [.nan, 0.0]");
    let cfg = ScenarioConfig::from_yaml_str(&yaml).unwrap();
    let err = Scenario::build_scenario(cfg).unwrap_err();
    assert!(matches!(err, SimError::NonFiniteState { ref name, field: "position" } if name == "b"));

    let err = Body::new(0, "fast", NVec2::zeros(), NVec2::new(0.0, f64::INFINITY), 1.0).unwrap_err();
    assert!(matches!(err, SimError::NonFiniteState { field: "velocity", .. }));
}

// ==================================================================================
// Benchmark tests
// ==================================================================================

#[test]
fn bench_reports_every_roster_size() {
    let p = Parameters {
        steps: 2,
        ..Parameters::benchmark()
    };
    let results = bench_integrators(&[0, 1, 8, 16], &p).unwrap();

    assert_eq!(results.iter().map(|r| r.n).collect::<Vec<_>>(), vec![0, 1, 8, 16]);
    for r in &results {
        assert_eq!(r.steps, 2);
        assert!(r.sequential_ms >= 0.0 && r.parallel_ms >= 0.0);
        assert!(r.max_deviation <= 1e-9, "n = {}: deviation {}", r.n, r.max_deviation);
    }
}

#[test]
fn bench_rejects_invalid_parameters() {
    let p = Parameters {
        dt: -1.0,
        ..Parameters::benchmark()
    };
    assert!(bench_integrators(&[4], &p).is_err());
}

#[test]
fn position_deviation_is_the_largest_offset() {
    let a = two_body_system(10.0, 1.0).bodies;
    let mut b = a.clone();
    b[0].x += NVec2::new(3.0, 4.0);
    b[1].x += NVec2::new(0.0, -1.0);

    assert_eq!(max_position_deviation(&a, &a), 0.0);
    assert_close(max_position_deviation(&a, &b), 5.0, 1e-12);
    assert_eq!(max_position_deviation(&[], &[]), 0.0);
}

// ==================================================================================
// Broadcast tests
// ==================================================================================

#[test]
fn sink_receives_one_record_per_body_per_step() {
    let hub = BroadcastHub::spawn().unwrap();
    let (tx, rx) = mpsc::channel();
    hub.handle().register(Box::new(ChannelConsumer::new(tx)));

    let p = unit_params(3);
    let mut sink = SinkObserver::new(hub.handle());
    run_parallel_with(two_body_system(10.0, 1.0), &gravity(&p), &p, RunControl::fixed(3), &mut sink).unwrap();
    hub.shutdown();

    let records: Vec<BodyRecord> = rx.iter().map(|s| serde_json::from_str(&s).unwrap()).collect();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].name, "a");
    assert_eq!(records[1].name, "b");
    assert!(records[4].x > 0.0 && records[5].x < 10.0);
}

#[test]
fn solar_scenario_uses_si_constants() {
    let scenario = Scenario::solar_system(Parameters::solar()).unwrap();

    assert_eq!(scenario.system.len(), 10);
    assert_eq!(scenario.law.G, 6.674e-11);
    assert_eq!(scenario.system.bodies[0].name, "sol");
    assert!(scenario.system.bodies.iter().all(|b| b.mass() > 0.0));
}
