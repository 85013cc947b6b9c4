use nbody_actors::{bench_integrators, print_bench_csv, BroadcastHub, ModeConfig, NoopObserver, Parameters, Scenario, ScenarioConfig, SinkObserver, WriterConsumer};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

#[derive(Parser, Debug)]
#[command(name = "nbody_actors")]
#[command(version)]
#[command(about = "Gravitational n-body dynamics, sequential and actor-per-body")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Time both integrators on random rosters
    Bench {
        /// Roster sizes (comma-separated)
        #[arg(long, default_value = "100,250,500", value_delimiter = ',')]
        bodies: Vec<usize>,

        /// Steps per run
        #[arg(long, default_value = "3")]
        steps: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Run a scenario for its configured step count and log the final state
    Run {
        /// Scenario file, or a name under scenarios/
        #[arg(short, long = "file", default_value = "two_body.yaml")]
        file_name: String,
    },

    /// Stream a scenario as JSON lines on stdout until stdin closes or reads `q`
    Live {
        #[arg(short, long = "file", default_value = "solar_system.yaml")]
        file_name: String,

        /// Stop after this many steps
        #[arg(long)]
        max_steps: Option<usize>,
    },
}

// scenario names resolve against ./scenarios unless they already point at a file
fn load_scenario(file_name: &str) -> Result<Scenario> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.is_file() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let cfg = ScenarioConfig::from_yaml_file(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;
    let scenario = Scenario::build_scenario(cfg).context("invalid scenario")?;

    Ok(scenario)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Bench { bodies, steps, seed } => {
            let params = Parameters {
                steps,
                seed,
                ..Parameters::benchmark()
            };
            let results = bench_integrators(&bodies, &params)?;
            print_bench_csv(&results);
        }

        Commands::Run { file_name } => {
            let scenario = load_scenario(&file_name)?;
            let control = scenario.control(None);
            let report = scenario.run(control, &mut NoopObserver)?;

            info!(steps = report.steps, t = report.system.t, messages = report.force_messages, "run complete");
            for b in &report.system.bodies {
                info!(name = %b.name, x = b.x.x, y = b.x.y, vx = b.v.x, vy = b.v.y, "final state");
            }
        }

        Commands::Live { file_name, max_steps } => {
            let mut scenario = load_scenario(&file_name)?;
            scenario.engine.mode = ModeConfig::Live;

            let hub = BroadcastHub::spawn()?;
            hub.handle().register(Box::new(WriterConsumer::new(io::stdout())));

            // stdin closing or a `q` line is the shutdown signal
            let (shutdown_tx, shutdown_rx) = mpsc::channel();
            thread::Builder::new()
                .name("stdin-watch".to_string())
                .spawn(move || {
                    for line in io::stdin().lock().lines() {
                        match line {
                            Ok(l) if l.trim() != "q" => continue,
                            _ => break,
                        }
                    }
                    let _ = shutdown_tx.send(());
                })?;

            let mut control = scenario.control(Some(shutdown_rx));
            if let Some(limit) = max_steps {
                control = control.with_step_limit(limit);
            }

            let mut sink = SinkObserver::new(hub.handle());
            let report = scenario.run(control, &mut sink)?;
            hub.shutdown();

            info!(steps = report.steps, t = report.system.t, "live run stopped");
        }
    }

    Ok(())
}
