use spatsim::{ScenarioConfig, Scenario, StepReport};
use spatsim::{bench_neighbors, bench_forces, bench_steps};

use clap::Parser;
use anyhow::{Context, Result};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "cluster.yaml")]
    file_name: String,

    /// Number of steps, defaults to t_end / h0
    #[arg(long)]
    steps: Option<usize>,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    log::debug!("{scenario_cfg:?}");

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_neighbors()?;
        bench_forces()?;
        bench_steps()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;

    let steps = args.steps.unwrap_or_else(|| scenario.parameters.step_count());
    let log_every = (steps / 10).max(1);

    let mut total = StepReport::new();
    for n in 0..steps {
        let report = scenario.step();
        total.merge(&report);

        if (n + 1) % log_every == 0 {
            log::info!(
                "step {:6} t = {:8.4} KE = {:12.6e} skipped pairs = {} boundary hits = {}",
                n + 1,
                scenario.system.t,
                scenario.system.kinetic_energy(),
                report.skipped_pairs,
                report.boundary_hits
            );
        }
    }

    log::info!(
        "done: {steps} steps, {} pairs skipped, {} particle updates discarded, {} outside octree",
        total.skipped_pairs,
        total.skipped_count(),
        total.outside_octree
    );

    Ok(())
}
