use brsim::{ScenarioConfig, Scenario};
use brsim::run_3d;
use brsim::{bench_ticks, bench_speed_curve};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "test_file.yaml")]
    file_name: String,

    /// Run without a window, whatever the scenario says
    #[arg(long)]
    headless: bool,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let scenario_cfg = ScenarioConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.bench {
        bench_ticks();
        bench_speed_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    info!(file = %args.file_name, "loaded scenario");

    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    if scenario.engine.viewer && !args.headless {
        run_3d(scenario);
    } else {
        let report = scenario.run_headless()?;
        println!("ticks = {}, phases = {:?}, outcome = {:?}", report.ticks, report.phases, report.outcome);
        if !report.outcome.is_finished() {
            bail!("animation did not finish within {} ticks", scenario.engine.max_ticks);
        }
    }

    Ok(())
}
