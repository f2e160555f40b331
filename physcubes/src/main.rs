use physcubes::{Scenario, ScenarioConfig};
use physcubes::{run_3d, run_headless};
use physcubes::{bench_collisions, bench_integrate};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, relative to the crate's `scenarios/` directory
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Run without a window for this many seconds of frame time
    #[arg(long)]
    headless: Option<f64>,

    /// Run the integration and collision benchmarks, then exit
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let scenario_cfg = ScenarioConfig::load(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    log::debug!("{:?}", scenario_cfg);

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Info).env().init()?;

    let args = Args::parse();

    if args.bench {
        bench_integrate()?;
        bench_collisions()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    match args.headless {
        Some(seconds) => {
            let ticks = run_headless(scenario, seconds);
            log::info!("headless run finished after {ticks} ticks");
        }
        None => run_3d(scenario),
    }

    Ok(())
}
