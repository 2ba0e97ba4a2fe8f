//! Cameroon DSGE simulator
//!
//! Runs one impulse response plus the decomposition and posterior tables,
//! prints a summary and writes the results to disk.
//!
//! Usage:
//!   cargo run --release --bin cameroon_dsge -- configs/baseline.toml
//!
//! Without an argument the complete model and the default scenario are used.
//! Set `RUST_LOG=cameroon_dsge=debug` for per-run logs.

use cameroon_dsge::analysis::{print_posterior_table, ImpulseSummary};
use cameroon_dsge::output::{self, RunSummary};
use cameroon_dsge::report::NarrativeReport;
use cameroon_dsge::{ModelConfig, StateSpaceSimulator};
use serde::Deserialize;
use statespace::parallel::logging_progress_reporter;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Top-level run configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RunConfig {
    model: ModelConfig,
    scenario: Scenario,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct Scenario {
    shock: String,
    amplitude: f64,
    horizon: usize,
    variance_horizon: usize,
    historical_quarters: usize,
    posterior_draws: usize,
    output_dir: PathBuf,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            shock: "monetary".to_string(),
            amplitude: 0.02,
            horizon: 40,
            variance_horizon: 20,
            historical_quarters: 24,
            posterior_draws: 1000,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl RunConfig {
    fn from_toml_str(source: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: RunConfig = toml::from_str(source)?;
        config.model.validate()?;
        Ok(config)
    }

    fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cameroon_dsge=info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = match env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            RunConfig::load(Path::new(&path))?
        }
        None => RunConfig::default(),
    };
    let scenario = &config.scenario;

    let sim = StateSpaceSimulator::new(config.model.clone())?;

    println!("========================================");
    println!("Cameroon DSGE Simulator (BEAC)");
    println!(
        "{} shocks, {:?} propagation",
        sim.catalog().len(),
        config.model.propagation
    );
    println!("========================================\n");

    // Impulse response
    let shock = sim.shock(&scenario.shock)?;
    let irf = sim.simulate(&scenario.shock, scenario.amplitude, scenario.horizon)?;
    let impulse = ImpulseSummary::from_response(&irf);
    impulse.print_summary();

    println!();
    print!("{}", NarrativeReport::new(shock, &irf));

    // Peak output response of every shock in the catalog
    println!("\n{:<28} {:>12} {:>12}", "Shock", "Output Peak", "Persistence");
    println!("{:-<28} {:->12} {:->12}", "", "", "");
    let responses = sim.impulse_responses_with_progress(
        scenario.amplitude,
        scenario.horizon,
        logging_progress_reporter(4),
    )?;
    for response in responses {
        let summary = ImpulseSummary::from_response(&response);
        let name = &sim.shock(&response.shock)?.name;
        println!(
            "{:<28} {:>12.4} {:>12}",
            name, summary.output_peak, summary.persistence
        );
    }

    // Decompositions
    println!();
    let variance = sim.variance_decomposition(scenario.variance_horizon)?;
    variance.print_table();

    let history = sim.historical_decomposition(scenario.historical_quarters)?;
    if let (Some(first), Some(last)) = (history.dates.first(), history.dates.last()) {
        println!(
            "\nHistorical decomposition: {} quarters ({} to {})",
            history.len(),
            first,
            last
        );
    }

    // Structural parameters
    let posterior = sim.sample_posteriors(scenario.posterior_draws)?.summaries();
    println!("\nPosterior draws ({} per parameter):", scenario.posterior_draws);
    print_posterior_table(&posterior);

    // Save outputs
    let dir = &scenario.output_dir;
    fs::create_dir_all(dir)?;
    let irf_path = dir.join(format!("irf_{}.csv", scenario.shock));
    output::write_irf_csv_path(&irf, &irf_path)?;
    output::write_variance_csv(&variance, fs::File::create(dir.join("variance.csv"))?)?;
    output::write_historical_csv(&history, fs::File::create(dir.join("historical.csv"))?)?;
    RunSummary::new(&config.model, impulse, scenario.variance_horizon, posterior)
        .write_summary_json(dir.join("summary.json"))?;

    info!(dir = %dir.display(), "Results written");
    println!("\nResults written to {}", dir.display());

    Ok(())
}
