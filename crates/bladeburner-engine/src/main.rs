//! Headless binary for the Bladeburner division engine.
//!
//! Loads configuration, initialises logging, builds a division for a
//! simulated operative and runs it for a configured span of simulated time.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `BLADEBURNER_CONFIG` or `bladeburner-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Seed the RNG and build the operative and division
//! 4. Run the update loop
//! 5. Log the result and optionally write a snapshot

mod error;
mod run;

use std::path::PathBuf;

use bladeburner_core::{Division, LogFormat, LoggingConfig, SimulationConfig};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step or the run itself fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("bladeburner-engine starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        seed = config.run.seed,
        simulated_seconds = config.run.simulated_seconds,
        cycles_per_update = config.run.cycles_per_update,
        starting_action = %config.run.starting_action,
        city = %config.division.starting_city,
        "Run parameters"
    );

    // 3. Build the operative and division.
    let mut rng = SmallRng::seed_from_u64(config.run.seed);
    let mut operative = run::operative(&config.run);
    let mut division = Division::new(&config, &operative, &mut rng).map_err(EngineError::from)?;

    // 4. Run.
    let report = run::run_division(&mut division, &mut operative, &config.run, &mut rng)?;

    // 5. Log results.
    info!(
        seconds = report.seconds,
        updates = report.updates,
        completions = report.completions,
        events = report.events,
        cancellations = report.cancellations,
        idle_updates = report.idle_updates,
        stalls = report.stalls,
        rank = division.rank(),
        max_rank = division.max_rank(),
        black_ops = division.black_ops_completed(),
        hp_lost = division.stats().hp_lost,
        hospitalizations = division.stats().hospitalizations,
        team_lost = division.stats().team_lost,
        money = operative.money,
        "Run complete"
    );

    if let Some(path) = &config.run.snapshot_path {
        write_snapshot(&division, path)?;
    }

    info!("bladeburner-engine shutdown complete");
    Ok(())
}

/// Load the configuration from `BLADEBURNER_CONFIG` or `bladeburner-config.yaml`.
///
/// Returns the path that was read, or `None` when defaults are used.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var_os("BLADEBURNER_CONFIG")
        .map_or_else(|| PathBuf::from("bladeburner-config.yaml"), PathBuf::from);
    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

fn write_snapshot(division: &Division, path: &std::path::Path) -> Result<(), EngineError> {
    let json = division.snapshot().to_json()?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Snapshot written");
    Ok(())
}
