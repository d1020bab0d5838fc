// koopman_sim/src/main.rs

//! End-to-end run of the stable Koopman fitter.
//!
//! 1. Load a scenario (defaults, TOML file, `KOOPMAN_SIM_*` environment overrides).
//! 2. Generate transitions from a random stable plant.
//! 3. Fit a `StableKoopmanOperator` on them.
//! 4. Roll the surrogate out under feedback, with and without a held perturbation.
//!
//! To run:
//! `cargo run -p koopman_sim -- --scenario assets/scenarios/quadrotor_hover.toml`

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::process::ExitCode;

use koopman_sim::cli::Cli;
use koopman_sim::config::ScenarioConfig;
use koopman_sim::runner::run_scenario;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("Loading scenario from: {}", cli.scenario.display());
    let scenario = match ScenarioConfig::load(&cli.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!("Could not load scenario '{}': {}", cli.scenario.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if cli.print_config {
        return match scenario.to_toml_string() {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    match run_scenario(&scenario) {
        Ok(summary) => {
            info!("{summary:#?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Scenario failed: {e}");
            ExitCode::FAILURE
        }
    }
}
