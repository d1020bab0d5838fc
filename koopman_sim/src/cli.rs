// koopman_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Fits a stable Koopman surrogate of the quadrotor observables on synthetic
/// transitions and rolls it forward.
///
/// Log verbosity follows `RUST_LOG` (default `info`).
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/quadrotor_hover.toml")]
    pub scenario: PathBuf,

    /// Print the effective scenario (defaults, file and environment merged) and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}
