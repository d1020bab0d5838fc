// koopman_sim/src/prelude.rs

// Re-export the entire koopman_core prelude so the pure types like `State`,
// `StableKoopmanOperator` and `ControlAffineDynamics` are one import away.
pub use koopman_core::prelude::*;

// Simulation-specific types.
pub use crate::config::{PerturbationConfig, RolloutConfig, ScenarioConfig, TrainingConfig};
pub use crate::error::SimError;
pub use crate::plant::{generate_transitions, GroundTruthPlant};
pub use crate::runner::{run_scenario, RunSummary};
