// koopman_sim/src/config.rs

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use koopman_core::config::KoopmanConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SimError;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [koopman] section is missing
    pub koopman: KoopmanConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub rollout: RolloutConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in the scenario file.
// =========================================================================

/// How the synthetic training transitions are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Optional seed for the data generator, independent of the operator's seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of transitions to fit on.
    pub transitions: usize,
    /// Spectral radius of the ground-truth state map; must be below 1.
    pub contraction: f64,
    /// Size of the random rotation mixed into the ground-truth state map.
    pub coupling: f64,
    /// Standard deviation of the random actions applied to the plant.
    pub action_scale: f64,
    /// Raw state `[g (3), omega (3), v (3)]`. The omega part is forced to zero.
    pub initial_state: [f64; 9],
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: None,
            transitions: 50,
            contraction: 0.95,
            coupling: 0.1,
            action_scale: 0.1,
            initial_state: [0.3, -0.2, 0.9, 0.0, 0.0, 0.0, 0.5, -0.4, 0.25],
        }
    }
}

/// Rollouts performed with the fitted surrogate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RolloutConfig {
    /// Number of states per rollout.
    pub horizon: usize,
    /// Gain of the feedback policy `u = -gain * kuᵀ z`.
    pub feedback_gain: f64,
    pub perturbation: PerturbationConfig,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            horizon: 100,
            feedback_gain: 0.5,
            perturbation: PerturbationConfig::default(),
        }
    }
}

/// A fixed action held over steps `tau..=tau + lam` of the mixed rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerturbationConfig {
    pub tau: usize,
    pub lam: usize,
    pub ustar: [f64; 4],
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            tau: 20,
            lam: 5,
            ustar: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

// =========================================================================
// == Loading ==
// =========================================================================

/// Prefix for environment overrides, e.g. `KOOPMAN_SIM_KOOPMAN__SEED=3`.
pub const ENV_PREFIX: &str = "KOOPMAN_SIM_";

/// Defaults, then the scenario file, then environment overrides.
pub fn scenario_figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(ScenarioConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let config: Self = scenario_figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, SimError> {
        let config: Self = Figment::from(Serialized::defaults(ScenarioConfig::default()))
            .merge(Toml::string(toml))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.koopman.validate()?;
        if self.training.transitions == 0 {
            return Err(SimError::Scenario("training.transitions must be positive".into()));
        }
        if !(self.training.contraction > 0.0 && self.training.contraction < 1.0) {
            return Err(SimError::Scenario(format!(
                "training.contraction must lie in (0, 1), got {}",
                self.training.contraction
            )));
        }
        if self.rollout.horizon == 0 {
            return Err(SimError::Scenario("rollout.horizon must be positive".into()));
        }
        Ok(())
    }

    /// The effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, SimError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
