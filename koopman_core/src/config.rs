// koopman_core/src/config.rs

use crate::error::{KoopmanError, Result};
use crate::learning::gradients::GradientRule;
use crate::utils::integrators::IntegratorKind;
use serde::{Deserialize, Serialize};

/// # KoopmanConfig
/// Everything a `StableKoopmanOperator` needs besides its lift.
/// Deserializes from the `[koopman]` table of a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct KoopmanConfig {
    /// Period between the `state_in` and `state_out` of a transition, in seconds.
    pub sampling_time: f64,
    /// Scale of the Gaussian noise `kx`/`ku` are drawn from before the first fit.
    pub noise: f64,
    pub initial_learning_rate: f64,
    /// After step `n` the learning rate is multiplied by `decay^n`.
    pub learning_rate_decay: f64,
    /// Optional seed for the operator's pseudo-random number generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub gradient_rule: GradientRule,
    pub integrator: IntegratorKind,
}

impl Default for KoopmanConfig {
    fn default() -> Self {
        Self {
            sampling_time: 0.01,
            noise: 1.0,
            initial_learning_rate: 1e-5,
            learning_rate_decay: 0.99,
            seed: None,
            gradient_rule: GradientRule::default(),
            integrator: IntegratorKind::default(),
        }
    }
}

impl KoopmanConfig {
    pub fn new(sampling_time: f64) -> Self {
        Self {
            sampling_time,
            ..Default::default()
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_learning_rate(mut self, initial_learning_rate: f64) -> Self {
        self.initial_learning_rate = initial_learning_rate;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gradient_rule(mut self, rule: GradientRule) -> Self {
        self.gradient_rule = rule;
        self
    }

    pub fn with_integrator(mut self, integrator: IntegratorKind) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_time > 0.0) || !self.sampling_time.is_finite() {
            return Err(KoopmanError::InvalidConfig(format!(
                "sampling_time must be positive, got {}",
                self.sampling_time
            )));
        }
        if !(self.noise >= 0.0) {
            return Err(KoopmanError::InvalidConfig(format!(
                "noise must be non-negative, got {}",
                self.noise
            )));
        }
        if !(self.initial_learning_rate > 0.0) {
            return Err(KoopmanError::InvalidConfig(format!(
                "initial_learning_rate must be positive, got {}",
                self.initial_learning_rate
            )));
        }
        if !(self.learning_rate_decay > 0.0 && self.learning_rate_decay <= 1.0) {
            return Err(KoopmanError::InvalidConfig(format!(
                "learning_rate_decay must lie in (0, 1], got {}",
                self.learning_rate_decay
            )));
        }
        Ok(())
    }
}
