// koopman_sim/src/error.rs

use koopman_core::error::KoopmanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error(transparent)]
    Core(#[from] KoopmanError),

    #[error("failed to serialize scenario: {0}")]
    Serialize(#[from] toml::ser::Error),
}
