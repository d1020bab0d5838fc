// koopman_sim/src/lib.rs

//! Scenario driver for `koopman_core`: synthetic training data, scenario
//! files and the command line.

// This prelude is for convenience for other files WITHIN the koopman_sim crate.
pub mod prelude;

pub mod cli;
pub mod config;
pub mod error;
pub mod plant;
pub mod runner;
