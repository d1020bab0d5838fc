// koopman_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod learning;
pub mod linalg;
pub mod models;
pub mod prelude;
pub mod simulation;
pub mod types;
pub mod utils;
