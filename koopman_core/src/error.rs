// koopman_core/src/error.rs

use thiserror::Error;

/// Everything that can go wrong while lifting, fitting or rolling out a model.
///
/// None of these are swallowed internally. A failing `fit_step` leaves the
/// fitter exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KoopmanError {
    /// A vector or matrix did not have the shape the operation requires.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    Dimension {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A matrix that must be inverted (the similarity factor `S`) is singular.
    #[error("singular matrix encountered in {context}")]
    SingularMatrix { context: &'static str },

    /// An iterative decomposition (eigen, SVD, Schur, logarithm) did not converge.
    #[error("{operation} failed to converge")]
    NonconvergentDecomposition { operation: &'static str },

    /// `simulate` was called with neither a policy nor a complete action schedule.
    #[error("a policy or a complete action schedule is required to simulate")]
    PolicyRequired,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, KoopmanError>;

impl KoopmanError {
    pub(crate) fn dimension(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::Dimension {
            context,
            expected,
            actual,
        }
    }
}
