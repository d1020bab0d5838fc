// koopman_core/src/linalg/polar.rs

use super::{SOLVER_EPS, SOLVER_MAX_ITERATIONS};
use crate::error::{KoopmanError, Result};
use nalgebra::DMatrix;

const SVD_FAILED: KoopmanError = KoopmanError::NonconvergentDecomposition {
    operation: "polar decomposition (SVD)",
};

/// Right polar decomposition `a = u * p` of a square matrix.
///
/// Returns `(u, p)` with `u` orthogonal and `p` symmetric positive
/// semi-definite. Computed from the SVD `a = W Σ Vᵀ` as `u = W Vᵀ`,
/// `p = V Σ Vᵀ`.
pub fn polar(a: &DMatrix<f64>) -> Result<(DMatrix<f64>, DMatrix<f64>)> {
    if !a.is_square() {
        return Err(KoopmanError::dimension(
            "polar (columns)",
            a.nrows(),
            a.ncols(),
        ));
    }

    let svd = a
        .clone()
        .try_svd(true, true, SOLVER_EPS, SOLVER_MAX_ITERATIONS)
        .ok_or(SVD_FAILED)?;
    let w = svd.u.as_ref().ok_or(SVD_FAILED)?;
    let v_t = svd.v_t.as_ref().ok_or(SVD_FAILED)?;

    let u = w * v_t;
    let p = v_t.transpose() * DMatrix::from_diagonal(&svd.singular_values) * v_t;
    let p = (&p + p.transpose()) * 0.5;

    Ok((u, p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::prng::OperatorRng;
    use approx::assert_abs_diff_eq;
    use nalgebra::SymmetricEigen;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_factors_reconstruct_the_input() {
        let a = OperatorRng::new(Some(21)).gaussian_matrix(7, 7, 1.0);
        let (u, p) = polar(&a).unwrap();
        assert_abs_diff_eq!(&u * &p, a, epsilon = TOL);
    }

    #[test]
    fn test_orthogonal_factor_is_orthogonal() {
        let a = OperatorRng::new(Some(22)).gaussian_matrix(9, 9, 4.0);
        let (u, _) = polar(&a).unwrap();
        assert_abs_diff_eq!(
            u.transpose() * &u,
            DMatrix::<f64>::identity(9, 9),
            epsilon = TOL
        );
    }

    #[test]
    fn test_positive_factor_is_psd() {
        let a = OperatorRng::new(Some(23)).gaussian_matrix(6, 6, 1.0);
        let (_, p) = polar(&a).unwrap();
        assert_abs_diff_eq!(p.clone(), p.transpose(), epsilon = TOL);
        for e in SymmetricEigen::new(p).eigenvalues.iter() {
            assert!(*e >= -TOL);
        }
    }

    #[test]
    fn test_orthogonal_input_is_its_own_factor() {
        let (q, _) = polar(&OperatorRng::new(Some(24)).gaussian_matrix(5, 5, 1.0)).unwrap();
        let (u, p) = polar(&q).unwrap();
        assert_abs_diff_eq!(u, q, epsilon = TOL);
        assert_abs_diff_eq!(p, DMatrix::<f64>::identity(5, 5), epsilon = TOL);
    }
}
