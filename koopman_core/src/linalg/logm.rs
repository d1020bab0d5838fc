// koopman_core/src/linalg/logm.rs

//! Principal matrix logarithm by inverse scaling and squaring.
//!
//! The input is brought to complex triangular Schur form `A = Q T Q*`. `T` is
//! square rooted `s` times until it sits close to the identity, the Mercator
//! series gives `log(T^(1/2^s))`, and the result is scaled back by `2^s`.

use super::{SOLVER_EPS, SOLVER_MAX_ITERATIONS};
use crate::error::{KoopmanError, Result};
use nalgebra::{Complex, DMatrix, Schur};

type CMatrix = DMatrix<Complex<f64>>;

/// Stop taking square roots once `‖T - I‖_F` is below this.
const SERIES_RADIUS: f64 = 0.25;
const MAX_SQUARE_ROOTS: usize = 64;
const MAX_SERIES_TERMS: usize = 200;

/// Relative magnitude below which a Schur subdiagonal entry counts as zero.
const TRIANGULAR_TOL: f64 = 1e-10;

const LOG_FAILED: KoopmanError = KoopmanError::NonconvergentDecomposition {
    operation: "matrix logarithm",
};

/// Principal logarithm of a real square matrix. The result may be complex
/// when `a` has eigenvalues on the negative real axis.
pub fn logm(a: &DMatrix<f64>) -> Result<CMatrix> {
    if !a.is_square() {
        return Err(KoopmanError::dimension("logm (columns)", a.nrows(), a.ncols()));
    }
    let n = a.nrows();
    if n == 0 {
        return Ok(CMatrix::zeros(0, 0));
    }

    // --- 1. Schur form, with the real 2x2 blocks split into complex pairs ---
    let schur = Schur::try_new(a.clone(), SOLVER_EPS, SOLVER_MAX_ITERATIONS).ok_or(
        KoopmanError::NonconvergentDecomposition {
            operation: "real Schur decomposition",
        },
    )?;
    let (q_real, t_real) = schur.unpack();
    let (q, mut t) = triangularize(&q_real, &t_real)?;

    // A zero eigenvalue has no logarithm.
    if (0..n).any(|i| t[(i, i)].norm() == 0.0) {
        return Err(KoopmanError::SingularMatrix {
            context: "matrix logarithm",
        });
    }

    // --- 2. Inverse scaling: repeated square roots ---
    let identity = CMatrix::identity(n, n);
    let mut roots = 0;
    while (&t - &identity).norm() > SERIES_RADIUS {
        if roots == MAX_SQUARE_ROOTS {
            return Err(LOG_FAILED);
        }
        t = sqrtm_upper_triangular(&t)?;
        roots += 1;
    }

    // --- 3. log(I + X) = X - X^2/2 + X^3/3 - ... ---
    let x = &t - &identity;
    let mut log_t = CMatrix::zeros(n, n);
    let mut power = x.clone();
    let mut converged = false;
    for k in 1..=MAX_SERIES_TERMS {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = &power * Complex::new(sign / k as f64, 0.0);
        log_t += &term;
        if term.norm() <= f64::EPSILON * log_t.norm().max(1.0) {
            converged = true;
            break;
        }
        power = &power * &x;
    }
    if !converged {
        return Err(LOG_FAILED);
    }

    // --- 4. Squaring back and undoing the similarity ---
    let log_t = log_t * Complex::new(2f64.powi(roots as i32), 0.0);
    Ok(&q * log_t * q.adjoint())
}

/// Real part of the principal logarithm of a real matrix.
pub fn real_logm(a: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    Ok(logm(a)?.map(|c| c.re))
}

/// Turns a real quasi-triangular Schur form `A = Q T Qᵀ` into a complex
/// triangular one by rotating every 2x2 block onto its eigenvector basis.
fn triangularize(q_real: &DMatrix<f64>, t_real: &DMatrix<f64>) -> Result<(CMatrix, CMatrix)> {
    let n = t_real.nrows();
    let mut q = q_real.map(|v| Complex::new(v, 0.0));
    let mut t = t_real.map(|v| Complex::new(v, 0.0));
    let scale = t_real.norm().max(1.0);

    let mut k = 0;
    while k + 1 < n {
        if t_real[(k + 1, k)].abs() <= TRIANGULAR_TOL * scale {
            t[(k + 1, k)] = Complex::new(0.0, 0.0);
            k += 1;
            continue;
        }

        let (b00, b01) = (t[(k, k)], t[(k, k + 1)]);
        let (b10, b11) = (t[(k + 1, k)], t[(k + 1, k + 1)]);
        let half_diff = (b00 - b11) * 0.5;
        let lambda = (b00 + b11) * 0.5 + (half_diff * half_diff + b01 * b10).sqrt();

        // Two candidate eigenvectors for lambda; keep the better conditioned one.
        let (c0, c1) = (b01, lambda - b00);
        let (d0, d1) = (lambda - b11, b10);
        let (v0, v1) = if c0.norm_sqr() + c1.norm_sqr() >= d0.norm_sqr() + d1.norm_sqr() {
            (c0, c1)
        } else {
            (d0, d1)
        };
        let len = (v0.norm_sqr() + v1.norm_sqr()).sqrt();
        if len == 0.0 {
            return Err(LOG_FAILED);
        }
        let (v0, v1) = (v0 / len, v1 / len);

        let mut g = CMatrix::identity(n, n);
        g[(k, k)] = v0;
        g[(k + 1, k)] = v1;
        g[(k, k + 1)] = -v1.conj();
        g[(k + 1, k + 1)] = v0.conj();

        t = g.adjoint() * &t * &g;
        q = &q * &g;
        t[(k + 1, k)] = Complex::new(0.0, 0.0);
        k += 2;
    }

    // Everything below the first subdiagonal is zero in a Schur form already.
    for j in 0..n {
        for i in (j + 2)..n {
            t[(i, j)] = Complex::new(0.0, 0.0);
        }
    }

    Ok((q, t))
}

/// Principal square root of an upper triangular matrix (Björck–Hammarling
/// recurrence), filled one column at a time.
fn sqrtm_upper_triangular(t: &CMatrix) -> Result<CMatrix> {
    let n = t.nrows();
    let mut r = CMatrix::zeros(n, n);
    for j in 0..n {
        r[(j, j)] = t[(j, j)].sqrt();
        for i in (0..j).rev() {
            let mut acc = t[(i, j)];
            for k in (i + 1)..j {
                acc -= r[(i, k)] * r[(k, j)];
            }
            let denom = r[(i, i)] + r[(j, j)];
            if denom.norm() == 0.0 {
                return Err(LOG_FAILED);
            }
            r[(i, j)] = acc / denom;
        }
    }
    Ok(r)
}
