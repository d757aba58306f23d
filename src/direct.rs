//! Brute-force type-II transform.
//!
//! Evaluates `f(x) = Σ_k F[k]·exp(i·k·x)` over the centred frequency set
//! `k_d ∈ −N_d/2..N_d/2` for each knot. `O(M·∏N)`; used as the accuracy
//! reference for the gridded transform.

use alloc::vec;
use alloc::vec::Vec;

use crate::nufft::NufftError;
use crate::num::Complex64;

/// Direct evaluation on normalized knots for a grid of shape `shape`
/// (axis 0 fastest).
pub fn type2_direct<const D: usize>(
    grid: &[Complex64],
    shape: [usize; D],
    knots: &[[f64; D]],
) -> Result<Vec<Complex64>, NufftError> {
    let expected: usize = shape.iter().product();
    if grid.len() != expected {
        return Err(NufftError::DimensionMismatch {
            expected,
            found: grid.len(),
        });
    }
    if expected == 0 {
        return Err(NufftError::EmptyGrid);
    }
    let mut phases: [Vec<Complex64>; D] =
        core::array::from_fn(|d| vec![Complex64::zero(); shape[d]]);
    let mut out = Vec::with_capacity(knots.len());
    for knot in knots {
        for d in 0..D {
            let half = (shape[d] / 2) as f64;
            for (i, p) in phases[d].iter_mut().enumerate() {
                *p = Complex64::expi((i as f64 - half) * knot[d]);
            }
        }
        let mut coord = [0usize; D];
        let mut acc = Complex64::zero();
        for &value in grid {
            let phase = (0..D).fold(Complex64::new(1.0, 0.0), |p, d| p * phases[d][coord[d]]);
            acc += value * phase;
            for (c, &n) in coord.iter_mut().zip(shape.iter()) {
                *c += 1;
                if *c < n {
                    break;
                }
                *c = 0;
            }
        }
        out.push(acc);
    }
    Ok(out)
}

/// One-dimensional convenience wrapper around [`type2_direct`].
pub fn type2_direct_1d(grid: &[Complex64], knots: &[f64]) -> Result<Vec<Complex64>, NufftError> {
    let knots: Vec<[f64; 1]> = knots.iter().map(|&x| [x]).collect();
    type2_direct(grid, [grid.len()], &knots)
}
