//! Deconvolution filter (`E_4`).
//!
//! Interpolating with a Gaussian blurs the spectrum by the kernel's Fourier
//! coefficients. Pre-scaling every uniform sample by the reciprocal
//! coefficient `sqrt(π/tau)·exp(tau·k²)` cancels that blur.

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::num::Complex64;
use crate::spread::AxisSpread;

/// Per-axis deconvolution factors over centred frequencies `−N/2..N/2`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeconvolutionFilter {
    factors: Vec<f64>,
}

impl DeconvolutionFilter {
    pub fn build(axis: &AxisSpread) -> Self {
        let tau = axis.tau;
        let norm = libm::sqrt(PI / tau);
        let half = (axis.len / 2) as f64;
        let factors = (0..axis.len)
            .map(|i| {
                let k = i as f64 - half;
                norm * libm::exp(tau * k * k)
            })
            .collect();
        Self { factors }
    }

    /// Factor for storage index `i` (frequency `i − N/2`).
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Scale `grid` by the outer product of `filters` and by `scale`.
///
/// `grid` is laid out axis 0 fastest and its length must equal the product
/// of the filter lengths.
pub fn deconvolve<const D: usize>(
    grid: &[Complex64],
    filters: &[DeconvolutionFilter; D],
    scale: f64,
) -> Vec<Complex64> {
    let mut coord = [0usize; D];
    let mut out = Vec::with_capacity(grid.len());
    for &value in grid {
        let weight = filters
            .iter()
            .zip(coord.iter())
            .fold(scale, |w, (f, &i)| w * f.factors[i]);
        out.push(value.scale(weight));
        for (c, f) in coord.iter_mut().zip(filters.iter()) {
            *c += 1;
            if *c < f.len() {
                break;
            }
            *c = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spread::SpreadingParams;
    use alloc::vec;

    #[test]
    fn filter_is_even_around_centre() {
        let p = SpreadingParams::new([8], 6).unwrap();
        let f = DeconvolutionFilter::build(&p.axes()[0]);
        assert_eq!(f.len(), 8);
        let c = f.factors();
        for k in 1..4 {
            assert!((c[4 + k] - c[4 - k]).abs() < 1e-12 * c[4 + k]);
        }
        let tau = p.axes()[0].tau;
        assert!((c[4] - libm::sqrt(PI / tau)).abs() < 1e-12);
        // Frequency -N/2 has no positive partner and is the largest factor.
        assert!(c[0] > c[7]);
    }

    #[test]
    fn outer_product_follows_layout() {
        let p = SpreadingParams::new([2, 4], 3).unwrap();
        let filters = [
            DeconvolutionFilter::build(&p.axes()[0]),
            DeconvolutionFilter::build(&p.axes()[1]),
        ];
        let grid = vec![Complex64::new(1.0, -1.0); 8];
        let out = deconvolve(&grid, &filters, 0.5);
        for i1 in 0..4 {
            for i0 in 0..2 {
                let w = 0.5 * filters[0].factors()[i0] * filters[1].factors()[i1];
                let v = out[i0 + 2 * i1];
                assert!((v.re - w).abs() < 1e-12 * w);
                assert!((v.im + w).abs() < 1e-12 * w);
            }
        }
    }
}
