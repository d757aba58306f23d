//! Spreading parameters and the Gaussian spreading table (`E_3`).
//!
//! The accuracy knob selects the kernel half-width `M_sp`; together with the
//! oversampling ratio `R = 2` and each axis length `N` it fixes the Gaussian
//! variance `tau = π·M_sp / (N²·R·(R − 0.5))`. Calibration of the knob:
//!
//! | accuracy | typical max error |
//! |----------|-------------------|
//! | 3        | ~1e-3             |
//! | 6        | single precision  |
//! | 9        | ~1e-9             |
//! | 12       | double precision  |

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::nufft::NufftError;

/// Oversampling ratio `R` applied to every axis.
pub const OVERSAMPLING_RATIO: f64 = 2.0;

/// Accuracy used when the caller does not pick one.
pub const DEFAULT_ACCURACY: u32 = 6;

/// Largest accepted accuracy. Beyond this double precision is saturated.
pub const MAX_ACCURACY: u32 = 16;

/// Upper bound on kernel taps per axis (`2·M_sp`).
pub const MAX_TAPS: usize = 2 * MAX_ACCURACY as usize;

/// Highest supported grid dimensionality.
pub const MAX_DIMS: usize = 3;

/// Roughly 1e-3 maximum error.
pub const ACCURACY_COARSE: u32 = 3;
/// Roughly single precision.
pub const ACCURACY_SINGLE: u32 = 6;
/// Roughly 1e-9 maximum error.
pub const ACCURACY_FINE: u32 = 9;
/// Roughly double precision.
pub const ACCURACY_DOUBLE: u32 = 12;

/// `M_r = round(R·N)`.
#[inline]
pub fn oversampled_len(n: usize) -> usize {
    libm::round(OVERSAMPLING_RATIO * n as f64) as usize
}

/// Gaussian variance for an axis of length `n` and half-width `spread`.
#[inline]
pub fn gaussian_variance(n: usize, spread: usize) -> f64 {
    let r = OVERSAMPLING_RATIO;
    let n = n as f64;
    PI * spread as f64 / (n * n * r * (r - 0.5))
}

/// Derived quantities for one grid axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpread {
    /// Uniform grid length `N`.
    pub len: usize,
    /// Oversampled length `M_r`.
    pub oversampled: usize,
    /// Gaussian variance `tau`.
    pub tau: f64,
}

/// Validated spreading parameters for a `D`-dimensional grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadingParams<const D: usize> {
    accuracy: u32,
    spread: usize,
    axes: [AxisSpread; D],
}

impl<const D: usize> SpreadingParams<D> {
    /// Validate `shape` and `accuracy` and derive per-axis parameters.
    ///
    /// Every axis must be even and non-zero. The accuracy must lie in
    /// `1..=MAX_ACCURACY`. A kernel window longer than the oversampled axis
    /// is accepted: periodic wrapping folds the extra taps onto the
    /// periodised kernel.
    pub fn new(shape: [usize; D], accuracy: u32) -> Result<Self, NufftError> {
        if D == 0 || D > MAX_DIMS {
            return Err(NufftError::DimensionMismatch {
                expected: MAX_DIMS,
                found: D,
            });
        }
        if accuracy == 0 || accuracy > MAX_ACCURACY {
            return Err(NufftError::AccuracyOutOfRange { accuracy });
        }
        for (axis, &len) in shape.iter().enumerate() {
            if len == 0 {
                return Err(NufftError::EmptyGrid);
            }
            if len % 2 != 0 {
                return Err(NufftError::OddAxisLength { axis, len });
            }
        }
        let spread = accuracy as usize;
        let axes = core::array::from_fn(|d| AxisSpread {
            len: shape[d],
            oversampled: oversampled_len(shape[d]),
            tau: gaussian_variance(shape[d], spread),
        });
        Ok(Self {
            accuracy,
            spread,
            axes,
        })
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    /// Kernel half-width `M_sp`.
    pub fn spread(&self) -> usize {
        self.spread
    }

    /// Taps per axis, `2·M_sp`.
    pub fn taps(&self) -> usize {
        2 * self.spread
    }

    pub fn axes(&self) -> &[AxisSpread; D] {
        &self.axes
    }

    pub fn shape(&self) -> [usize; D] {
        core::array::from_fn(|d| self.axes[d].len)
    }

    pub fn oversampled_shape(&self) -> [usize; D] {
        core::array::from_fn(|d| self.axes[d].oversampled)
    }

    /// Number of uniform grid samples, `∏N`.
    pub fn grid_len(&self) -> usize {
        self.axes.iter().map(|a| a.len).product()
    }
}

/// Knot-independent kernel falloff `E_3` for one axis.
///
/// Entry `k` belongs to offset `l = k + 1 − M_sp`, so the table covers
/// offsets `−(M_sp − 1)..=M_sp`. The first `2·M_sp − 1` entries are
/// palindromic around the centre (`l = 0`, value 1); the last entry is the
/// additional tap on the positive side. The window is therefore one tap
/// wider on the right than on the left. This asymmetry is part of the
/// numerical output and is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadingTable {
    factors: Vec<f64>,
    spread: usize,
}

impl SpreadingTable {
    pub fn build(axis: &AxisSpread, spread: usize) -> Self {
        let m_r = axis.oversampled as f64;
        let one_sided = |j: usize| {
            let a = PI * j as f64 / m_r;
            libm::exp(-(a * a) / axis.tau)
        };
        let mut factors = Vec::with_capacity(2 * spread);
        factors.extend((1..spread).rev().map(one_sided));
        factors.push(1.0);
        factors.extend((1..=spread).map(one_sided));
        Self { factors, spread }
    }

    /// All `2·M_sp` factors in tap order.
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// The palindromic part, without the extra positive tap.
    pub fn symmetric_core(&self) -> &[f64] {
        &self.factors[..self.factors.len() - 1]
    }

    /// Factor for kernel offset `l`, or `None` outside `−(M_sp−1)..=M_sp`.
    pub fn at_offset(&self, l: isize) -> Option<f64> {
        let k = l + self.spread as isize - 1;
        usize::try_from(k)
            .ok()
            .and_then(|k| self.factors.get(k).copied())
    }

    pub fn spread(&self) -> usize {
        self.spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversampling_doubles_axis() {
        assert_eq!(oversampled_len(8), 16);
        assert_eq!(oversampled_len(6), 12);
    }

    #[test]
    fn variance_matches_formula() {
        let tau = gaussian_variance(8, 6);
        assert!((tau - PI * 6.0 / (64.0 * 2.0 * 1.5)).abs() < 1e-15);
    }

    #[test]
    fn params_validate_input() {
        assert_eq!(
            SpreadingParams::new([8], 0),
            Err(NufftError::AccuracyOutOfRange { accuracy: 0 })
        );
        assert_eq!(
            SpreadingParams::new([8], MAX_ACCURACY + 1),
            Err(NufftError::AccuracyOutOfRange {
                accuracy: MAX_ACCURACY + 1
            })
        );
        assert_eq!(
            SpreadingParams::new([4, 5, 4], 6),
            Err(NufftError::OddAxisLength { axis: 1, len: 5 })
        );
        assert_eq!(SpreadingParams::new([4, 0], 6), Err(NufftError::EmptyGrid));
        assert_eq!(
            SpreadingParams::<4>::new([2; 4], 6),
            Err(NufftError::DimensionMismatch {
                expected: 3,
                found: 4
            })
        );
        assert!(SpreadingParams::new([2], MAX_ACCURACY).is_ok());
    }

    #[test]
    fn params_expose_shapes() {
        let p = SpreadingParams::new([4, 6, 8], 9).unwrap();
        assert_eq!(p.shape(), [4, 6, 8]);
        assert_eq!(p.oversampled_shape(), [8, 12, 16]);
        assert_eq!(p.taps(), 18);
        assert_eq!(p.grid_len(), 192);
        assert_eq!(p.accuracy(), 9);
    }

    #[test]
    fn table_is_palindromic_with_extra_tap() {
        for spread in [1usize, 3, 6, 12] {
            let p = SpreadingParams::new([16], spread as u32).unwrap();
            let t = SpreadingTable::build(&p.axes()[0], spread);
            assert_eq!(t.factors().len(), 2 * spread);
            let core = t.symmetric_core();
            for (a, b) in core.iter().zip(core.iter().rev()) {
                assert_eq!(a, b);
            }
            assert_eq!(t.at_offset(0), Some(1.0));
            let last = spread as isize;
            assert!(t.at_offset(last).unwrap() < t.at_offset(last - 1).unwrap());
            assert_eq!(t.at_offset(-(spread as isize)), None);
            assert_eq!(t.at_offset(spread as isize + 1), None);
        }
    }

    #[test]
    fn table_decays_away_from_centre() {
        let p = SpreadingParams::new([32], 9).unwrap();
        let t = SpreadingTable::build(&p.axes()[0], 9);
        for l in 1..=9isize {
            let outer = t.at_offset(l).unwrap();
            let inner = t.at_offset(l - 1).unwrap();
            assert!(outer < inner && outer > 0.0);
        }
    }
}
