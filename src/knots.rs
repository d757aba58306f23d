//! Knot normalization into the canonical periodic domain `[0, 2π)`.
//!
//! Two conventions exist and they are deliberately kept apart:
//!
//! - [`Normalization::KnotExtrema`] (1D): the knot extrema are stretched
//!   over the `N` sample positions of the grid, so the smallest knot lands
//!   on `-π` (folded to `π`) and the largest on `π - 2π/N`.
//! - [`Normalization::AxisSpacing`] (3D): each axis' physical sample
//!   spacing is recovered from its most negative coordinate, and knots are
//!   expressed in units of that spacing. A knot at the physical origin maps
//!   to 0.

use alloc::vec::Vec;
use core::f64::consts::TAU;

use crate::nufft::NufftError;

/// Which knot-to-angle mapping produced a set of normalized knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Scale and shift derived from the knot minimum and maximum.
    KnotExtrema,
    /// Scale derived from the physical spacing of each grid axis.
    AxisSpacing,
}

/// Fold `x` into `[0, 2π)`.
///
/// Values that round up to exactly `2π` after the fold are mapped to 0 so
/// the interval stays half-open.
#[inline]
pub fn wrap_to_period(x: f64) -> f64 {
    let r = libm::fmod(x, TAU);
    let r = if r < 0.0 { r + TAU } else { r };
    if r >= TAU {
        0.0
    } else {
        r
    }
}

pub(crate) fn check_finite<const D: usize>(knots: &[[f64; D]]) -> Result<(), NufftError> {
    match knots.iter().position(|k| k.iter().any(|v| !v.is_finite())) {
        Some(index) => Err(NufftError::NonFiniteKnot { index }),
        None => Ok(()),
    }
}

/// Normalize 1D knots with the [`Normalization::KnotExtrema`] convention
/// for a grid of `n` samples.
///
/// # Errors
///
/// - [`NufftError::NonFiniteKnot`] for NaN or infinite coordinates.
/// - [`NufftError::DegenerateGeometry`] when every knot coincides, or the
///   knot span overflows, which leaves the scale undefined.
pub fn normalize_1d(knots: &[f64], n: usize) -> Result<Vec<f64>, NufftError> {
    if knots.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(index) = knots.iter().position(|k| !k.is_finite()) {
        return Err(NufftError::NonFiniteKnot { index });
    }
    let (min, max) = knots
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &k| {
            (lo.min(k), hi.max(k))
        });
    let bandwidth = max - min;
    let scale = (n as f64 - 1.0) / bandwidth;
    if !bandwidth.is_finite() || bandwidth <= 0.0 || scale <= 0.0 || !scale.is_finite() {
        return Err(NufftError::DegenerateGeometry { axis: 0 });
    }
    let shift = -(n as f64) / 2.0 - min * scale;
    let n = n as f64;
    Ok(knots
        .iter()
        .map(|&k| wrap_to_period(TAU * (scale * k + shift) / n))
        .collect())
}

/// Scale that converts physical coordinates on one axis into sample units:
/// `-(n/2) / min(axis)`.
///
/// # Errors
///
/// [`NufftError::DegenerateGeometry`] when the axis is empty, non-finite, or
/// its minimum is 0 (no spacing can be recovered).
pub fn axis_scale(axis_coords: &[f64], n: usize, axis: usize) -> Result<f64, NufftError> {
    if axis_coords.is_empty() || axis_coords.iter().any(|v| !v.is_finite()) {
        return Err(NufftError::DegenerateGeometry { axis });
    }
    let min = axis_coords.iter().copied().fold(f64::INFINITY, f64::min);
    let scale = -(n as f64 / 2.0) / min;
    if !scale.is_finite() || scale == 0.0 {
        return Err(NufftError::DegenerateGeometry { axis });
    }
    Ok(scale)
}

/// Normalize 3D knots with the [`Normalization::AxisSpacing`] convention.
///
/// `axes[d]` holds the physical sample coordinates of grid axis `d`; only
/// its minimum is used.
pub fn normalize_3d(
    knots: &[[f64; 3]],
    shape: [usize; 3],
    axes: [&[f64]; 3],
) -> Result<Vec<[f64; 3]>, NufftError> {
    check_finite(knots)?;
    let mut factor = [0.0f64; 3];
    for d in 0..3 {
        let scale = axis_scale(axes[d], shape[d], d)?;
        factor[d] = TAU * scale / shape[d] as f64;
    }
    Ok(knots
        .iter()
        .map(|k| core::array::from_fn(|d| wrap_to_period(factor[d] * k[d])))
        .collect())
}
