//! Type-II NUFFT entry points and reusable plans.
//!
//! A [`NufftPlan`] holds everything that depends only on the grid shape and
//! accuracy (spreading parameters, `E_3` tables, `E_4` filters). Running it
//! deconvolves the uniform spectrum, oversamples it into the spatial domain
//! and interpolates at each knot with a truncated Gaussian.
//!
//! [`nufft1d_type2`] and [`nufft3d_type2`] add knot normalization on top:
//!
//! ```
//! use fgg_nufft::{nufft1d_type2, Complex64};
//!
//! let mut grid = vec![Complex64::zero(); 8];
//! grid[4] = Complex64::new(1.0, 0.0);
//! let out = nufft1d_type2(&grid, &[0.0, 0.5, 1.0], Some(9)).unwrap();
//! for v in &out.values {
//!     assert!((v.re - 1.0).abs() < 1e-7);
//! }
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::convolve::{interpolate_into, interpolate_knot};
use crate::deconvolve::{deconvolve, DeconvolutionFilter};
use crate::fft::{FftError, ScalarFftImpl};
use crate::knots::{check_finite, normalize_1d, normalize_3d, Normalization};
use crate::num::Complex64;
use crate::oversample::{oversample, OversampledGrid};
use crate::spread::{SpreadingParams, SpreadingTable, DEFAULT_ACCURACY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NufftError {
    /// Knot bandwidth or axis spacing is zero (or not finite) on `axis`.
    DegenerateGeometry { axis: usize },
    DimensionMismatch { expected: usize, found: usize },
    OddAxisLength { axis: usize, len: usize },
    EmptyGrid,
    AccuracyOutOfRange { accuracy: u32 },
    NonFiniteKnot { index: usize },
    Fft(FftError),
}

impl fmt::Display for NufftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NufftError::DegenerateGeometry { axis } => {
                write!(f, "Degenerate knot geometry on axis {axis}")
            }
            NufftError::DimensionMismatch { expected, found } => {
                write!(f, "Dimension mismatch: expected {expected}, found {found}")
            }
            NufftError::OddAxisLength { axis, len } => {
                write!(f, "Axis {axis} has odd length {len}")
            }
            NufftError::EmptyGrid => write!(f, "Empty grid"),
            NufftError::AccuracyOutOfRange { accuracy } => {
                write!(f, "Accuracy {accuracy} out of range")
            }
            NufftError::NonFiniteKnot { index } => write!(f, "Knot {index} is not finite"),
            NufftError::Fft(e) => write!(f, "FFT failed: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NufftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NufftError::Fft(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FftError> for NufftError {
    fn from(e: FftError) -> Self {
        NufftError::Fft(e)
    }
}

/// Result of [`nufft1d_type2`].
#[derive(Debug, Clone, PartialEq)]
pub struct Nufft1dOutput {
    /// One value per knot, in knot order.
    pub values: Vec<Complex64>,
    /// Always [`Normalization::KnotExtrema`].
    pub normalization: Normalization,
}

/// Result of [`nufft3d_type2`].
#[derive(Debug, Clone, PartialEq)]
pub struct Nufft3dOutput {
    /// One value per knot, in knot order, divided by the knot count.
    pub values: Vec<Complex64>,
    /// Always [`Normalization::AxisSpacing`].
    pub normalization: Normalization,
    /// Factor applied to every value, `1/M`.
    pub knot_count_scale: f64,
}

/// Precomputed state for repeated type-II transforms on a fixed grid shape.
///
/// Knots passed to a plan are already normalized; each coordinate is folded
/// into `[0, 2π)` and interpreted as the phase `x` in `Σ F[k]·exp(i·k·x)`.
#[derive(Debug, Clone)]
pub struct NufftPlan<const D: usize> {
    params: SpreadingParams<D>,
    tables: [SpreadingTable; D],
    filters: [DeconvolutionFilter; D],
}

impl<const D: usize> NufftPlan<D> {
    pub fn new(shape: [usize; D], accuracy: u32) -> Result<Self, NufftError> {
        Ok(Self::from_params(SpreadingParams::new(shape, accuracy)?))
    }

    /// Build the tables for already validated parameters.
    pub fn from_params(params: SpreadingParams<D>) -> Self {
        let axes = params.axes();
        let tables = core::array::from_fn(|d| SpreadingTable::build(&axes[d], params.spread()));
        let filters = core::array::from_fn(|d| DeconvolutionFilter::build(&axes[d]));
        nufft_debug!(
            "plan: shape {:?}, oversampled {:?}, spread {}",
            params.shape(),
            params.oversampled_shape(),
            params.spread()
        );
        Self {
            params,
            tables,
            filters,
        }
    }

    pub fn params(&self) -> &SpreadingParams<D> {
        &self.params
    }

    pub fn spreading_tables(&self) -> &[SpreadingTable; D] {
        &self.tables
    }

    pub fn deconvolution_filters(&self) -> &[DeconvolutionFilter; D] {
        &self.filters
    }

    /// Deconvolve `grid`, scale it by `scale`, and take it to the
    /// oversampled spatial domain.
    pub fn oversample(
        &self,
        grid: &[Complex64],
        scale: f64,
        fft: &ScalarFftImpl<f64>,
    ) -> Result<OversampledGrid<D>, NufftError> {
        let expected = self.params.grid_len();
        if grid.len() != expected {
            return Err(NufftError::DimensionMismatch {
                expected,
                found: grid.len(),
            });
        }
        let deconvolved = deconvolve(grid, &self.filters, scale);
        let over = oversample(
            &deconvolved,
            self.params.shape(),
            self.params.oversampled_shape(),
            fft,
        )?;
        nufft_debug!("oversample: {} samples", over.len());
        Ok(over)
    }

    /// Interpolate an oversampled grid at normalized knots.
    pub fn interpolate(
        &self,
        grid: &OversampledGrid<D>,
        knots: &[[f64; D]],
    ) -> Result<Vec<Complex64>, NufftError> {
        let expected: usize = self.params.oversampled_shape().iter().product();
        if grid.shape() != self.params.oversampled_shape() {
            return Err(NufftError::DimensionMismatch {
                expected,
                found: grid.len(),
            });
        }
        check_finite(knots)?;
        let mut out = vec![Complex64::zero(); knots.len()];
        interpolate_into(grid, &self.params, &self.tables, knots, &mut out);
        nufft_debug!("interpolate: {} knots", knots.len());
        Ok(out)
    }

    /// Value at a single normalized knot.
    pub fn interpolate_one(
        &self,
        grid: &OversampledGrid<D>,
        knot: &[f64; D],
    ) -> Result<Complex64, NufftError> {
        if grid.shape() != self.params.oversampled_shape() {
            return Err(NufftError::DimensionMismatch {
                expected: self.params.oversampled_shape().iter().product(),
                found: grid.len(),
            });
        }
        check_finite(core::slice::from_ref(knot))?;
        Ok(interpolate_knot(grid, &self.params, &self.tables, knot))
    }

    /// Full transform without knot-count scaling.
    pub fn execute(
        &self,
        grid: &[Complex64],
        knots: &[[f64; D]],
    ) -> Result<Vec<Complex64>, NufftError> {
        check_finite(knots)?;
        let fft = ScalarFftImpl::<f64>::default();
        let over = self.oversample(grid, 1.0, &fft)?;
        self.interpolate(&over, knots)
    }
}

/// Type-II NUFFT of a 1D spectrum at arbitrary knots.
///
/// Knots are mapped to `[0, 2π)` with [`Normalization::KnotExtrema`]:
/// the knot extrema span the `N` grid positions. `accuracy` defaults to
/// [`DEFAULT_ACCURACY`].
pub fn nufft1d_type2(
    grid: &[Complex64],
    knots: &[f64],
    accuracy: Option<u32>,
) -> Result<Nufft1dOutput, NufftError> {
    let params = SpreadingParams::new([grid.len()], accuracy.unwrap_or(DEFAULT_ACCURACY))?;
    let normalized: Vec<[f64; 1]> = normalize_1d(knots, grid.len())?
        .into_iter()
        .map(|x| [x])
        .collect();
    let plan = NufftPlan::from_params(params);
    let values = plan.execute(grid, &normalized)?;
    Ok(Nufft1dOutput {
        values,
        normalization: Normalization::KnotExtrema,
    })
}

/// Type-II NUFFT of a 3D spectrum at arbitrary knots.
///
/// `grid` has shape `shape` with axis 0 (x) fastest. `axes[d]` holds the
/// physical sample coordinates of axis `d`; knots are mapped with
/// [`Normalization::AxisSpacing`]. Output values are divided by the number
/// of knots.
pub fn nufft3d_type2(
    grid: &[Complex64],
    shape: [usize; 3],
    knots: &[[f64; 3]],
    axes: [&[f64]; 3],
    accuracy: Option<u32>,
) -> Result<Nufft3dOutput, NufftError> {
    let params = SpreadingParams::new(shape, accuracy.unwrap_or(DEFAULT_ACCURACY))?;
    let expected = params.grid_len();
    if grid.len() != expected {
        return Err(NufftError::DimensionMismatch {
            expected,
            found: grid.len(),
        });
    }
    let normalized = normalize_3d(knots, shape, axes)?;
    if normalized.is_empty() {
        return Ok(Nufft3dOutput {
            values: Vec::new(),
            normalization: Normalization::AxisSpacing,
            knot_count_scale: 1.0,
        });
    }
    let plan = NufftPlan::from_params(params);
    let knot_count_scale = 1.0 / normalized.len() as f64;
    let fft = ScalarFftImpl::<f64>::default();
    let over = plan.oversample(grid, knot_count_scale, &fft)?;
    let values = plan.interpolate(&over, &normalized)?;
    Ok(Nufft3dOutput {
        values,
        normalization: Normalization::AxisSpacing,
        knot_count_scale,
    })
}
