//! Oversampled spatial grid.
//!
//! The deconvolved spectrum is zero-padded to `M_r = R·N` samples per axis
//! (original data in the middle) and taken to the spatial domain with a
//! centred inverse FFT. The result is stored in centred order: spatial node
//! `j` of an axis lives at index `(j + M_r/2) mod M_r`.

use alloc::vec;
use alloc::vec::Vec;

use crate::fft::ScalarFftImpl;
use crate::ndfft::ifftn_centered;
use crate::nufft::NufftError;
use crate::num::Complex64;

/// Spatial samples on the oversampled ring, centred storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct OversampledGrid<const D: usize> {
    data: Vec<Complex64>,
    shape: [usize; D],
}

impl<const D: usize> OversampledGrid<D> {
    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element strides of each axis in the flat buffer.
    pub fn strides(&self) -> [usize; D] {
        let mut strides = [1usize; D];
        for d in 1..D {
            strides[d] = strides[d - 1] * self.shape[d - 1];
        }
        strides
    }

    /// Sample at spatial node `node` (each component in `0..M_r`).
    pub fn at_node(&self, node: [usize; D]) -> Option<Complex64> {
        let strides = self.strides();
        let mut idx = 0;
        for d in 0..D {
            if node[d] >= self.shape[d] {
                return None;
            }
            let m_r = self.shape[d];
            idx += ((node[d] + m_r / 2) % m_r) * strides[d];
        }
        self.data.get(idx).copied()
    }
}

/// Zero-pad `grid` (shape `shape`) into the middle of an `oversampled` array.
pub fn pad_centered<const D: usize>(
    grid: &[Complex64],
    shape: [usize; D],
    oversampled: [usize; D],
) -> Vec<Complex64> {
    let total: usize = oversampled.iter().product();
    let mut padded = vec![Complex64::zero(); total];
    let mut dst_strides = [1usize; D];
    for d in 1..D {
        dst_strides[d] = dst_strides[d - 1] * oversampled[d - 1];
    }
    let base: usize = (0..D)
        .map(|d| (oversampled[d] - shape[d]) / 2 * dst_strides[d])
        .sum();
    let mut coord = [0usize; D];
    for &value in grid {
        let offset: usize = coord
            .iter()
            .zip(dst_strides.iter())
            .map(|(c, s)| c * s)
            .sum();
        padded[base + offset] = value;
        for (c, &n) in coord.iter_mut().zip(shape.iter()) {
            *c += 1;
            if *c < n {
                break;
            }
            *c = 0;
        }
    }
    padded
}

/// Pad `deconvolved` and run the centred inverse FFT.
pub fn oversample<const D: usize>(
    deconvolved: &[Complex64],
    shape: [usize; D],
    oversampled: [usize; D],
    fft: &ScalarFftImpl<f64>,
) -> Result<OversampledGrid<D>, NufftError> {
    let expected: usize = shape.iter().product();
    if deconvolved.len() != expected {
        return Err(NufftError::DimensionMismatch {
            expected,
            found: deconvolved.len(),
        });
    }
    let mut data = pad_centered(deconvolved, shape, oversampled);
    ifftn_centered(&mut data, &oversampled, fft)?;
    Ok(OversampledGrid {
        data,
        shape: oversampled,
    })
}
