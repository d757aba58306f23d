//! Multi-dimensional FFT over flat buffers.
//!
//! Buffers are stored with axis 0 varying fastest, so element
//! `(i0, i1, i2)` of a `[n0, n1, n2]` array lives at `i0 + n0·(i1 + n1·i2)`.
//! Each axis is transformed line by line through the strided 1D routines
//! (row-column algorithm). The centred variants wrap the transform in
//! `ifftshift`/`fftshift` so zero frequency sits at index `n/2` on both
//! sides.

use alloc::vec;
use alloc::vec::Vec;

use crate::fft::{Complex, FftError, FftImpl, Float, ScalarFftImpl};

fn validate_shape(len: usize, shape: &[usize]) -> Result<(), FftError> {
    if shape.is_empty() || shape.iter().any(|&n| n == 0) {
        return Err(FftError::EmptyInput);
    }
    if shape.iter().product::<usize>() != len {
        return Err(FftError::MismatchedLengths);
    }
    Ok(())
}

/// Start offsets of every line running along `axis`.
fn line_starts(shape: &[usize], axis: usize) -> impl Iterator<Item = usize> {
    let stride: usize = shape[..axis].iter().product();
    let block = stride * shape[axis];
    let total: usize = shape.iter().product();
    (0..total)
        .step_by(block)
        .flat_map(move |base| (0..stride).map(move |offset| base + offset))
}

fn transform_axes<T: Float>(
    data: &mut [Complex<T>],
    shape: &[usize],
    fft: &ScalarFftImpl<T>,
    inverse: bool,
) -> Result<(), FftError> {
    validate_shape(data.len(), shape)?;
    for axis in 0..shape.len() {
        let n = shape[axis];
        if n == 1 {
            continue;
        }
        let stride: usize = shape[..axis].iter().product();
        let mut line = vec![Complex::<T>::zero(); n];
        for start in line_starts(shape, axis) {
            if inverse {
                fft.ifft_strided(&mut data[start..], stride, &mut line)?;
            } else {
                fft.fft_strided(&mut data[start..], stride, &mut line)?;
            }
        }
    }
    Ok(())
}

/// Forward N-dimensional FFT in place.
pub fn fftn_inplace<T: Float>(
    data: &mut [Complex<T>],
    shape: &[usize],
    fft: &ScalarFftImpl<T>,
) -> Result<(), FftError> {
    transform_axes(data, shape, fft, false)
}

/// Inverse N-dimensional FFT in place, normalised by `1/∏shape`.
pub fn ifftn_inplace<T: Float>(
    data: &mut [Complex<T>],
    shape: &[usize],
    fft: &ScalarFftImpl<T>,
) -> Result<(), FftError> {
    transform_axes(data, shape, fft, true)
}

fn roll_axes<T: Float>(
    data: &mut [Complex<T>],
    shape: &[usize],
    shift_of: fn(usize) -> usize,
) -> Result<(), FftError> {
    validate_shape(data.len(), shape)?;
    let mut line: Vec<Complex<T>> = Vec::new();
    for axis in 0..shape.len() {
        let n = shape[axis];
        let shift = shift_of(n) % n;
        if shift == 0 {
            continue;
        }
        let stride: usize = shape[..axis].iter().product();
        line.resize(n, Complex::zero());
        for start in line_starts(shape, axis) {
            for (i, slot) in line.iter_mut().enumerate() {
                *slot = data[start + i * stride];
            }
            line.rotate_right(shift);
            for (i, &v) in line.iter().enumerate() {
                data[start + i * stride] = v;
            }
        }
    }
    Ok(())
}

/// Move the zero-frequency element from index 0 to index `n/2` on every axis.
pub fn fftshift<T: Float>(data: &mut [Complex<T>], shape: &[usize]) -> Result<(), FftError> {
    roll_axes(data, shape, |n| n / 2)
}

/// Inverse of [`fftshift`]; identical to it for even lengths.
pub fn ifftshift<T: Float>(data: &mut [Complex<T>], shape: &[usize]) -> Result<(), FftError> {
    roll_axes(data, shape, |n| n - n / 2)
}

/// `fftshift(ifftn(ifftshift(data)))`: inverse transform of a centred
/// spectrum into a centred spatial array.
pub fn ifftn_centered<T: Float>(
    data: &mut [Complex<T>],
    shape: &[usize],
    fft: &ScalarFftImpl<T>,
) -> Result<(), FftError> {
    ifftshift(data, shape)?;
    ifftn_inplace(data, shape, fft)?;
    fftshift(data, shape)
}

/// `fftshift(fftn(ifftshift(data)))`, the forward counterpart of
/// [`ifftn_centered`].
pub fn fftn_centered<T: Float>(
    data: &mut [Complex<T>],
    shape: &[usize],
    fft: &ScalarFftImpl<T>,
) -> Result<(), FftError> {
    ifftshift(data, shape)?;
    fftn_inplace(data, shape, fft)?;
    fftshift(data, shape)
}
