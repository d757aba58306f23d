//! Fast Fourier Transform (FFT) algorithms.
//!
//! Power-of-two lengths run through a Stockham auto-sort radix-2 kernel;
//! every other length goes through Bluestein's chirp-z reformulation on top
//! of it. Oversampled gridding lengths are `2·N` for arbitrary even `N`, so
//! both paths are needed. A [`FftPlanner`] caches twiddle factors and
//! Bluestein chirps so repeated transforms of the same length only pay for
//! table construction once.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use hashbrown::HashMap;

pub use crate::num::{Complex, Complex32, Complex64, Float};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    EmptyInput,
    MismatchedLengths,
    InvalidStride,
    /// The transform length cannot be represented exactly in the float type.
    LengthOverflow,
}

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftError::EmptyInput => write!(f, "input slice is empty"),
            FftError::MismatchedLengths => write!(f, "buffer lengths do not match"),
            FftError::InvalidStride => write!(f, "stride must be non-zero"),
            FftError::LengthOverflow => {
                write!(f, "transform length is not exactly representable")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

type BluesteinPair<T> = (Arc<[Complex<T>]>, Arc<[Complex<T>]>);

pub struct FftPlanner<T: Float> {
    /// Twiddle tables keyed by transform size `n`. The table for `n` has
    /// `n/2` entries holding `exp(-2πi k / n)`.
    cache: HashMap<usize, Arc<[Complex<T>]>>,
    /// Bluestein chirp and the transformed convolution kernel keyed by `n`.
    bluestein_cache: HashMap<usize, BluesteinPair<T>>,
    scratch: Vec<Complex<T>>,
}

impl<T: Float> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FftPlanner<T> {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            bluestein_cache: HashMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Retrieve the twiddle table for a transform of size `n`.
    ///
    /// Each factor is evaluated directly rather than by recurrence so the
    /// table stays accurate to the last bit for long double-precision
    /// transforms.
    pub fn get_twiddles(&mut self, n: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        if let Some(table) = self.cache.get(&n) {
            return Ok(Arc::clone(table));
        }
        let len = T::from_usize(n).ok_or(FftError::LengthOverflow)?;
        let step = -T::from_f64(2.0) * T::pi() / len;
        let table: Vec<Complex<T>> = (0..n / 2)
            .map(|k| {
                let k = T::from_usize(k).unwrap_or_else(T::zero);
                Complex::expi(step * k)
            })
            .collect();
        let table: Arc<[Complex<T>]> = Arc::from(table);
        self.cache.insert(n, Arc::clone(&table));
        Ok(table)
    }

    /// Chirp `exp(-iπ j²/n)` and the forward FFT of the padded conjugate
    /// chirp used by Bluestein's algorithm for length `n`.
    pub fn get_bluestein(&mut self, n: usize) -> Result<BluesteinPair<T>, FftError> {
        if let Some(pair) = self.bluestein_cache.get(&n) {
            return Ok((Arc::clone(&pair.0), Arc::clone(&pair.1)));
        }
        let m = (2 * n - 1).next_power_of_two();
        let len = T::from_usize(n).ok_or(FftError::LengthOverflow)?;
        let mut chirp: Vec<Complex<T>> = Vec::with_capacity(n);
        let mut b: Vec<Complex<T>> = vec![Complex::zero(); m];
        for (j, slot) in b.iter_mut().take(n).enumerate() {
            // j² mod 2n keeps the angle small without changing the chirp.
            let phase = (j * j) % (2 * n);
            let phase = T::from_usize(phase).ok_or(FftError::LengthOverflow)?;
            let angle = T::pi() * phase / len;
            chirp.push(Complex::expi(-angle));
            *slot = Complex::expi(angle);
        }
        for j in 1..n {
            b[m - j] = b[j];
        }
        let twiddles = self.get_twiddles(m)?;
        stockham(&mut b, &twiddles, &mut self.scratch);
        let pair: BluesteinPair<T> = (Arc::from(chirp), Arc::from(b));
        self.bluestein_cache
            .insert(n, (Arc::clone(&pair.0), Arc::clone(&pair.1)));
        Ok(pair)
    }
}

/// Stockham auto-sort radix-2 FFT for power-of-two `data.len()`.
///
/// `twiddles` must be the table for `data.len()`. `scratch` is grown as
/// needed and left with unspecified contents.
fn stockham<T: Float>(
    data: &mut [Complex<T>],
    twiddles: &[Complex<T>],
    scratch: &mut Vec<Complex<T>>,
) {
    let n = data.len();
    debug_assert!(n.is_power_of_two());
    if n < 2 {
        return;
    }
    if scratch.len() < n {
        scratch.resize(n, Complex::zero());
    }
    let mut in_data = true;
    // n1 = number of groups, n2 = size of each group in this pass.
    let mut n1 = 1usize;
    let mut n2 = n;
    while n1 < n {
        n2 >>= 1;
        let (src, dst): (&[Complex<T>], &mut [Complex<T>]) = if in_data {
            (&*data, &mut scratch[..n])
        } else {
            (&scratch[..n], &mut *data)
        };
        for k in 0..n1 {
            let w = twiddles[k * n2];
            let even = &src[2 * k * n2..2 * k * n2 + n2];
            let odd = &src[2 * k * n2 + n2..2 * (k + 1) * n2];
            let (lo, hi) = dst.split_at_mut((k + n1) * n2);
            let lo = &mut lo[k * n2..(k + 1) * n2];
            let hi = &mut hi[..n2];
            for j in 0..n2 {
                let u = even[j];
                let v = odd[j].mul(w);
                lo[j] = u.add(v);
                hi[j] = u.sub(v);
            }
        }
        in_data = !in_data;
        n1 <<= 1;
    }
    if !in_data {
        data.copy_from_slice(&scratch[..n]);
    }
}

pub trait FftImpl<T: Float> {
    fn fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError>;
    fn ifft(&self, input: &mut [Complex<T>]) -> Result<(), FftError>;
    fn fft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        if input.len() != output.len() {
            return Err(FftError::MismatchedLengths);
        }
        output.copy_from_slice(input);
        self.fft(output)
    }
    fn ifft_out_of_place(
        &self,
        input: &[Complex<T>],
        output: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        if input.len() != output.len() {
            return Err(FftError::MismatchedLengths);
        }
        output.copy_from_slice(input);
        self.ifft(output)
    }
    /// In-place strided FFT: element `i` of the transform lives at
    /// `input[i * stride]`.
    ///
    /// The transform length is `scratch.len()`; the scratch buffer holds the
    /// gathered line while it is transformed.
    fn fft_strided(
        &self,
        input: &mut [Complex<T>],
        stride: usize,
        scratch: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        strided_apply(input, stride, scratch, |line| self.fft(line))
    }
    /// In-place strided IFFT using a caller-provided scratch buffer.
    fn ifft_strided(
        &self,
        input: &mut [Complex<T>],
        stride: usize,
        scratch: &mut [Complex<T>],
    ) -> Result<(), FftError> {
        strided_apply(input, stride, scratch, |line| self.ifft(line))
    }
}

fn strided_apply<T: Float, F>(
    input: &mut [Complex<T>],
    stride: usize,
    scratch: &mut [Complex<T>],
    transform: F,
) -> Result<(), FftError>
where
    F: FnOnce(&mut [Complex<T>]) -> Result<(), FftError>,
{
    if stride == 0 {
        return Err(FftError::InvalidStride);
    }
    let n = scratch.len();
    if n == 0 {
        return Ok(());
    }
    if input.len() < (n - 1) * stride + 1 {
        return Err(FftError::MismatchedLengths);
    }
    for (i, s) in scratch.iter_mut().enumerate() {
        *s = input[i * stride];
    }
    transform(scratch)?;
    for (i, s) in scratch.iter().enumerate() {
        input[i * stride] = *s;
    }
    Ok(())
}

pub struct ScalarFftImpl<T: Float> {
    planner: RefCell<FftPlanner<T>>,
}

impl<T: Float> Default for ScalarFftImpl<T> {
    fn default() -> Self {
        Self {
            planner: RefCell::new(FftPlanner::new()),
        }
    }
}

impl<T: Float> ScalarFftImpl<T> {
    pub fn with_planner(planner: FftPlanner<T>) -> Self {
        Self {
            planner: RefCell::new(planner),
        }
    }

    /// Radix-2 Stockham FFT. Non-power-of-two lengths are forwarded to
    /// [`FftImpl::fft`], which picks Bluestein.
    pub fn stockham_fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if !n.is_power_of_two() {
            return self.fft(input);
        }
        let mut planner = self.planner.borrow_mut();
        let twiddles = planner.get_twiddles(n)?;
        let mut scratch = core::mem::take(&mut planner.scratch);
        stockham(input, &twiddles, &mut scratch);
        planner.scratch = scratch;
        Ok(())
    }

    fn bluestein_fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        let (chirp, kernel, twiddles, mut scratch) = {
            let mut planner = self.planner.borrow_mut();
            let (chirp, kernel) = planner.get_bluestein(n)?;
            let twiddles = planner.get_twiddles(kernel.len())?;
            let scratch = core::mem::take(&mut planner.scratch);
            (chirp, kernel, twiddles, scratch)
        };
        let m = kernel.len();
        let mut a: Vec<Complex<T>> = Vec::with_capacity(m);
        a.extend(input.iter().zip(chirp.iter()).map(|(&x, &c)| x.mul(c)));
        a.resize(m, Complex::zero());
        stockham(&mut a, &twiddles, &mut scratch);
        // Pointwise product, then an inverse FFT written as conj-FFT-conj.
        for (ai, &bi) in a.iter_mut().zip(kernel.iter()) {
            *ai = ai.mul(bi).conj();
        }
        stockham(&mut a, &twiddles, &mut scratch);
        let scale = T::one() / T::from_usize(m).ok_or(FftError::LengthOverflow)?;
        for ((out, ai), &c) in input.iter_mut().zip(a.iter()).zip(chirp.iter()) {
            *out = ai.conj().scale(scale).mul(c);
        }
        self.planner.borrow_mut().scratch = scratch;
        Ok(())
    }

    pub fn fft_vec(&self, input: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let mut out = Vec::from(input);
        self.fft(&mut out)?;
        Ok(out)
    }

    pub fn ifft_vec(&self, input: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let mut out = Vec::from(input);
        self.ifft(&mut out)?;
        Ok(out)
    }
}

impl<T: Float> FftImpl<T> for ScalarFftImpl<T> {
    fn fft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n == 1 {
            return Ok(());
        }
        if n.is_power_of_two() {
            self.stockham_fft(input)
        } else {
            self.bluestein_fft(input)
        }
    }

    /// Inverse FFT normalised by `1/n`.
    fn ifft(&self, input: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = input.len();
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n == 1 {
            return Ok(());
        }
        for c in input.iter_mut() {
            *c = c.conj();
        }
        self.fft(input)?;
        let scale = T::one() / T::from_usize(n).ok_or(FftError::LengthOverflow)?;
        for c in input.iter_mut() {
            *c = c.conj().scale(scale);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn naive_dft(input: &[Complex64]) -> Vec<Complex64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input.iter().enumerate().fold(Complex64::zero(), |acc, (j, &x)| {
                    let angle = -2.0 * core::f64::consts::PI * ((j * k) % n) as f64 / n as f64;
                    acc + x * Complex64::expi(angle)
                })
            })
            .collect()
    }

    #[test]
    fn impulse_transforms_to_ones() {
        let mut data = vec![Complex64::zero(); 8];
        data[0] = Complex64::new(1.0, 0.0);
        let fft = ScalarFftImpl::<f64>::default();
        fft.fft(&mut data).unwrap();
        for c in &data {
            assert!((c.re - 1.0).abs() < 1e-15, "re = {}", c.re);
            assert!(c.im.abs() < 1e-15, "im = {}", c.im);
        }
    }

    #[test]
    fn matches_naive_dft_power_of_two_and_bluestein() {
        let fft = ScalarFftImpl::<f64>::default();
        for &n in &[2usize, 4, 16, 64, 6, 12, 20, 36] {
            let input: Vec<Complex64> = (0..n)
                .map(|i| Complex64::new((i as f64 * 0.7).sin(), (i as f64 * 1.3).cos()))
                .collect();
            let expected = naive_dft(&input);
            let got = fft.fft_vec(&input).unwrap();
            for (a, b) in got.iter().zip(expected.iter()) {
                assert!((a.re - b.re).abs() < 1e-10, "n = {n}: {a:?} vs {b:?}");
                assert!((a.im - b.im).abs() < 1e-10, "n = {n}: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn ifft_inverts_fft() {
        let fft = ScalarFftImpl::<f64>::default();
        for &n in &[1usize, 3, 8, 24, 40] {
            let input: Vec<Complex64> = (0..n)
                .map(|i| Complex64::new(i as f64, -(i as f64) * 0.5))
                .collect();
            let back = fft.ifft_vec(&fft.fft_vec(&input).unwrap()).unwrap();
            for (a, b) in back.iter().zip(input.iter()) {
                assert!((a.re - b.re).abs() < 1e-10);
                assert!((a.im - b.im).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn f32_roundtrip() {
        let fft = ScalarFftImpl::<f32>::default();
        let mut data: Vec<Complex32> = (0..12).map(|i| Complex32::new(i as f32, 0.0)).collect();
        let orig = data.clone();
        fft.fft(&mut data).unwrap();
        fft.ifft(&mut data).unwrap();
        for (a, b) in data.iter().zip(orig.iter()) {
            assert!((a.re - b.re).abs() < 1e-3, "re: {} vs {}", a.re, b.re);
        }
    }

    #[test]
    fn empty_and_mismatched_inputs() {
        let fft = ScalarFftImpl::<f64>::default();
        let mut empty: Vec<Complex64> = vec![];
        assert_eq!(fft.fft(&mut empty), Err(FftError::EmptyInput));
        assert_eq!(fft.ifft(&mut empty), Err(FftError::EmptyInput));
        let input = vec![Complex64::zero(); 2];
        let mut output = vec![Complex64::zero(); 3];
        assert_eq!(
            fft.fft_out_of_place(&input, &mut output),
            Err(FftError::MismatchedLengths)
        );
    }

    #[test]
    fn strided_transform_touches_only_its_line() {
        let fft = ScalarFftImpl::<f64>::default();
        let mut data: Vec<Complex64> = (0..8).map(|i| Complex64::new(i as f64, 0.0)).collect();
        let mut scratch = vec![Complex64::zero(); 4];
        fft.fft_strided(&mut data, 2, &mut scratch).unwrap();
        // Odd positions are untouched.
        for i in (1..8).step_by(2) {
            assert_eq!(data[i].re, i as f64);
        }
        // DC of the even line 0 + 2 + 4 + 6.
        assert!((data[0].re - 12.0).abs() < 1e-12);
        fft.ifft_strided(&mut data, 2, &mut scratch).unwrap();
        for (i, c) in data.iter().enumerate() {
            assert!((c.re - i as f64).abs() < 1e-12);
        }
        assert_eq!(
            fft.fft_strided(&mut data, 0, &mut scratch),
            Err(FftError::InvalidStride)
        );
        let mut short = vec![Complex64::zero(); 3];
        assert_eq!(
            fft.fft_strided(&mut short, 2, &mut scratch),
            Err(FftError::MismatchedLengths)
        );
    }

    #[test]
    fn planner_caches_tables() {
        let mut planner = FftPlanner::<f64>::new();
        let a = planner.get_twiddles(16).unwrap();
        let b = planner.get_twiddles(16).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 8);
        let (chirp, kernel) = planner.get_bluestein(6).unwrap();
        assert_eq!(chirp.len(), 6);
        assert_eq!(kernel.len(), 16);
    }
}

#[cfg(all(feature = "internal-tests", test))]
mod coverage_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_fft_ifft_roundtrip(
            len in 1usize..48,
            ref signal in proptest::collection::vec(-1000.0f64..1000.0, 48),
        ) {
            let mut data: Vec<Complex64> = signal
                .iter()
                .take(len)
                .map(|&x| Complex64::new(x, -x))
                .collect();
            let orig = data.clone();
            let fft = ScalarFftImpl::<f64>::default();
            fft.fft(&mut data).unwrap();
            fft.ifft(&mut data).unwrap();
            for (a, b) in orig.iter().zip(data.iter()) {
                prop_assert!((a.re - b.re).abs() < 1e-8);
                prop_assert!((a.im - b.im).abs() < 1e-8);
            }
        }
    }
}
