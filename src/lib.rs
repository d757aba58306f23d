//! # fgg-nufft - Type-II non-uniform FFT by fast Gaussian gridding
//!
//! Evaluates a uniformly sampled spectrum `F[k]` at arbitrary, non-uniformly
//! spaced knots `x`:
//!
//! ```text
//! f(x) = Σ_k F[k]·exp(i·k·x),   k ∈ −N/2..N/2 on every axis
//! ```
//!
//! in `O(∏N·log ∏N + M·(2·M_sp)^D)` instead of the `O(M·∏N)` direct sum.
//! The spectrum is deconvolved by the Gaussian kernel's Fourier coefficients,
//! zero-padded to twice its size and inverse transformed; each knot then
//! gathers a truncated Gaussian window of the oversampled grid (fast Gaussian
//! gridding after Greengard & Lee).
//!
//! ## Features
//!
//! - **1D and 3D entry points** with their own knot normalization conventions
//! - **Reusable plans** for 1D, 2D and 3D grids on pre-normalized knots
//! - **Accuracy knob** from ~1e-3 (`3`) to double precision (`12`)
//! - **no_std + alloc** core, all math through `libm`
//! - **Parallel knot loop** (optional)
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` impls
//! - `parallel`: split the knot loop across the Rayon pool
//! - `verbose-logging`: `log` records for plan, oversampling and convolution
//! - `internal-tests`: property tests through `proptest`
//!
//! ## Runtime configuration
//!
//! With `parallel` enabled, `NUFFT_PAR_KNOT_THRESHOLD`,
//! `NUFFT_PAR_PER_CORE_WORK` and `NUFFT_PAR_THREADS` tune when the knot loop
//! goes parallel; `convolve::set_parallel_knot_threshold` and
//! `convolve::set_parallel_knot_threads` override them at runtime.
//!
//! ## Example
//!
//! ```
//! use fgg_nufft::{nufft3d_type2, Complex64};
//!
//! let grid = vec![Complex64::new(1.0, 0.0); 64];
//! let axis = [-2.0, -1.0, 0.0, 1.0];
//! let out = nufft3d_type2(&grid, [4, 4, 4], &[[0.0; 3]], [&axis, &axis, &axis], Some(12))
//!     .unwrap();
//! assert!((out.values[0].re - 64.0).abs() < 1e-6);
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "verbose-logging")]
macro_rules! nufft_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[cfg(not(feature = "verbose-logging"))]
macro_rules! nufft_debug {
    ($($arg:tt)*) => {};
}

/// Scalar float trait and complex numbers
pub mod num;

/// Fast Fourier Transform (FFT) implementations
///
/// Stockham radix-2 for powers of two, Bluestein for every other length.
pub mod fft;

/// N-dimensional FFT operations
///
/// Row-column transforms over flat buffers plus `fftshift`/`ifftshift`.
pub mod ndfft;

/// Knot normalization into `[0, 2π)`
pub mod knots;

/// Spreading parameters and the Gaussian spreading table
///
/// Accuracy calibration, oversampling ratio and the knot-independent kernel
/// falloff `E_3`.
pub mod spread;

/// Deconvolution filter (`E_4`)
pub mod deconvolve;

/// Oversampled grid transform
///
/// Zero-padding and centred inverse FFT into the spatial domain.
pub mod oversample;

/// Per-knot convolution engine
///
/// Separable Gaussian gathering with periodic wraparound, optionally in
/// parallel.
pub mod convolve;

/// Brute-force type-II transform
pub mod direct;

/// NUFFT entry points, plans and errors
pub mod nufft;

pub use fft::{FftError, FftPlanner};
pub use knots::Normalization;
pub use nufft::{nufft1d_type2, nufft3d_type2, Nufft1dOutput, Nufft3dOutput, NufftError, NufftPlan};
pub use num::{Complex, Complex32, Complex64, Float};
pub use spread::{DEFAULT_ACCURACY, MAX_ACCURACY};
