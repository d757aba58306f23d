//! Per-knot Gaussian convolution engine.
//!
//! Each knot gathers a `(2·M_sp)^D` window of the oversampled grid weighted
//! by a separable truncated Gaussian. Per axis the weight of tap `l` is
//! `E1 · E2^l · E_3[l]`: `E1` and the ratio `E2` are the only exponentials
//! evaluated per knot, the powers of `E2` come from a multiply/divide
//! recursion and `E_3` is the precomputed [`SpreadingTable`].
//!
//! Grid indices wrap periodically with Euclidean modulo, so windows that
//! straddle the ring boundary (or are longer than the ring) stay correct.
//!
//! With the `parallel` feature the knot loop is split across the Rayon pool
//! once the total tap count crosses a threshold. Output order always matches
//! knot order.

use core::f64::consts::{PI, TAU};

use crate::knots::wrap_to_period;
use crate::num::Complex64;
use crate::oversample::OversampledGrid;
use crate::spread::{AxisSpread, SpreadingParams, SpreadingTable, MAX_TAPS};

#[cfg(feature = "parallel")]
use core::sync::atomic::{AtomicUsize, Ordering};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::OnceLock;

/// Override for the knot count above which the loop runs in parallel.
///
/// `0` means no override and the heuristic will be used.
#[cfg(feature = "parallel")]
static PARALLEL_KNOT_THRESHOLD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "parallel")]
static PARALLEL_KNOT_THREAD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "parallel")]
static PARALLEL_ENV: OnceLock<ParallelEnv> = OnceLock::new();

#[cfg(feature = "parallel")]
struct ParallelEnv {
    threshold: usize,
    per_core_work: usize,
    threads: usize,
}

#[cfg(feature = "parallel")]
fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
}

#[cfg(feature = "parallel")]
fn parallel_env() -> &'static ParallelEnv {
    PARALLEL_ENV.get_or_init(|| ParallelEnv {
        threshold: env_usize("NUFFT_PAR_KNOT_THRESHOLD").unwrap_or(0),
        per_core_work: env_usize("NUFFT_PAR_PER_CORE_WORK").unwrap_or(1 << 16),
        threads: env_usize("NUFFT_PAR_THREADS")
            .unwrap_or_else(|| num_cpus::get().max(1)),
    })
}

#[cfg(feature = "parallel")]
/// Set a custom minimum knot count for the parallel convolution loop.
///
/// Passing `0` reverts to `NUFFT_PAR_KNOT_THRESHOLD` or the work heuristic.
pub fn set_parallel_knot_threshold(threshold: usize) {
    PARALLEL_KNOT_THRESHOLD_OVERRIDE.store(threshold, Ordering::Relaxed);
}

#[cfg(feature = "parallel")]
/// Override the number of chunks the knot loop is split into. `0` uses
/// `NUFFT_PAR_THREADS` or the number of CPUs.
pub fn set_parallel_knot_threads(threads: usize) {
    PARALLEL_KNOT_THREAD_OVERRIDE.store(threads, Ordering::Relaxed);
}

#[cfg(feature = "parallel")]
fn parallel_knot_threads() -> usize {
    let override_thr = PARALLEL_KNOT_THREAD_OVERRIDE.load(Ordering::Relaxed);
    if override_thr != 0 {
        return override_thr;
    }
    parallel_env().threads
}

#[cfg(feature = "parallel")]
fn should_parallelize_knots(knots: usize, taps_per_knot: usize) -> bool {
    let override_thr = PARALLEL_KNOT_THRESHOLD_OVERRIDE.load(Ordering::Relaxed);
    let env = parallel_env();
    let threshold = if override_thr != 0 {
        override_thr
    } else {
        env.threshold
    };
    if threshold != 0 {
        return knots >= threshold;
    }
    let threads = parallel_knot_threads();
    threads > 1 && knots.saturating_mul(taps_per_knot) >= env.per_core_work.saturating_mul(threads)
}

#[cfg(all(feature = "parallel", feature = "internal-tests"))]
#[doc(hidden)]
pub fn __test_parallel_knot_threshold() -> usize {
    let override_thr = PARALLEL_KNOT_THRESHOLD_OVERRIDE.load(Ordering::Relaxed);
    if override_thr != 0 {
        override_thr
    } else {
        parallel_env().threshold
    }
}

#[cfg(all(feature = "parallel", feature = "internal-tests"))]
#[doc(hidden)]
pub fn __test_should_parallelize_knots(knots: usize, taps_per_knot: usize) -> bool {
    should_parallelize_knots(knots, taps_per_knot)
}

/// Separable weights and wrapped flat offsets of one knot along one axis.
#[derive(Clone, Copy)]
struct AxisTaps {
    /// `E1` for this axis.
    peak: f64,
    /// `E2[k]·E_3[k]`.
    weights: [f64; MAX_TAPS],
    /// Flat buffer offset of each tap (already multiplied by the axis stride).
    offsets: [usize; MAX_TAPS],
}

impl AxisTaps {
    #[inline]
    fn for_coordinate(
        coord: f64,
        axis: &AxisSpread,
        table: &SpreadingTable,
        spread: usize,
        stride: usize,
    ) -> Self {
        let m_r = axis.oversampled;
        let m_rf = m_r as f64;
        let m = libm::floor(m_rf * coord / TAU);
        let x = coord - m * PI / (m_rf / 2.0);
        let peak = libm::exp(-(x * x) / (4.0 * axis.tau));
        let ratio = libm::exp(x * PI / (m_rf * axis.tau));

        let taps = 2 * spread;
        let mut e2 = [0.0f64; MAX_TAPS];
        e2[spread - 1] = 1.0;
        for k in spread..taps {
            e2[k] = e2[k - 1] * ratio;
        }
        for k in (0..spread - 1).rev() {
            e2[k] = e2[k + 1] / ratio;
        }

        let mut weights = [0.0f64; MAX_TAPS];
        let mut offsets = [0usize; MAX_TAPS];
        let ring = m_r as isize;
        let half = m_r / 2;
        let m = m as isize;
        let e3 = table.factors();
        for k in 0..taps {
            weights[k] = e2[k] * e3[k];
            let l = k as isize + 1 - spread as isize;
            let node = (m + l).rem_euclid(ring) as usize;
            offsets[k] = ((node + half) % m_r) * stride;
        }
        Self {
            peak,
            weights,
            offsets,
        }
    }
}

#[inline]
fn gather_1d(data: &[Complex64], x: &AxisTaps, taps: usize) -> Complex64 {
    let (mut re, mut im) = (0.0, 0.0);
    for kx in 0..taps {
        let w = x.weights[kx];
        let v = data[x.offsets[kx]];
        re += w * v.re;
        im += w * v.im;
    }
    Complex64::new(re * x.peak, im * x.peak)
}

#[inline]
fn gather_2d(data: &[Complex64], x: &AxisTaps, y: &AxisTaps, taps: usize) -> Complex64 {
    let (mut re, mut im) = (0.0, 0.0);
    for ky in 0..taps {
        let wy = y.weights[ky];
        let row = y.offsets[ky];
        for kx in 0..taps {
            let w = wy * x.weights[kx];
            let v = data[row + x.offsets[kx]];
            re += w * v.re;
            im += w * v.im;
        }
    }
    let peak = x.peak * y.peak;
    Complex64::new(re * peak, im * peak)
}

#[inline]
fn gather_3d(
    data: &[Complex64],
    x: &AxisTaps,
    y: &AxisTaps,
    z: &AxisTaps,
    taps: usize,
) -> Complex64 {
    let (mut re, mut im) = (0.0, 0.0);
    for kz in 0..taps {
        let wz = z.weights[kz];
        let plane = z.offsets[kz];
        for ky in 0..taps {
            let wyz = wz * y.weights[ky];
            let row = plane + y.offsets[ky];
            for kx in 0..taps {
                let w = wyz * x.weights[kx];
                let v = data[row + x.offsets[kx]];
                re += w * v.re;
                im += w * v.im;
            }
        }
    }
    let peak = x.peak * y.peak * z.peak;
    Complex64::new(re * peak, im * peak)
}

/// Interpolate the oversampled grid at one normalized knot.
///
/// Coordinates are folded into `[0, 2π)` first, so any finite value is
/// accepted.
pub fn interpolate_knot<const D: usize>(
    grid: &OversampledGrid<D>,
    params: &SpreadingParams<D>,
    tables: &[SpreadingTable; D],
    knot: &[f64; D],
) -> Complex64 {
    let spread = params.spread();
    let taps = params.taps();
    let strides = grid.strides();
    let axes = params.axes();
    let per_axis: [AxisTaps; D] = core::array::from_fn(|d| {
        AxisTaps::for_coordinate(
            wrap_to_period(knot[d]),
            &axes[d],
            &tables[d],
            spread,
            strides[d],
        )
    });
    let data = grid.data();
    match per_axis.as_slice() {
        [x] => gather_1d(data, x, taps),
        [x, y] => gather_2d(data, x, y, taps),
        [x, y, z] => gather_3d(data, x, y, z, taps),
        _ => unreachable!("SpreadingParams rejects dimensions above 3"),
    }
}

/// Interpolate at every knot, writing `out[i]` for `knots[i]`.
///
/// `out` and `knots` must have the same length; extra elements of the longer
/// slice are left untouched.
pub fn interpolate_into<const D: usize>(
    grid: &OversampledGrid<D>,
    params: &SpreadingParams<D>,
    tables: &[SpreadingTable; D],
    knots: &[[f64; D]],
    out: &mut [Complex64],
) {
    #[cfg(feature = "parallel")]
    {
        let taps_per_knot = params.taps().pow(D as u32);
        if should_parallelize_knots(knots.len(), taps_per_knot) {
            let chunk = knots.len().div_ceil(parallel_knot_threads()).max(1);
            nufft_debug!(
                "convolve: {} knots in parallel, chunk {}",
                knots.len(),
                chunk
            );
            out.par_iter_mut()
                .zip(knots.par_iter())
                .with_min_len(chunk)
                .for_each(|(slot, knot)| {
                    *slot = interpolate_knot(grid, params, tables, knot);
                });
            return;
        }
    }
    for (slot, knot) in out.iter_mut().zip(knots.iter()) {
        *slot = interpolate_knot(grid, params, tables, knot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deconvolve::{deconvolve, DeconvolutionFilter};
    use crate::fft::ScalarFftImpl;
    use crate::oversample::oversample;
    use alloc::vec;
    use alloc::vec::Vec;

    fn setup_1d(
        grid: &[Complex64],
        accuracy: u32,
    ) -> (OversampledGrid<1>, SpreadingParams<1>, [SpreadingTable; 1]) {
        let params = SpreadingParams::new([grid.len()], accuracy).unwrap();
        let tables = [SpreadingTable::build(&params.axes()[0], params.spread())];
        let filters = [DeconvolutionFilter::build(&params.axes()[0])];
        let fft = ScalarFftImpl::<f64>::default();
        let deconvolved = deconvolve(grid, &filters, 1.0);
        let over = oversample(
            &deconvolved,
            params.shape(),
            params.oversampled_shape(),
            &fft,
        )
        .unwrap();
        (over, params, tables)
    }

    #[test]
    fn e2_recursion_matches_powers() {
        let params = SpreadingParams::new([8], 6).unwrap();
        let axis = params.axes()[0];
        let table = SpreadingTable::build(&axis, 6);
        let coord = 1.234;
        let t = AxisTaps::for_coordinate(coord, &axis, &table, 6, 1);
        let m_r = axis.oversampled as f64;
        let m = libm::floor(m_r * coord / TAU);
        let x = coord - m * TAU / m_r;
        let ratio = libm::exp(x * PI / (m_r * axis.tau));
        for k in 0..12 {
            let l = k as i32 + 1 - 6;
            let expect = libm::pow(ratio, l as f64) * table.factors()[k];
            assert!((t.weights[k] - expect).abs() < 1e-12 * expect.max(1e-300));
        }
    }

    #[test]
    fn window_wraps_around_ring() {
        let params = SpreadingParams::new([4], 6).unwrap();
        let axis = params.axes()[0];
        let table = SpreadingTable::build(&axis, 6);
        let t = AxisTaps::for_coordinate(0.01, &axis, &table, 6, 1);
        for &off in &t.offsets[..12] {
            assert!(off < axis.oversampled);
        }
        // Tap l = 0 sits on node 0, stored at index M_r/2.
        assert_eq!(t.offsets[5], 4);
    }

    #[test]
    fn constant_spectrum_dc_is_recovered() {
        // A pure DC spectrum gives the same value at every knot.
        let mut grid = vec![Complex64::zero(); 8];
        grid[4] = Complex64::new(1.0, 0.0);
        let (over, params, tables) = setup_1d(&grid, 12);
        for &x in &[0.0, 0.3, 3.0, 6.2] {
            let v = interpolate_knot(&over, &params, &tables, &[x]);
            assert!(
                (v.re - 1.0).abs() < 1e-9 && v.im.abs() < 1e-9,
                "x {x}: {v:?}"
            );
        }
    }

    #[test]
    fn interpolate_into_preserves_order() {
        let grid: Vec<Complex64> = (0..8)
            .map(|i| Complex64::new(i as f64 * 0.25, 1.0 - i as f64 * 0.1))
            .collect();
        let (over, params, tables) = setup_1d(&grid, 9);
        let knots: Vec<[f64; 1]> = (0..40).map(|i| [i as f64 * 0.157]).collect();
        let mut out = vec![Complex64::zero(); knots.len()];
        interpolate_into(&over, &params, &tables, &knots, &mut out);
        for (knot, got) in knots.iter().zip(out.iter()) {
            let single = interpolate_knot(&over, &params, &tables, knot);
            assert_eq!(single, *got);
        }
    }
}
