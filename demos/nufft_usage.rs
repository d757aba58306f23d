//! Basic usage of the 1D and 3D type-II NUFFT entry points.

use fgg_nufft::direct::type2_direct_1d;
use fgg_nufft::knots::normalize_1d;
use fgg_nufft::{nufft1d_type2, nufft3d_type2, Complex64};

fn main() {
    println!("=== fgg-nufft usage ===\n");

    // 1. 1D: spectrum with energy at frequencies 0 and +1.
    println!("1. One-dimensional transform");
    let mut grid = vec![Complex64::zero(); 16];
    grid[8] = Complex64::new(1.0, 0.0);
    grid[9] = Complex64::new(0.5, 0.0);
    let knots = [0.0, 0.1, 0.35, 0.4, 0.9, 1.0];

    for accuracy in [3, 6, 9, 12] {
        let out = nufft1d_type2(&grid, &knots, Some(accuracy)).unwrap();
        let normalized = normalize_1d(&knots, grid.len()).unwrap();
        let exact = type2_direct_1d(&grid, &normalized).unwrap();
        let err = out
            .values
            .iter()
            .zip(exact.iter())
            .map(|(a, b)| (*a - *b).norm())
            .fold(0.0, f64::max);
        println!("   accuracy {accuracy:>2}: max error {err:.2e}");
    }

    // 2. 3D: all-ones cube sampled at the physical origin.
    println!("\n2. Three-dimensional transform");
    let grid = vec![Complex64::new(1.0, 0.0); 8 * 8 * 8];
    let axis: Vec<f64> = (0..8).map(|i| (i as f64 - 4.0) * 0.25).collect();
    let knots = [[0.0, 0.0, 0.0], [0.25, -0.5, 0.1]];
    let out = nufft3d_type2(&grid, [8, 8, 8], &knots, [&axis, &axis, &axis], Some(12)).unwrap();
    println!("   normalization: {:?}", out.normalization);
    println!("   knot count scale: {}", out.knot_count_scale);
    for (k, v) in knots.iter().zip(out.values.iter()) {
        println!("   f({k:?}) = {:.6}{:+.6}i", v.re, v.im);
    }
}
