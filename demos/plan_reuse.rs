//! Reusing a plan and one oversampled grid across several knot batches.

use std::f64::consts::TAU;

use fgg_nufft::fft::ScalarFftImpl;
use fgg_nufft::{Complex64, NufftPlan};

fn main() {
    let shape = [32, 16];
    let grid: Vec<Complex64> = (0..shape[0] * shape[1])
        .map(|i| Complex64::new((i % 7) as f64 - 3.0, (i % 5) as f64 * 0.5))
        .collect();

    let plan = NufftPlan::new(shape, 9).unwrap();
    println!(
        "plan: shape {:?}, oversampled {:?}, {} taps per axis",
        plan.params().shape(),
        plan.params().oversampled_shape(),
        plan.params().taps()
    );

    // The FFT stage runs once; each batch only pays for interpolation.
    let fft = ScalarFftImpl::<f64>::default();
    let over = plan.oversample(&grid, 1.0, &fft).unwrap();

    for batch in 0..3 {
        let knots: Vec<[f64; 2]> = (0..5)
            .map(|i| {
                let t = (batch * 5 + i) as f64 * 0.37;
                [t % TAU, (2.0 * t) % TAU]
            })
            .collect();
        let values = plan.interpolate(&over, &knots).unwrap();
        println!("batch {batch}:");
        for (k, v) in knots.iter().zip(values.iter()) {
            println!("  ({:.3}, {:.3}) -> {:.5}{:+.5}i", k[0], k[1], v.re, v.im);
        }
    }
}
