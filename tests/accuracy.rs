// Test intent: raising the accuracy knob must shrink the worst-case error
// against the direct sum, in 1D and 3D.
use fgg_nufft::direct::{type2_direct, type2_direct_1d};
use fgg_nufft::{Complex64, NufftPlan, DEFAULT_ACCURACY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

const TIERS: [u32; 4] = [3, 6, 9, 12];

fn random_grid(rng: &mut StdRng, len: usize) -> Vec<Complex64> {
    (0..len)
        .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

fn max_err(a: &[Complex64], b: &[Complex64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (*x - *y).norm())
        .fold(0.0, f64::max)
}

#[test]
fn error_decreases_with_accuracy_1d() {
    let mut rng = StdRng::seed_from_u64(1);
    let grid = random_grid(&mut rng, 32);
    let knots: Vec<f64> = (0..200).map(|_| rng.gen_range(-20.0..20.0)).collect();
    let wrapped: Vec<[f64; 1]> = knots.iter().map(|&x| [x]).collect();
    let reference = type2_direct_1d(&grid, &knots).unwrap();
    let mut last = f64::INFINITY;
    for accuracy in TIERS {
        let plan = NufftPlan::new([32], accuracy).unwrap();
        let err = max_err(&plan.execute(&grid, &wrapped).unwrap(), &reference);
        assert!(err < last, "accuracy {accuracy}: {err} !< {last}");
        last = err;
    }
    assert!(last < 1e-9, "double-precision tier error {last}");
}

#[test]
fn error_decreases_with_accuracy_3d() {
    let mut rng = StdRng::seed_from_u64(2);
    let shape = [4, 4, 4];
    let grid = random_grid(&mut rng, 64);
    let knots: Vec<[f64; 3]> = (0..20)
        .map(|_| [rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU)])
        .collect();
    let reference = type2_direct(&grid, shape, &knots).unwrap();
    let mut last = f64::INFINITY;
    for accuracy in TIERS {
        let plan = NufftPlan::new(shape, accuracy).unwrap();
        let err = max_err(&plan.execute(&grid, &knots).unwrap(), &reference);
        assert!(err < last, "accuracy {accuracy}: {err} !< {last}");
        last = err;
    }
    assert!(last < 1e-8, "double-precision tier error {last}");
}

#[test]
fn default_accuracy_reaches_single_precision() {
    let mut rng = StdRng::seed_from_u64(3);
    let grid = random_grid(&mut rng, 16);
    let knots: Vec<f64> = (0..64).map(|_| rng.gen_range(0.0..TAU)).collect();
    let wrapped: Vec<[f64; 1]> = knots.iter().map(|&x| [x]).collect();
    let plan = NufftPlan::new([16], DEFAULT_ACCURACY).unwrap();
    let err = max_err(
        &plan.execute(&grid, &wrapped).unwrap(),
        &type2_direct_1d(&grid, &knots).unwrap(),
    );
    assert!(err < 1e-4, "err {err}");
}
