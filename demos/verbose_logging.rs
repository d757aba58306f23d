//! Demonstrates enabling verbose logging for fgg-nufft.
use fgg_nufft::{nufft1d_type2, Complex64};

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let mut grid = vec![Complex64::zero(); 8];
    grid[4] = Complex64::new(1.0, 0.0);
    let knots = [0.0, 0.5, 1.0, 1.5];

    let out = nufft1d_type2(&grid, &knots, None).unwrap();
    log::info!("values: {:?}", out.values);
}
