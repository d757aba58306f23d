// Test intent: NUFFT_PAR_KNOT_THRESHOLD is read from the environment and
// setters take precedence over it.
#![cfg(all(feature = "parallel", feature = "internal-tests"))]

use std::process::Command;

use fgg_nufft::convolve::{
    __test_parallel_knot_threshold, __test_should_parallelize_knots, set_parallel_knot_threshold,
};

#[test]
fn print_threshold() {
    // libtest prints the test name on the same line; start a fresh one.
    println!("\nthreshold={}", __test_parallel_knot_threshold());
}

fn threshold_with_env(value: &str) -> usize {
    let exe = std::env::current_exe().unwrap();
    let output = Command::new(&exe)
        .env("NUFFT_PAR_KNOT_THRESHOLD", value)
        .args(["--exact", "print_threshold", "--nocapture"])
        .output()
        .expect("run threshold test");
    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .rev()
        .find_map(|l| l.trim().strip_prefix("threshold=")?.parse().ok())
        .unwrap_or_else(|| panic!("no threshold line in child output: {stdout}"))
}

#[test]
fn env_threshold_is_picked_up() {
    assert_eq!(threshold_with_env("32"), 32);
    assert_eq!(threshold_with_env("4096"), 4096);
}

#[test]
fn setter_overrides_threshold() {
    set_parallel_knot_threshold(10);
    assert!(!__test_should_parallelize_knots(9, 1));
    assert!(__test_should_parallelize_knots(10, 1));
    set_parallel_knot_threshold(0);
}
