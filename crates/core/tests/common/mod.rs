#![allow(dead_code)]

use ctts_env_core::{linspace, Grid, Star};
use std::f64::consts::PI;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Star(2 R☉, 0.5 M☉, 4000 K, 8 d, 1 kG)
pub fn reference_star() -> Star {
    Star::new(2.0, 0.5, 4000.0, Some(8.0), 1000.0).unwrap()
}

/// r in [1, 10] × 20, θ in [0, π] × 50, single φ slice
pub fn reference_grid() -> Grid {
    Grid::structured(&linspace(1.0, 10.0, 20), &linspace(0.0, PI, 50), &[0.0]).unwrap()
}

/// Fully sampled 3D grid
pub fn grid_3d(nr: usize, nt: usize, np: usize, r_out: f64) -> Grid {
    Grid::structured(
        &linspace(1.0, r_out, nr),
        &linspace(0.0, PI, nt),
        &linspace(0.0, 2.0 * PI, np),
    )
    .unwrap()
}

/// Density-weighted mean temperature of the cells matching `keep`
pub fn density_weighted_temperature(grid: &Grid, keep: impl Fn(usize) -> bool) -> f64 {
    let (w, m) = (0..grid.len())
        .filter(|&i| keep(i))
        .fold((0.0, 0.0), |(w, m), i| {
            (w + grid.temperature()[i] * grid.density()[i], m + grid.density()[i])
        });
    w / m
}
