//! Circumstellar environment of classical T Tauri stars
//!
//! Builds a 3D model of a magnetically accreting young star on a spherical
//! (r, θ, φ) grid: density, temperature and velocity of the magnetospheric
//! accretion columns, an optically thick disc and the disc-wind region. Each
//! cell carries a [`Region`] label. The filled grid is written as a plain-text
//! cell dump for a radiative-transfer code.
//!
//! ```no_run
//! use ctts_env_core::{linspace, DiscConfig, Grid, MagnetosphereConfig, Star};
//! use std::f64::consts::PI;
//!
//! # fn main() -> Result<(), ctts_env_core::ModelError> {
//! let star = Star::new(2.0, 0.5, 4000.0, Some(8.0), 1000.0)?;
//! let mut grid = Grid::structured(&linspace(1.0, 10.0, 20), &linspace(0.0, PI, 50), &[0.0])?;
//! grid.add_disc(&DiscConfig::default())?;
//! let summary = grid.add_magnetosphere(&star, &MagnetosphereConfig::default())?;
//! println!("{} accreting cells", summary.build.cells);
//! grid.save_cell_dump("model.s", &Default::default())?;
//! # Ok(())
//! # }
//! ```

// Core types and utilities
pub mod constants;
pub mod core_types;
pub mod error;
pub mod geometry;

// Model inputs
pub mod config;
pub mod cooling;
pub mod star;

// Grid and region builders
pub mod grid;

// Cell dump and reports
pub mod output;

// Re-export core types
pub use core_types::{Region, Vec3};
pub use error::{ModelError, ModelResult, ModelWarning};
pub use geometry::{linspace, surface_integral, SurfaceIntegral, Symmetry};

// Re-export model inputs
pub use config::{CellDumpOptions, DiscConfig, DiscWindConfig, MagnetosphereConfig};
pub use cooling::{CoolingCurve, TabulatedCoolingCurve};
pub use star::{Star, StarParameters};

// Re-export grid types
pub use grid::{
    BuildSummary, FluxNormalisation, Grid, GridAxes, GridKind, MagnetosphereState, MagnetosphereSummary,
    OverlapPolicy,
};
