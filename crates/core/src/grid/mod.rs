//! Spherical model grid and the region builders that fill it

pub mod disc;
pub mod disc_wind;
pub mod magnetosphere;
pub mod model_grid;

// Re-export main types
pub use magnetosphere::{FluxNormalisation, MagnetosphereState, MagnetosphereSummary};
pub use model_grid::{field_magnitude, BuildSummary, Grid, GridAxes, GridKind, OverlapPolicy};
