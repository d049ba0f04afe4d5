//! Vector type alias for per-cell vector fields.

use nalgebra::Vector3;

/// 3-component vector for velocities and magnetic fields.
///
/// Components follow the spherical basis of the cell, `(r, θ, φ)`, unless a
/// function states otherwise. Alias for `nalgebra::Vector3<f64>`.
pub type Vec3 = Vector3<f64>;
