//! Spherical geometry helpers
//!
//! Vector basis changes between spherical and Cartesian components, the
//! trapezoidal integral over the unit sphere used to normalise the accretion
//! mass flux, and the analytic shock-area estimates of the dipole model.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Azimuthal sampling of a grid or of a surface integral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symmetry {
    /// Single φ slice, the model is invariant under rotation about z
    Axisymmetric,
    /// Fully sampled in φ
    Full,
}

/// Result of [`surface_integral`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceIntegral {
    /// Average of q over the integrated solid angle, `∫q dΩ / Ω`
    pub mean: f64,
    /// Integrated solid angle, as a fraction of 4π
    pub solid_angle: f64,
}

impl SurfaceIntegral {
    /// `∫q dΩ` over the integrated solid angle, in steradians × [q]
    #[inline]
    pub fn total(&self) -> f64 {
        self.mean * self.solid_angle * 4.0 * PI
    }
}

/// Integrate q over the unit sphere with the trapezoidal rule in cosθ and φ.
///
/// `q` is laid out `q[iθ * phi.len() + iφ]`. With [`Symmetry::Axisymmetric`]
/// only the first φ column is used, the θ integral is multiplied by 2π, and by
/// another factor 2 when θ lies within [0, π/2] (the grid holds one
/// hemisphere of an up-down symmetric model).
///
/// # Panics
///
/// Panics if fewer than two θ samples are given or if `q` does not match the
/// (θ, φ) lattice. A lattice covering no solid angle yields a non-finite mean.
#[track_caller]
pub fn surface_integral(theta: &[f64], phi: &[f64], q: &[f64], symmetry: Symmetry) -> SurfaceIntegral {
    let nt = theta.len();
    let np = phi.len();
    assert!(nt > 1, "surface_integral: need at least two theta samples");
    assert!(
        q.len() == nt * np,
        "surface_integral: q has {} values for a {}x{} lattice",
        q.len(),
        nt,
        np
    );

    let ct: Vec<f64> = theta.iter().map(|t| t.cos()).collect();
    let at = |j: usize, i: usize| q[j * np + i];

    match symmetry {
        Symmetry::Axisymmetric => {
            let mut fact = 2.0 * PI;
            let t_min = theta.iter().copied().fold(f64::INFINITY, f64::min);
            let t_max = theta.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if t_min >= 0.0 && t_max <= FRAC_PI_2 {
                fact *= 2.0;
            }

            let mut d_omega = 0.0;
            let mut int_theta = 0.0;
            for j in 1..nt {
                let dct = (ct[j] - ct[j - 1]).abs();
                d_omega += dct / (4.0 * PI);
                int_theta += 0.5 * (at(j, 0) + at(j - 1, 0)) * dct;
            }
            let solid_angle = d_omega * fact;
            let integral = int_theta * fact;

            SurfaceIntegral {
                mean: integral / (4.0 * PI * solid_angle),
                solid_angle,
            }
        }
        Symmetry::Full => {
            let mut d_omega = 0.0;
            let mut integral = 0.0;
            let mut int_phi = 0.0;
            for i in 0..np {
                let mut int_theta = 0.0;
                for j in 1..nt {
                    let dct = (ct[j] - ct[j - 1]).abs();
                    if i > 0 {
                        d_omega += dct * (phi[i] - phi[i - 1]) / (4.0 * PI);
                    }
                    int_theta += 0.5 * (at(j, i) + at(j - 1, i)) * dct;
                }
                if i > 0 {
                    integral += 0.5 * (int_theta + int_phi) * (phi[i] - phi[i - 1]);
                }
                int_phi = int_theta;
            }

            SurfaceIntegral {
                mean: integral / (4.0 * PI * d_omega),
                solid_angle: d_omega,
            }
        }
    }
}

/// Convert spherical components `(a_r, a_θ, a_φ)` of a vector to Cartesian.
///
/// The trigonometric arguments are those of the point where the vector lives.
#[inline]
pub fn spherical_to_cartesian(
    a: (f64, f64, f64),
    ct: f64,
    st: f64,
    cp: f64,
    sp: f64,
) -> (f64, f64, f64) {
    let (ar, at, ap) = a;
    (
        ar * st * cp + at * ct * cp - sp * ap,
        ar * st * sp + at * ct * sp + cp * ap,
        ar * ct - at * st,
    )
}

/// Convert Cartesian components `(a_x, a_y, a_z)` of a vector to spherical.
#[inline]
pub fn cartesian_to_spherical(
    a: (f64, f64, f64),
    ct: f64,
    st: f64,
    cp: f64,
    sp: f64,
) -> (f64, f64, f64) {
    let (ax, ay, az) = a;
    (
        ax * st * cp + ay * st * sp + az * ct,
        ax * ct * cp + ay * ct * sp - az * st,
        -ax * sp + ay * cp,
    )
}

/// Axisymmetric area of the shock, as a fraction of the stellar surface.
///
/// `rt` is the inner truncation radius and `dr` the radial width of the
/// accreting ring on the disc, both in stellar radii.
pub fn gamma(rt: f64, dr: f64) -> f64 {
    (1.0 - 1.0 / (rt + dr)).sqrt() - (1.0 - 1.0 / rt).sqrt()
}

/// Shock area for a dipole tilted by `beta` degrees.
///
/// `f` is a shape factor in ~[0.5, 1]; 0.5 when secondary columns are removed.
pub fn shock_area(rt: f64, dr: f64, beta: f64, f: f64) -> f64 {
    f * gamma(rt, dr) * beta.to_radians().cos()
}

/// `n` evenly spaced samples over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// Finite differences with unit index spacing: central inside, one-sided at
/// the ends. A single sample has zero gradient.
pub(crate) fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    (0..n)
        .map(|i| {
            if i == 0 {
                values[1] - values[0]
            } else if i == n - 1 {
                values[n - 1] - values[n - 2]
            } else {
                0.5 * (values[i + 1] - values[i - 1])
            }
        })
        .collect()
}
