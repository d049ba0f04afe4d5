//! Builder and output configuration
//!
//! Plain data with defaults matching a typical classical T Tauri star model.
//! Override fields with struct-update syntax:
//!
//! ```
//! use ctts_env_core::MagnetosphereConfig;
//!
//! let cfg = MagnetosphereConfig {
//!     beta: 10.0,
//!     no_sec: true,
//!     ..Default::default()
//! };
//! assert_eq!(cfg.rmi, 2.2);
//! ```

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Parameters of the magnetospheric accretion flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnetosphereConfig {
    /// Inner truncation radius (stellar radii)
    pub rmi: f64,
    /// Outer truncation radius (stellar radii)
    pub rmo: f64,
    /// Mass accretion rate (M☉/yr)
    pub mdot: f64,
    /// Obliquity of the magnetic dipole about the rotation axis (degrees).
    /// The tilted dipole lies in the x-z plane.
    pub beta: f64,
    /// Maximum temperature reached at the shock (K)
    pub t_max: f64,
    /// Remove the secondary accretion columns
    pub no_sec: bool,
    /// Fail instead of warning when the renormalised mass flux is off
    pub strict_normalisation: bool,
}

impl Default for MagnetosphereConfig {
    fn default() -> Self {
        Self {
            rmi: 2.2,
            rmo: 3.0,
            mdot: 1e-8,
            beta: 0.0,
            t_max: 8000.0,
            no_sec: false,
            strict_normalisation: false,
        }
    }
}

impl MagnetosphereConfig {
    /// Check the parameter domain.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] unless
    /// `0 < rmi < rmo`, `mdot > 0`, `0 <= beta < 90` and `t_max > 0`.
    pub fn validate(&self) -> ModelResult<()> {
        if !(self.rmi.is_finite() && self.rmi > 0.0) {
            return Err(invalid("rmi", self.rmi, "must be positive"));
        }
        if !(self.rmo.is_finite() && self.rmo > self.rmi) {
            return Err(invalid("rmo", self.rmo, "must be larger than rmi"));
        }
        if !(self.mdot.is_finite() && self.mdot > 0.0) {
            return Err(invalid("mdot", self.mdot, "must be positive"));
        }
        if !(0.0..90.0).contains(&self.beta) {
            return Err(invalid("beta", self.beta, "obliquity must be in [0, 90) degrees"));
        }
        if !(self.t_max.is_finite() && self.t_max > 0.0) {
            return Err(invalid("t_max", self.t_max, "must be positive"));
        }
        Ok(())
    }
}

/// Parameters of the optically thick disc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscConfig {
    /// Inner cylindrical radius of the disc (stellar radii)
    pub r_in: f64,
    /// Half-thickness added to the thinnest |z| of each shell (stellar radii)
    pub width: f64,
}

impl Default for DiscConfig {
    fn default() -> Self {
        Self {
            r_in: 3.0,
            width: 0.0,
        }
    }
}

impl DiscConfig {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for a negative radius or width.
    pub fn validate(&self) -> ModelResult<()> {
        if self.r_in.is_nan() || self.r_in < 0.0 {
            return Err(invalid("r_in", self.r_in, "must be non-negative"));
        }
        if self.width.is_nan() || self.width < 0.0 {
            return Err(invalid("width", self.width, "must be non-negative"));
        }
        Ok(())
    }
}

/// Parameters of the disc wind
///
/// Only `r_in`, `r_out` and `zs` shape the tagged region; the remaining
/// parameters describe the wind physics, which is not implemented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscWindConfig {
    /// Inner launching radius on the disc (stellar radii)
    pub r_in: f64,
    /// Outer launching radius on the disc (stellar radii)
    pub r_out: f64,
    /// Mass-loss rate (M☉/yr)
    pub mloss: f64,
    /// Power-law index of the mass-loss rate per unit area
    pub alpha: f64,
    /// Temperature exponent, T ∝ R^gamma
    pub gamma: f64,
    /// Acceleration length scale (units of `r_in`)
    pub ls: f64,
    /// Height of the source point where field lines diverge (stellar radii)
    pub zs: f64,
    /// Acceleration exponent of the poloidal velocity
    pub beta: f64,
    /// Terminal velocity in units of the escape velocity
    pub fesc: f64,
}

impl Default for DiscWindConfig {
    fn default() -> Self {
        Self {
            r_in: 3.0,
            r_out: 15.0,
            mloss: 1e-10,
            alpha: 0.5,
            gamma: -0.5,
            ls: 10.0,
            zs: 15.0,
            beta: 0.5,
            fesc: 2.0,
        }
    }
}

impl DiscWindConfig {
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] unless `0 <= r_in <= r_out`
    /// and `zs > 0`.
    pub fn validate(&self) -> ModelResult<()> {
        if self.r_in.is_nan() || self.r_in < 0.0 {
            return Err(invalid("r_in", self.r_in, "must be non-negative"));
        }
        if self.r_out.is_nan() || self.r_out < self.r_in {
            return Err(invalid("r_out", self.r_out, "must not be smaller than r_in"));
        }
        if !(self.zs.is_finite() && self.zs > 0.0) {
            return Err(invalid("zs", self.zs, "must be positive"));
        }
        Ok(())
    }
}

/// Header options of the radiative-transfer cell dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDumpOptions {
    /// Reference temperature written in the header (K)
    pub t_ring: f64,
    /// Whether the accretion flow is switched on in the downstream code
    pub accretion: bool,
}

impl Default for CellDumpOptions {
    fn default() -> Self {
        Self {
            t_ring: 0.0,
            accretion: true,
        }
    }
}

fn invalid(name: &'static str, value: f64, reason: &'static str) -> ModelError {
    ModelError::InvalidParameter {
        name,
        value,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MagnetosphereConfig::default().validate().is_ok());
        assert!(DiscConfig::default().validate().is_ok());
        assert!(DiscWindConfig::default().validate().is_ok());
    }

    #[test]
    fn test_obliquity_domain() {
        let ok = MagnetosphereConfig {
            beta: 89.9,
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        for beta in [90.0, 120.0, -1.0, f64::NAN] {
            let cfg = MagnetosphereConfig {
                beta,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ModelError::InvalidParameter { name: "beta", .. })
            ));
        }
    }

    #[test]
    fn test_truncation_radii_order() {
        let cfg = MagnetosphereConfig {
            rmi: 3.0,
            rmo: 2.2,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ModelError::InvalidParameter { name: "rmo", .. })
        ));
    }

    #[test]
    fn test_accretion_rate_positive() {
        let cfg = MagnetosphereConfig {
            mdot: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_disc_wind_wedge_order() {
        let cfg = DiscWindConfig {
            r_in: 20.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
