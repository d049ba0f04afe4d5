//! Central star
//!
//! Holds the stellar parameters in solar units and the SI quantities the
//! builders need, derived once at construction.

use crate::constants::{DAY_TO_SEC, G_GRAV, M_SUN, R_SUN, R_SUN_AU};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::io::{self, Write};

/// Stellar parameters as given by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarParameters {
    /// Radius (R☉)
    pub radius: f64,
    /// Mass (M☉)
    pub mass: f64,
    /// Effective temperature (K)
    pub temperature: f64,
    /// Rotation period (days); `None` for a non-rotating star
    pub period: Option<f64>,
    /// Equatorial magnetic field (G)
    pub b_eq: f64,
}

impl Default for StarParameters {
    fn default() -> Self {
        Self {
            radius: 2.0,
            mass: 0.8,
            temperature: 4000.0,
            period: Some(7.0),
            b_eq: 1000.0,
        }
    }
}

/// Star with derived quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    params: StarParameters,
    r_m: f64,
    r_au: f64,
    m_kg: f64,
    surface_m2: f64,
    vff: f64,
    veq: f64,
    m0: f64,
}

impl Star {
    /// Build a star from radius (R☉), mass (M☉), temperature (K), rotation
    /// period (days) and equatorial field (G).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] if radius or mass is not a
    /// positive finite number, or if a period is given that is not positive.
    pub fn new(radius: f64, mass: f64, temperature: f64, period: Option<f64>, b_eq: f64) -> ModelResult<Self> {
        Self::from_parameters(StarParameters {
            radius,
            mass,
            temperature,
            period,
            b_eq,
        })
    }

    /// # Errors
    ///
    /// See [`Star::new`].
    pub fn from_parameters(params: StarParameters) -> ModelResult<Self> {
        for (name, value) in [("radius", params.radius), ("mass", params.mass)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ModelError::InvalidParameter {
                    name,
                    value,
                    reason: "must be positive",
                });
            }
        }
        // A zero period means no rotation
        let period = params.period.filter(|&p| p != 0.0);
        if let Some(p) = period {
            if !(p.is_finite() && p > 0.0) {
                return Err(ModelError::InvalidParameter {
                    name: "period",
                    value: p,
                    reason: "must be positive when set",
                });
            }
        }

        let r_m = params.radius * R_SUN;
        let m_kg = params.mass * M_SUN;
        let vff = (2.0 * G_GRAV * m_kg / r_m).sqrt();
        let veq = period.map_or(0.0, |p| 2.0 * PI * r_m / (p * DAY_TO_SEC));

        Ok(Self {
            r_m,
            r_au: params.radius * R_SUN_AU,
            m_kg,
            surface_m2: 4.0 * PI * r_m * r_m,
            vff,
            veq,
            m0: params.b_eq,
            params: StarParameters { period, ..params },
        })
    }

    /// Input parameters
    pub fn parameters(&self) -> &StarParameters {
        &self.params
    }

    /// Radius (R☉)
    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    /// Mass (M☉)
    pub fn mass(&self) -> f64 {
        self.params.mass
    }

    /// Effective temperature (K)
    pub fn temperature(&self) -> f64 {
        self.params.temperature
    }

    /// Rotation period (days), if rotating
    pub fn period(&self) -> Option<f64> {
        self.params.period
    }

    /// Equatorial magnetic field (G)
    pub fn b_eq(&self) -> f64 {
        self.params.b_eq
    }

    /// Radius (m)
    pub fn radius_m(&self) -> f64 {
        self.r_m
    }

    /// Radius (AU)
    pub fn radius_au(&self) -> f64 {
        self.r_au
    }

    /// Mass (kg)
    pub fn mass_kg(&self) -> f64 {
        self.m_kg
    }

    /// Stellar surface area (m²)
    pub fn surface_area(&self) -> f64 {
        self.surface_m2
    }

    /// Free-fall velocity from infinity onto the surface (m/s)
    pub fn vff(&self) -> f64 {
        self.vff
    }

    /// Equatorial rotation velocity (m/s)
    pub fn veq(&self) -> f64 {
        self.veq
    }

    /// Magnetic moment scale: the dipole field is `m0 / r³` (G, r in R*)
    pub fn magnetic_moment(&self) -> f64 {
        self.m0
    }

    /// Write a human-readable summary of the stellar parameters.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "** Stellar parameters:")?;
        writeln!(out, " ----------------------- ")?;
        writeln!(out, "  R = {:.6} Rsun; M = {:.6} Msun", self.radius(), self.mass())?;
        if let Some(p) = self.period() {
            writeln!(out, "  P = {p:.6} d")?;
        }
        writeln!(out, "  Beq = {:.6} G", self.b_eq())?;
        writeln!(out, "  T = {:.6} K", self.temperature())?;
        writeln!(
            out,
            "  veq = {:.6} km/s; vff = {:.6} km/s",
            self.veq * 1e-3,
            self.vff * 1e-3
        )?;
        writeln!(out)
    }
}
