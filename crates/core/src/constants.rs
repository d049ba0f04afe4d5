//! Physical and astronomical constants (SI unless stated otherwise)

/// Nominal solar radius (m), IAU 2015 resolution B3
pub const R_SUN: f64 = 6.957e8;

/// Solar mass (kg)
pub const M_SUN: f64 = 1.988409870698051e30;

/// Newtonian gravitational constant (m³/(kg·s²)), CODATA 2018
pub const G_GRAV: f64 = 6.6743e-11;

/// Astronomical unit (m)
pub const AU: f64 = 1.495978707e11;

/// Solar radius expressed in astronomical units
pub const R_SUN_AU: f64 = R_SUN / AU;

/// Length of a day (s)
pub const DAY_TO_SEC: f64 = 86400.0;

/// Julian year (s)
pub const YEAR_TO_SEC: f64 = 365.25 * DAY_TO_SEC;

/// Converts a mass accretion rate in M☉/yr to kg/s
pub const MSUN_PER_YEAR_TO_SI: f64 = M_SUN / YEAR_TO_SEC;

/// Density assigned to the optically thick disc (kg/m³)
pub const DISC_DENSITY: f64 = 1e-2;

/// Relative tolerance on the mass flux after density normalisation
pub const MASS_FLUX_TOLERANCE: f64 = 1e-5;
