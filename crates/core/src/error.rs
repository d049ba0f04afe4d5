//! Error and warning types for model construction
//!
//! Precondition violations are returned as [`ModelError`] before any grid field
//! is touched. Numerical-consistency problems do not stop a builder: they are
//! collected as [`ModelWarning`] values in the builder summary and logged.

use crate::core_types::Region;
use std::fmt;

/// Errors that can occur while building or exporting a model
#[derive(Debug)]
pub enum ModelError {
    /// A scalar parameter is outside its valid domain
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
        /// Human-readable constraint
        reason: &'static str,
    },
    /// Coordinate arrays have inconsistent lengths or are empty
    ShapeMismatch(String),
    /// The operation needs the 1D axes of a structured grid
    RequiresStructuredGrid(&'static str),
    /// The star has no magnetic field, dipole geometry degenerates
    NonMagneticStar,
    /// No accreting cell touches the innermost radial shell
    EmptyAccretionFootprint,
    /// Renormalised mass flux differs from the requested accretion rate
    MassFluxMismatch {
        /// `|Ṁ_check / Ṁ - 1|`
        relative_error: f64,
    },
    /// The builder would overwrite cells owned by another region
    RegionOverlap {
        /// Region the builder claims
        claimed: Region,
        /// Number of cells already owned by another region
        cells: usize,
    },
    /// Cell volumes were requested before being computed or supplied
    VolumeNotComputed,
    /// Capability present in the interface but not implemented
    NotImplemented(&'static str),
    /// Writing an output file failed
    Io(std::io::Error),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "Invalid parameter {name} = {value}: {reason}"),
            ModelError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {msg}"),
            ModelError::RequiresStructuredGrid(op) => {
                write!(f, "{op} requires a structured grid")
            }
            ModelError::NonMagneticStar => {
                write!(f, "Magnetospheric accretion needs a star with Beq > 0")
            }
            ModelError::EmptyAccretionFootprint => write!(
                f,
                "No accreting cell on the innermost radial shell, cannot normalise the mass flux"
            ),
            ModelError::MassFluxMismatch { relative_error } => write!(
                f,
                "Mass flux normalisation failed: relative error {relative_error:.3e}"
            ),
            ModelError::RegionOverlap { claimed, cells } => write!(
                f,
                "{} would overwrite {cells} cells owned by other regions",
                claimed.label()
            ),
            ModelError::VolumeNotComputed => {
                write!(f, "Cell volumes must be computed or supplied first")
            }
            ModelError::NotImplemented(what) => write!(f, "Not implemented: {what}"),
            ModelError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::Io(e)
    }
}

/// Non-fatal diagnostics raised by builders
#[derive(Debug, Clone, PartialEq)]
pub enum ModelWarning {
    /// Non-axisymmetric model (obliquity ≠ 0) on a grid with a single φ slice
    NonAxisymmetricOnAxisymmetricGrid {
        /// Dipole obliquity (degrees)
        beta: f64,
    },
    /// Renormalised mass flux outside tolerance
    MassFluxMismatch {
        /// Integrated flux after normalisation (kg/s)
        integrated: f64,
        /// Requested flux (kg/s)
        requested: f64,
    },
    /// Disc-wind cells tagged but density, temperature and velocity left unset
    DiscWindFieldsUnset {
        /// Number of tagged cells
        cells: usize,
    },
}

impl fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelWarning::NonAxisymmetricOnAxisymmetricGrid { beta } => write!(
                f,
                "Using an axisymmetric grid for a non-axisymmetric model (beta = {beta} deg)"
            ),
            ModelWarning::MassFluxMismatch {
                integrated,
                requested,
            } => write!(
                f,
                "Problem of normalisation of mass flux: {integrated:.6e} kg/s integrated, {requested:.6e} kg/s requested"
            ),
            ModelWarning::DiscWindFieldsUnset { cells } => write!(
                f,
                "{cells} disc wind cells tagged, physical fields not implemented"
            ),
        }
    }
}

/// Result alias used throughout the crate
pub type ModelResult<T> = Result<T, ModelError>;
