//! Spherical model grid with physical fields and region labels
//!
//! Geometry (coordinates, Cartesian positions, trigonometric caches) is
//! derived once at construction. The physical fields start at zero and are
//! filled by the region builders; [`Grid::reset_regions`] undoes a builder
//! without rebuilding the geometry.

use crate::core_types::{Region, Vec3};
use crate::error::{ModelError, ModelResult};
use crate::geometry::{gradient, spherical_to_cartesian, Symmetry};
use crate::grid::magnetosphere::MagnetosphereState;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

/// 1D coordinate axes of a structured grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    /// Radii (stellar radii)
    pub r: Vec<f64>,
    /// Colatitudes (rad)
    pub theta: Vec<f64>,
    /// Azimuths (rad)
    pub phi: Vec<f64>,
}

/// How the cells were laid out by the grid provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridKind {
    /// Outer product of 1D axes
    Structured(GridAxes),
    /// Arbitrary list of cells
    Unstructured,
}

/// What a builder does with cells already owned by another region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Last write wins
    #[default]
    Overwrite,
    /// Fail the builder call before touching any field
    Reject,
}

/// Outcome of a region builder call
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    /// Region claimed by the builder
    pub region: Region,
    /// Number of cells tagged
    pub cells: usize,
    /// Tagged cells that previously belonged to another region
    pub overwritten: usize,
    /// Non-fatal diagnostics
    pub warnings: Vec<crate::error::ModelWarning>,
}

/// 3D spherical grid holding density, temperature, velocity and region label
/// per cell.
///
/// Cells are stored flat in row-major order `(ir * nθ + iθ) * nφ + iφ`; an
/// unstructured grid has shape `(n, 1, 1)`.
#[derive(Debug, Clone)]
pub struct Grid {
    kind: GridKind,
    symmetry: Symmetry,
    shape: (usize, usize, usize),

    r: Vec<f64>,
    theta: Vec<f64>,
    phi: Vec<f64>,

    sin_theta: Vec<f64>,
    cos_theta: Vec<f64>,
    sin_phi: Vec<f64>,
    cos_phi: Vec<f64>,

    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    sign_z: Vec<f64>,
    cyl_r: Vec<f64>,

    /// Density (kg/m³)
    pub(crate) density: Vec<f64>,
    /// Temperature (K)
    pub(crate) temperature: Vec<f64>,
    /// Velocity, spherical components (m/s)
    pub(crate) velocity: Vec<Vec3>,
    pub(crate) regions: Vec<Region>,

    /// Outer extent of the modelled regions (stellar radii)
    pub(crate) r_max: f64,

    volume: Option<Vec<f64>>,
    overlap_policy: OverlapPolicy,

    pub(crate) magnetosphere: Option<MagnetosphereState>,
}

/// Sign with `sign(0) = 0`
#[inline]
pub(crate) fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Elementwise Euclidean norm of a vector field
pub fn field_magnitude(field: &[Vec3]) -> Vec<f64> {
    field.par_iter().map(Vec3::norm).collect()
}

impl Grid {
    /// Build a structured grid from its 1D axes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if an axis is empty and
    /// [`ModelError::InvalidParameter`] for non-finite coordinates or
    /// non-positive radii.
    pub fn structured(r: &[f64], theta: &[f64], phi: &[f64]) -> ModelResult<Self> {
        if r.is_empty() || theta.is_empty() || phi.is_empty() {
            return Err(ModelError::ShapeMismatch(format!(
                "structured grid axes must be non-empty, got {}x{}x{}",
                r.len(),
                theta.len(),
                phi.len()
            )));
        }
        let (nr, nt, np) = (r.len(), theta.len(), phi.len());
        let n = nr * nt * np;
        let mut rr = Vec::with_capacity(n);
        let mut tt = Vec::with_capacity(n);
        let mut pp = Vec::with_capacity(n);
        for &ri in r {
            for &tj in theta {
                for &pk in phi {
                    rr.push(ri);
                    tt.push(tj);
                    pp.push(pk);
                }
            }
        }
        let axes = GridAxes {
            r: r.to_vec(),
            theta: theta.to_vec(),
            phi: phi.to_vec(),
        };
        Self::build(GridKind::Structured(axes), (nr, nt, np), rr, tt, pp)
    }

    /// Build an unstructured grid from per-cell coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if the lists are empty or differ
    /// in length, [`ModelError::InvalidParameter`] as for [`Grid::structured`].
    pub fn unstructured(r: Vec<f64>, theta: Vec<f64>, phi: Vec<f64>) -> ModelResult<Self> {
        if r.is_empty() || r.len() != theta.len() || r.len() != phi.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "unstructured grid needs equally sized non-empty coordinate lists, got {}, {}, {}",
                r.len(),
                theta.len(),
                phi.len()
            )));
        }
        let n = r.len();
        Self::build(GridKind::Unstructured, (n, 1, 1), r, theta, phi)
    }

    fn build(
        kind: GridKind,
        shape: (usize, usize, usize),
        r: Vec<f64>,
        theta: Vec<f64>,
        phi: Vec<f64>,
    ) -> ModelResult<Self> {
        if let Some(&bad) = r.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(ModelError::InvalidParameter {
                name: "r",
                value: bad,
                reason: "radii must be positive and finite",
            });
        }
        if let Some(&bad) = theta.iter().chain(phi.iter()).find(|v| !v.is_finite()) {
            return Err(ModelError::InvalidParameter {
                name: "theta/phi",
                value: bad,
                reason: "angles must be finite",
            });
        }

        let phi_min = phi.iter().copied().fold(f64::INFINITY, f64::min);
        let phi_max = phi.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Still 2.5d when the single slice covers both z < 0 and z > 0
        let symmetry = if phi_max == phi_min {
            Symmetry::Axisymmetric
        } else {
            Symmetry::Full
        };

        let sin_theta: Vec<f64> = theta.iter().map(|t| t.sin()).collect();
        let cos_theta: Vec<f64> = theta.iter().map(|t| t.cos()).collect();
        let sin_phi: Vec<f64> = phi.iter().map(|p| p.sin()).collect();
        let cos_phi: Vec<f64> = phi.iter().map(|p| p.cos()).collect();

        let n = r.len();
        let x: Vec<f64> = (0..n).map(|i| r[i] * sin_theta[i] * cos_phi[i]).collect();
        let y: Vec<f64> = (0..n).map(|i| r[i] * sin_theta[i] * sin_phi[i]).collect();
        let z: Vec<f64> = (0..n).map(|i| r[i] * cos_theta[i]).collect();
        let sign_z = z.iter().copied().map(sign).collect();
        let cyl_r = (0..n).map(|i| r[i] * sin_theta[i]).collect();

        debug!(
            cells = n,
            ?symmetry,
            structured = matches!(kind, GridKind::Structured(_)),
            "Grid created"
        );

        Ok(Self {
            kind,
            symmetry,
            shape,
            r,
            theta,
            phi,
            sin_theta,
            cos_theta,
            sin_phi,
            cos_phi,
            x,
            y,
            z,
            sign_z,
            cyl_r,
            density: vec![0.0; n],
            temperature: vec![0.0; n],
            velocity: vec![Vec3::zeros(); n],
            regions: vec![Region::Transparent; n],
            r_max: 0.0,
            volume: None,
            overlap_policy: OverlapPolicy::default(),
            magnetosphere: None,
        })
    }

    /// Structured or unstructured layout
    pub fn kind(&self) -> &GridKind {
        &self.kind
    }

    /// 1D axes, for structured grids
    pub fn axes(&self) -> Option<&GridAxes> {
        match &self.kind {
            GridKind::Structured(axes) => Some(axes),
            GridKind::Unstructured => None,
        }
    }

    /// Azimuthal symmetry derived from the φ coordinates
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// `(nr, nθ, nφ)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.r.len()
    }

    /// Always false, grids cannot be empty
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Flat index of cell `(ir, iθ, iφ)`
    #[inline]
    pub fn index(&self, ir: usize, it: usize, ip: usize) -> usize {
        let (_, nt, np) = self.shape;
        (ir * nt + it) * np + ip
    }

    /// Radius of each cell (stellar radii)
    pub fn r(&self) -> &[f64] {
        &self.r
    }

    /// Colatitude of each cell (rad)
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Azimuth of each cell (rad)
    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    pub fn sin_theta(&self) -> &[f64] {
        &self.sin_theta
    }

    pub fn cos_theta(&self) -> &[f64] {
        &self.cos_theta
    }

    pub fn sin_phi(&self) -> &[f64] {
        &self.sin_phi
    }

    pub fn cos_phi(&self) -> &[f64] {
        &self.cos_phi
    }

    /// Cartesian x (stellar radii)
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Cartesian y (stellar radii)
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Cartesian z, along the rotation axis (stellar radii)
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Sign of z, 0 in the midplane
    pub fn sign_z(&self) -> &[f64] {
        &self.sign_z
    }

    /// Cylindrical radius (stellar radii)
    pub fn cylindrical_radius(&self) -> &[f64] {
        &self.cyl_r
    }

    /// Density (kg/m³)
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// Temperature (K)
    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }

    /// Velocity (m/s), components `(v_r, v_θ, v_φ)`
    pub fn velocity(&self) -> &[Vec3] {
        &self.velocity
    }

    /// Region label of each cell
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Outer extent of the modelled regions (stellar radii)
    pub fn r_max(&self) -> f64 {
        self.r_max
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }

    pub fn set_overlap_policy(&mut self, policy: OverlapPolicy) {
        self.overlap_policy = policy;
    }

    /// Internal state of the last magnetosphere build, if any
    pub fn magnetosphere(&self) -> Option<&MagnetosphereState> {
        self.magnetosphere.as_ref()
    }

    /// Speed |v| of each cell (m/s)
    pub fn velocity_magnitude(&self) -> Vec<f64> {
        field_magnitude(&self.velocity)
    }

    /// Magnetic field strength of the last magnetosphere build (G)
    pub fn magnetic_field_magnitude(&self) -> Option<Vec<f64>> {
        self.magnetosphere
            .as_ref()
            .map(|m| field_magnitude(&m.magnetic_field))
    }

    /// Velocity in Cartesian components `(v_x, v_y, v_z)`
    pub fn velocity_cartesian(&self) -> Vec<Vec3> {
        (0..self.len())
            .into_par_iter()
            .map(|i| {
                let v = self.velocity[i];
                let (vx, vy, vz) = spherical_to_cartesian(
                    (v.x, v.y, v.z),
                    self.cos_theta[i],
                    self.sin_theta[i],
                    self.cos_phi[i],
                    self.sin_phi[i],
                );
                Vec3::new(vx, vy, vz)
            })
            .collect()
    }

    /// Velocity in cylindrical components `(v_R, v_z, v_φ)`
    pub fn velocity_cylindrical(&self) -> Vec<Vec3> {
        self.velocity_cartesian()
            .into_par_iter()
            .enumerate()
            .map(|(i, vc)| {
                let v_cyl_r = vc.x * self.cos_phi[i] + vc.y * self.sin_phi[i];
                Vec3::new(v_cyl_r, vc.z, self.velocity[i].z)
            })
            .collect()
    }

    /// Zero density, temperature, velocity and label of the cells belonging to
    /// any of `labels` (all cells if `labels` is empty), and reset `r_max`.
    ///
    /// Geometry, cell volumes and builder-internal state are kept; they are
    /// overwritten by the next call of the corresponding builder.
    pub fn reset_regions(&mut self, labels: &[Region]) {
        let mut cleared = 0usize;
        for i in 0..self.len() {
            if labels.is_empty() || labels.contains(&self.regions[i]) {
                self.regions[i] = Region::Transparent;
                self.density[i] = 0.0;
                self.temperature[i] = 0.0;
                self.velocity[i] = Vec3::zeros();
                cleared += 1;
            }
        }
        self.r_max = 0.0;
        debug!(cleared, ?labels, "Grid regions reset");
    }

    /// Estimate cell volumes `r² dr sinθ dθ dφ` (stellar radii³) from the
    /// axes, using an azimuthal width of 2π on axisymmetric grids. Does
    /// nothing if volumes are already set.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RequiresStructuredGrid`] on unstructured grids,
    /// whose volumes must be supplied with [`Grid::set_cell_volumes`].
    pub fn compute_cell_volumes(&mut self) -> ModelResult<()> {
        if self.volume.is_some() {
            return Ok(());
        }
        let (dr, dt, dp) = self.axis_widths("compute_cell_volumes")?;
        let volume = (0..self.len())
            .map(|i| {
                let (ir, it, ip) = self.unravel(i);
                self.r[i].powi(2) * dr[ir] * self.sin_theta[i] * dt[it] * dp[ip]
            })
            .collect();
        self.volume = Some(volume);
        Ok(())
    }

    /// Use externally computed cell volumes (stellar radii³).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if there is not one volume per cell.
    pub fn set_cell_volumes(&mut self, volume: Vec<f64>) -> ModelResult<()> {
        if volume.len() != self.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} volumes for {} cells",
                volume.len(),
                self.len()
            )));
        }
        self.volume = Some(volume);
        Ok(())
    }

    /// Cell volumes (stellar radii³)
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::VolumeNotComputed`] before volumes are set.
    pub fn cell_volumes(&self) -> ModelResult<&[f64]> {
        self.volume.as_deref().ok_or(ModelError::VolumeNotComputed)
    }

    /// Smoothing length `V^(1/3) / 3` of each cell (stellar radii)
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::VolumeNotComputed`] before volumes are set.
    pub fn smoothing_lengths(&self) -> ModelResult<Vec<f64>> {
        Ok(self.cell_volumes()?.iter().map(|v| v.cbrt() / 3.0).collect())
    }

    /// Cell surfaces `r² sinθ dθ dφ` (stellar radii²)
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RequiresStructuredGrid`] on unstructured grids.
    pub fn cell_surfaces(&self) -> ModelResult<Vec<f64>> {
        let (_, dt, dp) = self.axis_widths("cell_surfaces")?;
        Ok((0..self.len())
            .map(|i| {
                let (_, it, ip) = self.unravel(i);
                self.r[i].powi(2) * self.sin_theta[i] * dt[it] * dp[ip]
            })
            .collect())
    }

    /// Names of the fields holding NaN or infinite values
    pub fn non_finite_fields(&self) -> Vec<&'static str> {
        let mut bad = Vec::new();
        if self.density.iter().any(|v| !v.is_finite()) {
            bad.push("density");
        }
        if self.temperature.iter().any(|v| !v.is_finite()) {
            bad.push("temperature");
        }
        if self.velocity.iter().any(|v| v.iter().any(|c| !c.is_finite())) {
            bad.push("velocity");
        }
        for field in &bad {
            warn!("Grid field {field} has some nan/inf values");
        }
        bad
    }

    /// Number of cells in `mask` owned by a region other than `claimed`, or
    /// an error when the overlap policy forbids overwriting them.
    pub(crate) fn check_overlap(&self, mask: &[bool], claimed: Region) -> ModelResult<usize> {
        let foreign = mask
            .par_iter()
            .zip(self.regions.par_iter())
            .filter(|&(&m, &reg)| m && reg != Region::Transparent && reg != claimed)
            .count();
        if foreign > 0 && self.overlap_policy == OverlapPolicy::Reject {
            return Err(ModelError::RegionOverlap {
                claimed,
                cells: foreign,
            });
        }
        Ok(foreign)
    }

    #[inline]
    fn unravel(&self, i: usize) -> (usize, usize, usize) {
        let (_, nt, np) = self.shape;
        (i / (nt * np), (i / np) % nt, i % np)
    }

    /// Per-axis cell widths of a structured grid
    fn axis_widths(&self, op: &'static str) -> ModelResult<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        let axes = self.axes().ok_or(ModelError::RequiresStructuredGrid(op))?;
        let dp = match self.symmetry {
            Symmetry::Axisymmetric => vec![2.0 * PI; axes.phi.len()],
            Symmetry::Full => gradient(&axes.phi),
        };
        Ok((gradient(&axes.r), gradient(&axes.theta), dp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::linspace;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn small_grid() -> Grid {
        Grid::structured(
            &linspace(1.0, 5.0, 5),
            &linspace(0.0, PI, 7),
            &linspace(0.0, 2.0 * PI, 4),
        )
        .unwrap()
    }

    #[test]
    fn test_structured_layout() {
        let g = small_grid();
        assert_eq!(g.shape(), (5, 7, 4));
        assert_eq!(g.len(), 140);
        assert_eq!(g.symmetry(), Symmetry::Full);
        let i = g.index(2, 3, 1);
        assert_eq!(g.r()[i], 3.0);
        assert_relative_eq!(g.theta()[i], FRAC_PI_2);
        assert_relative_eq!(g.phi()[i], 2.0 * PI / 3.0);
        assert_eq!(g.unravel(i), (2, 3, 1));
    }

    #[test]
    fn test_cartesian_positions() {
        let g = small_grid();
        let i = g.index(1, 3, 0);
        assert_relative_eq!(g.x()[i], 2.0, epsilon = 1e-12);
        assert_relative_eq!(g.z()[i], 0.0, epsilon = 1e-12);
        assert_relative_eq!(g.cylindrical_radius()[i], 2.0, epsilon = 1e-12);
        let pole = g.index(1, 0, 0);
        assert_eq!(g.sign_z()[pole], 1.0);
        assert_eq!(g.sign_z()[g.index(1, 6, 0)], -1.0);
    }

    #[test]
    fn test_axisymmetric_detection() {
        let g = Grid::structured(&[1.0, 2.0], &linspace(0.0, PI, 5), &[0.0]).unwrap();
        assert_eq!(g.symmetry(), Symmetry::Axisymmetric);
    }

    #[test]
    fn test_unstructured_requires_equal_lengths() {
        let err = Grid::unstructured(vec![1.0, 2.0], vec![0.5], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch(_)));
        let g = Grid::unstructured(vec![1.0, 2.0], vec![0.5, 1.0], vec![0.0, 1.0]).unwrap();
        assert_eq!(g.shape(), (2, 1, 1));
        assert!(g.axes().is_none());
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        assert!(matches!(
            Grid::structured(&[0.0, 1.0], &[0.5], &[0.0]),
            Err(ModelError::InvalidParameter { name: "r", .. })
        ));
        assert!(Grid::structured(&[], &[0.5], &[0.0]).is_err());
    }

    #[test]
    fn test_fields_start_empty() {
        let g = small_grid();
        assert!(g.density().iter().all(|&d| d == 0.0));
        assert!(g.temperature().iter().all(|&t| t == 0.0));
        assert!(g.velocity().iter().all(|v| *v == Vec3::zeros()));
        assert!(g.regions().iter().all(|&r| r == Region::Transparent));
        assert!(g.non_finite_fields().is_empty());
        assert!(g.magnetic_field_magnitude().is_none());
    }

    #[test]
    fn test_velocity_projections() {
        let mut g = small_grid();
        let i = g.index(1, 3, 0); // equator, phi = 0
        g.velocity[i] = Vec3::new(-2.0, 0.0, 5.0);
        let cart = g.velocity_cartesian();
        assert_relative_eq!(cart[i].x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(cart[i].y, 5.0, epsilon = 1e-12);
        let cyl = g.velocity_cylindrical();
        assert_relative_eq!(cyl[i].x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(cyl[i].y, 0.0, epsilon = 1e-12);
        assert_eq!(cyl[i].z, 5.0);
        assert_relative_eq!(g.velocity_magnitude()[i], 29f64.sqrt());
    }

    #[test]
    fn test_reset_selected_regions() {
        let mut g = small_grid();
        for (i, label) in [(0, Region::AccretionColumn), (1, Region::Dark), (2, Region::DiscWind)] {
            g.regions[i] = label;
            g.density[i] = 1.0;
            g.temperature[i] = 10.0;
            g.velocity[i] = Vec3::new(1.0, 1.0, 1.0);
        }
        g.r_max = 4.0;

        g.reset_regions(&[Region::AccretionColumn, Region::DiscWind]);
        assert_eq!(g.regions()[0], Region::Transparent);
        assert_eq!(g.density()[0], 0.0);
        assert_eq!(g.regions()[2], Region::Transparent);
        assert_eq!(g.velocity()[2], Vec3::zeros());
        assert_eq!(g.regions()[1], Region::Dark);
        assert_eq!(g.density()[1], 1.0);
        assert_eq!(g.r_max(), 0.0);

        g.reset_regions(&[]);
        assert!(g.regions().iter().all(|&r| r == Region::Transparent));
        assert!(g.density().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_cell_volumes_sum_to_shell() {
        // Axisymmetric grid: sum of volumes approximates (4π/3)(r_out³ - r_in³)
        let mut g = Grid::structured(&linspace(1.0, 2.0, 201), &linspace(0.0, PI, 401), &[0.0]).unwrap();
        assert!(matches!(g.cell_volumes(), Err(ModelError::VolumeNotComputed)));
        g.compute_cell_volumes().unwrap();
        let total: f64 = g.cell_volumes().unwrap().iter().sum();
        assert_relative_eq!(total, 4.0 * PI / 3.0 * 7.0, max_relative = 1e-2);
        assert_eq!(g.smoothing_lengths().unwrap().len(), g.len());
    }

    #[test]
    fn test_unstructured_volumes_must_be_supplied() {
        let mut g = Grid::unstructured(vec![1.0, 2.0], vec![0.5, 1.0], vec![0.0, 1.0]).unwrap();
        assert!(matches!(
            g.compute_cell_volumes(),
            Err(ModelError::RequiresStructuredGrid(_))
        ));
        assert!(g.set_cell_volumes(vec![1.0]).is_err());
        g.set_cell_volumes(vec![1.0, 8.0]).unwrap();
        assert_relative_eq!(g.smoothing_lengths().unwrap()[1], 2.0 / 3.0);
    }

    #[test]
    fn test_cell_surfaces_cover_sphere() {
        let g = Grid::structured(&[1.0], &linspace(0.0, PI, 401), &linspace(0.0, 2.0 * PI, 201)).unwrap();
        let total: f64 = g.cell_surfaces().unwrap().iter().sum();
        assert_relative_eq!(total, 4.0 * PI, max_relative = 2e-2);
    }

    #[test]
    fn test_overlap_policy() {
        let mut g = small_grid();
        g.regions[3] = Region::Dark;
        let mut mask = vec![false; g.len()];
        mask[3] = true;
        mask[4] = true;
        assert_eq!(g.check_overlap(&mask, Region::AccretionColumn).unwrap(), 1);
        assert_eq!(g.check_overlap(&mask, Region::Dark).unwrap(), 0);
        g.set_overlap_policy(OverlapPolicy::Reject);
        assert!(matches!(
            g.check_overlap(&mask, Region::AccretionColumn),
            Err(ModelError::RegionOverlap { cells: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_detection() {
        let mut g = small_grid();
        g.density[5] = f64::NAN;
        g.velocity[2] = Vec3::new(0.0, f64::INFINITY, 0.0);
        assert_eq!(g.non_finite_fields(), vec!["density", "velocity"]);
    }

    #[test]
    fn test_sign_of_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
        assert_eq!(sign(-3.0), -1.0);
    }
}
