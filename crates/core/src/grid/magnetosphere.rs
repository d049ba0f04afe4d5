//! Magnetospheric accretion columns
//!
//! Disc material truncated between `rmi` and `rmo` free-falls onto the star
//! along the field lines of a dipole tilted by the obliquity β about the
//! rotation axis. For every cell threaded by an accreting field line this
//! module computes:
//!
//! - the dipole field `B` (G) from the stellar magnetic moment,
//! - the free-fall velocity along `B`, `v_pol = v_ff sqrt(1/r - 1/r_M)`, plus
//!   rigid corotation `r sinθ v_eq` in the azimuthal direction,
//! - the density from flux freezing, `ρ ∝ |B| / |v|`, normalised so that the
//!   mass flux through the innermost radial shell equals Ṁ,
//! - the temperature from a radiative-cooling law, `Λ ∝ |B| / ρ²`, scaled so
//!   that the peak loss rate maps to `t_max`.
//!
//! # Geometry
//!
//! In the dipole frame F' (rotation by β about y), a field line reaching the
//! disc at `r_M'` satisfies `r = r_M' sin²θ'`. The field line crosses the
//! rotational equator at
//!
//! ```text
//! r_lim = r_M' sin²θ₀',   sin²θ₀' = 1 / (1 + tan²β cos²φ')
//! ```
//!
//! and the cell accretes when `rmi <= r_lim <= rmo`. Cells with `cosφ' z >= 0`
//! belong to the main columns; the others reach the star through the opposite
//! magnetic hemisphere (secondary columns).

use crate::constants::{G_GRAV, MASS_FLUX_TOLERANCE, MSUN_PER_YEAR_TO_SI};
use crate::config::MagnetosphereConfig;
use crate::cooling::{CoolingCurve, TabulatedCoolingCurve};
use crate::core_types::{Region, Vec3};
use crate::error::{ModelError, ModelResult, ModelWarning};
use crate::geometry::{surface_integral, Symmetry};
use crate::grid::model_grid::{BuildSummary, Grid};
use crate::star::Star;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, info, warn};

/// Mass-flux normalisation of the last magnetosphere build
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FluxNormalisation {
    /// Solid angle covered by the innermost shell integral (fraction of 4π)
    pub solid_angle: f64,
    /// Flux of the unnormalised density `|B|/|v|` through the shell
    pub raw_flux: f64,
    /// Density scale applied to `|B|/|v|`
    pub rho0: f64,
    /// Requested accretion rate (kg/s)
    pub mdot_requested: f64,
    /// Re-integrated accretion rate after normalisation (kg/s)
    pub mdot_integrated: f64,
}

impl FluxNormalisation {
    /// `|Ṁ_integrated / Ṁ_requested - 1|`
    pub fn relative_error(&self) -> f64 {
        (self.mdot_integrated / self.mdot_requested - 1.0).abs()
    }
}

/// Builder-internal arrays kept on the grid after a magnetosphere build.
///
/// Not cleared by [`Grid::reset_regions`]; the next build replaces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnetosphereState {
    /// Parameters of the build
    pub config: MagnetosphereConfig,
    /// Dipole field (G), spherical components, zero outside the columns
    pub magnetic_field: Vec<Vec3>,
    /// Axisymmetric analytic density, not normalised to Ṁ
    pub rho_axi: Vec<f64>,
    /// Cells on accreting field lines (after secondary-column removal)
    pub accreting: Vec<bool>,
    /// Accreting cells of the main columns
    pub main_column: Vec<bool>,
    /// Accreting cells of the secondary columns
    pub secondary_column: Vec<bool>,
    /// Mass-flux normalisation diagnostics
    pub normalisation: FluxNormalisation,
}

/// Outcome of [`Grid::add_magnetosphere`]
#[derive(Debug, Clone, PartialEq)]
pub struct MagnetosphereSummary {
    pub build: BuildSummary,
    pub normalisation: FluxNormalisation,
}

/// Obliquity-dependent constants shared by all cells
struct DipoleFrame {
    cos_ma: f64,
    sin_ma: f64,
    tan2_ma: f64,
    /// sin²θ substituted on the rotation axis, where it vanishes
    pole_y: f64,
    rmi: f64,
    rmo: f64,
    /// Density constant of the axisymmetric analytic solution
    m0_axi: f64,
    r_star_m: f64,
}

/// Field-line membership of one cell
#[derive(Debug, Clone, Copy, Default)]
struct LineCell {
    /// sin²θ in the rotation frame
    y: f64,
    /// `sqrt(max(0, 1/r - 1/r_M))`
    fact: f64,
    accreting: bool,
    main: bool,
    rho_axi: f64,
}

impl DipoleFrame {
    fn line_cell(&self, grid: &Grid, i: usize) -> LineCell {
        let r = grid.r()[i];
        let (st, ct) = (grid.sin_theta()[i], grid.cos_theta()[i]);
        let (sp, cp) = (grid.sin_phi()[i], grid.cos_phi()[i]);

        // Coordinates in the dipole frame F'
        let xp = r * (cp * st * self.cos_ma - ct * self.sin_ma);
        let yp = r * (sp * st);
        let rp = xp.hypot(yp);
        // NaN on the magnetic axis, which never accretes
        let cpp = xp / rp;
        let stp = rp / r;

        let sin2_theta0p = 1.0 / (1.0 + self.tan2_ma * cpp * cpp);
        let y = if grid.theta()[i] % PI == 0.0 {
            self.pole_y
        } else {
            st * st
        };
        let r_m = r / y;
        let r_mp = r / (stp * stp);
        let r_lim = r_mp * sin2_theta0p;

        // Slightly negative near the apex from round-off
        let fact = (1.0 / r - 1.0 / r_m).max(0.0).sqrt();

        let rho_axi = if r_m >= self.rmi && r_m <= self.rmo && fact > 0.0 {
            self.m0_axi * (self.r_star_m * r).powf(-2.5) * (4.0 - 3.0 * y).sqrt() / (1.0 - y).sqrt()
        } else {
            0.0
        };

        // Zero poloidal speed only happens in the midplane, where |v| = 0
        // would make the flux-freezing density infinite
        let accreting = r_lim >= self.rmi && r_lim <= self.rmo && fact > 0.0;
        let main = accreting && cpp * grid.z()[i] >= 0.0;

        LineCell {
            y,
            fact,
            accreting,
            main,
            rho_axi,
        }
    }
}

impl Grid {
    /// Add the magnetospheric accretion columns using the default cooling table.
    ///
    /// # Errors
    ///
    /// See [`Grid::add_magnetosphere_with`].
    pub fn add_magnetosphere(&mut self, star: &Star, config: &MagnetosphereConfig) -> ModelResult<MagnetosphereSummary> {
        self.add_magnetosphere_with(star, config, &TabulatedCoolingCurve::default())
    }

    /// Add the magnetospheric accretion columns.
    ///
    /// Cells on accreting field lines get the accretion-column label, density,
    /// temperature and velocity; other cells are left untouched. All values
    /// are computed before the grid is modified, so an error leaves the grid
    /// as it was.
    ///
    /// # Errors
    ///
    /// - [`ModelError::InvalidParameter`] for an invalid configuration
    ///   (including an obliquity outside [0, 90) degrees),
    /// - [`ModelError::NonMagneticStar`] if `Beq <= 0`,
    /// - [`ModelError::RequiresStructuredGrid`] on unstructured grids, whose
    ///   mass-flux normalisation is not supported,
    /// - [`ModelError::ShapeMismatch`] with fewer than two θ samples,
    /// - [`ModelError::EmptyAccretionFootprint`] if no accreting cell lies on
    ///   the innermost radial shell,
    /// - [`ModelError::RegionOverlap`] under [`OverlapPolicy::Reject`](crate::grid::OverlapPolicy),
    /// - [`ModelError::MassFluxMismatch`] with `strict_normalisation` set and
    ///   a renormalised flux off by more than the tolerance.
    pub fn add_magnetosphere_with(
        &mut self,
        star: &Star,
        config: &MagnetosphereConfig,
        cooling: &dyn CoolingCurve,
    ) -> ModelResult<MagnetosphereSummary> {
        config.validate()?;
        if !(star.magnetic_moment().is_finite() && star.magnetic_moment() > 0.0) {
            return Err(ModelError::NonMagneticStar);
        }
        let (theta_axis, phi_axis) = match self.axes() {
            Some(axes) => (axes.theta.clone(), axes.phi.clone()),
            None => {
                warn!("Mass flux normalisation on an unstructured grid is not supported");
                return Err(ModelError::RequiresStructuredGrid("add_magnetosphere"));
            }
        };
        if theta_axis.len() < 2 {
            return Err(ModelError::ShapeMismatch(format!(
                "mass flux normalisation needs at least two theta samples, got {}",
                theta_axis.len()
            )));
        }

        info!(
            rmi = config.rmi,
            rmo = config.rmo,
            mdot = config.mdot,
            beta = config.beta,
            t_max = config.t_max,
            no_sec = config.no_sec,
            "Adding magnetosphere"
        );

        let mut warnings = Vec::new();
        if config.beta != 0.0 && self.symmetry() == Symmetry::Axisymmetric {
            let w = ModelWarning::NonAxisymmetricOnAxisymmetricGrid { beta: config.beta };
            warn!("{w}");
            warnings.push(w);
        }

        let ma = config.beta.to_radians();
        let mdot_si = config.mdot * MSUN_PER_YEAR_TO_SI;
        let dtheta = theta_axis[1] - theta_axis[0];
        let frame = DipoleFrame {
            cos_ma: ma.cos(),
            sin_ma: ma.sin(),
            tan2_ma: ma.tan().powi(2),
            pole_y: dtheta.sin().powi(2),
            rmi: config.rmi,
            rmo: config.rmo,
            m0_axi: (mdot_si * star.radius_m())
                / ((1.0 / config.rmi - 1.0 / config.rmo) * 4.0 * PI)
                / (2.0 * G_GRAV * star.mass_kg()).sqrt(),
            r_star_m: star.radius_m(),
        };

        let grid: &Grid = self;
        let mut cells: Vec<LineCell> = (0..grid.len())
            .into_par_iter()
            .map(|i| frame.line_cell(grid, i))
            .collect();
        if config.no_sec {
            for c in &mut cells {
                c.accreting &= c.main;
            }
        }

        let accreting: Vec<bool> = cells.iter().map(|c| c.accreting).collect();
        let overwritten = self.check_overlap(&accreting, Region::AccretionColumn)?;

        // Dipole field and free-fall velocity along the field lines
        let m0 = star.magnetic_moment();
        let vff = star.vff();
        let (magnetic_field, mut velocity): (Vec<Vec3>, Vec<Vec3>) = (0..self.len())
            .into_par_iter()
            .map(|i| {
                let c = cells[i];
                if !c.accreting {
                    return (Vec3::zeros(), Vec3::zeros());
                }
                let (st, ct) = (self.sin_theta()[i], self.cos_theta()[i]);
                let (sp, cp) = (self.sin_phi()[i], self.cos_phi()[i]);
                let m = m0 / self.r()[i].powi(3);
                let b = Vec3::new(
                    2.0 * m * (frame.cos_ma * ct + frame.sin_ma * cp * st),
                    m * (frame.cos_ma * st - frame.sin_ma * cp * ct),
                    m * frame.sin_ma * sp,
                );
                let b_mod = b.norm();
                let sig_z = self.sign_z()[i];
                let vpol = vff * c.fact;
                let v = Vec3::new(
                    -vpol * b.x / b_mod * sig_z,
                    -vpol * b.y / b_mod * sig_z,
                    vpol * b.z / b_mod,
                );
                (b, v)
            })
            .unzip();

        // Flux freezing, not yet normalised
        let mut density: Vec<f64> = (0..self.len())
            .into_par_iter()
            .map(|i| {
                if cells[i].accreting {
                    magnetic_field[i].norm() / velocity[i].norm()
                } else {
                    0.0
                }
            })
            .collect();

        let shell = self.innermost_shell_flux(&theta_axis, &phi_axis, &accreting, &density, &velocity, star);
        debug!(
            solid_angle = shell.solid_angle,
            raw_flux = shell.flux,
            "Mass flux before normalisation"
        );
        if !(shell.flux.is_finite() && shell.flux > 0.0) {
            return Err(ModelError::EmptyAccretionFootprint);
        }
        let rho0 = mdot_si / shell.flux;

        for (d, &acc) in density.iter_mut().zip(&accreting) {
            if acc {
                *d *= rho0;
            }
        }
        let veq = star.veq();
        for (i, c) in cells.iter().enumerate() {
            if c.accreting {
                velocity[i].z += self.r()[i] * c.y.sqrt() * veq;
            }
        }

        let check = self.innermost_shell_flux(&theta_axis, &phi_axis, &accreting, &density, &velocity, star);
        let normalisation = FluxNormalisation {
            solid_angle: shell.solid_angle,
            raw_flux: shell.flux,
            rho0,
            mdot_requested: mdot_si,
            mdot_integrated: check.flux,
        };
        debug!(
            mdot = check.flux / MSUN_PER_YEAR_TO_SI,
            ratio = check.flux / mdot_si,
            "Mass flux after normalisation (Msun/yr)"
        );
        if normalisation.relative_error() > MASS_FLUX_TOLERANCE {
            if config.strict_normalisation {
                return Err(ModelError::MassFluxMismatch {
                    relative_error: normalisation.relative_error(),
                });
            }
            let w = ModelWarning::MassFluxMismatch {
                integrated: check.flux,
                requested: mdot_si,
            };
            warn!("{w}");
            warnings.push(w);
        }

        // Radiative cooling rate Λ = Q_heat / n_H² with Q_heat ∝ |B|
        let loss_rate: Vec<f64> = (0..self.len())
            .map(|i| {
                if accreting[i] {
                    magnetic_field[i].norm() / density[i].powi(2)
                } else {
                    0.0
                }
            })
            .collect();
        let loss_max = loss_rate.iter().copied().fold(0.0, f64::max);
        let log_rate_max = cooling.log_rate(config.t_max);
        let mut temperature: Vec<f64> = loss_rate
            .par_iter()
            .zip(accreting.par_iter())
            .map(|(&l, &acc)| {
                if acc {
                    cooling.temperature((l / loss_max).log10() + log_rate_max)
                } else {
                    0.0
                }
            })
            .collect();

        // With secondary columns the hottest cells are no longer at the shock
        // near the pole: normalise the density-weighted mean to t_max instead
        if !config.no_sec && config.beta != 0.0 {
            let (weighted, mass) = accreting
                .iter()
                .enumerate()
                .filter(|&(_, &acc)| acc)
                .fold((0.0, 0.0), |(w, m), (i, _)| {
                    (w + temperature[i] * density[i], m + density[i])
                });
            let scale = config.t_max / (weighted / mass);
            for (t, &acc) in temperature.iter_mut().zip(&accreting) {
                if acc {
                    *t *= scale;
                }
            }
        }

        let mut tagged = 0usize;
        for i in 0..self.len() {
            if accreting[i] {
                self.regions[i] = Region::AccretionColumn;
                self.density[i] = density[i];
                self.temperature[i] = temperature[i];
                self.velocity[i] = velocity[i];
                tagged += 1;
            }
        }
        self.r_max = self.r_max.max(config.rmo * (1.0 + frame.tan2_ma));

        self.magnetosphere = Some(MagnetosphereState {
            config: config.clone(),
            magnetic_field,
            rho_axi: cells.iter().map(|c| c.rho_axi).collect(),
            accreting,
            main_column: cells.iter().map(|c| c.main).collect(),
            secondary_column: cells.iter().map(|c| c.accreting && !c.main).collect(),
            normalisation,
        });

        info!(cells = tagged, overwritten, rho0, "Magnetosphere added");

        Ok(MagnetosphereSummary {
            build: BuildSummary {
                region: Region::AccretionColumn,
                cells: tagged,
                overwritten,
                warnings,
            },
            normalisation,
        })
    }

    /// Mass flux (kg/s for a normalised density) of `-ρ v_r` through the
    /// innermost radial shell, restricted to accreting cells.
    fn innermost_shell_flux(
        &self,
        theta_axis: &[f64],
        phi_axis: &[f64],
        accreting: &[bool],
        density: &[f64],
        velocity: &[Vec3],
        star: &Star,
    ) -> ShellFlux {
        let n_shell = theta_axis.len() * phi_axis.len();
        let q: Vec<f64> = (0..n_shell)
            .map(|i| {
                if accreting[i] {
                    -density[i] * velocity[i].x
                } else {
                    0.0
                }
            })
            .collect();
        let integral = surface_integral(theta_axis, phi_axis, &q, self.symmetry());
        let r_shell = self.r()[0] * star.radius_m();
        ShellFlux {
            solid_angle: integral.solid_angle,
            flux: integral.total() * r_shell * r_shell,
        }
    }
}

struct ShellFlux {
    solid_angle: f64,
    flux: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::linspace;
    use approx::assert_relative_eq;

    fn star() -> Star {
        Star::new(2.0, 0.5, 4000.0, Some(8.0), 1000.0).unwrap()
    }

    fn axisymmetric_grid() -> Grid {
        Grid::structured(&linspace(1.0, 10.0, 20), &linspace(0.0, PI, 50), &[0.0]).unwrap()
    }

    #[test]
    fn test_axisymmetric_columns() {
        let mut grid = axisymmetric_grid();
        let summary = grid
            .add_magnetosphere(&star(), &MagnetosphereConfig::default())
            .unwrap();
        assert!(summary.build.cells > 0);
        assert!(summary.build.warnings.is_empty());
        assert!(summary.normalisation.relative_error() < MASS_FLUX_TOLERANCE);

        for i in 0..grid.len() {
            if grid.regions()[i] == Region::AccretionColumn {
                assert!(grid.density()[i] > 0.0 && grid.density()[i].is_finite());
                assert!(grid.temperature()[i] > 0.0);
                // Matter falls onto the star
                assert!(grid.velocity()[i].x < 0.0);
            }
        }
        assert_relative_eq!(grid.r_max(), 3.0);
    }

    #[test]
    fn test_field_line_apex_within_truncation_band() {
        let mut grid = axisymmetric_grid();
        grid.add_magnetosphere(&star(), &MagnetosphereConfig::default())
            .unwrap();
        for i in 0..grid.len() {
            if grid.regions()[i] == Region::AccretionColumn {
                let st = grid.sin_theta()[i];
                let r_m = grid.r()[i] / (st * st);
                assert!((2.2..=3.0).contains(&r_m), "apex {r_m} outside band");
                assert!(grid.r()[i] <= 3.0);
            }
        }
    }

    #[test]
    fn test_peak_temperature_without_secondary_columns() {
        let mut grid = Grid::structured(
            &linspace(1.0, 8.0, 24),
            &linspace(0.0, PI, 40),
            &linspace(0.0, 2.0 * PI, 24),
        )
        .unwrap();
        let cfg = MagnetosphereConfig {
            beta: 20.0,
            no_sec: true,
            ..Default::default()
        };
        grid.add_magnetosphere(&star(), &cfg).unwrap();
        let t_max = grid.temperature().iter().copied().fold(0.0, f64::max);
        assert_relative_eq!(t_max, 8000.0, max_relative = 1e-9);
        let state = grid.magnetosphere().unwrap();
        assert!(state.secondary_column.iter().all(|&s| !s));
    }

    #[test]
    fn test_mean_temperature_with_secondary_columns() {
        let mut grid = Grid::structured(
            &linspace(1.0, 8.0, 24),
            &linspace(0.0, PI, 40),
            &linspace(0.0, 2.0 * PI, 24),
        )
        .unwrap();
        let cfg = MagnetosphereConfig {
            beta: 15.0,
            ..Default::default()
        };
        grid.add_magnetosphere(&star(), &cfg).unwrap();
        let (w, m) = (0..grid.len())
            .filter(|&i| grid.regions()[i] == Region::AccretionColumn)
            .fold((0.0, 0.0), |(w, m), i| {
                (w + grid.temperature()[i] * grid.density()[i], m + grid.density()[i])
            });
        assert_relative_eq!(w / m, 8000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_oblique_dipole_on_axisymmetric_grid_warns() {
        let mut grid = axisymmetric_grid();
        let cfg = MagnetosphereConfig {
            beta: 10.0,
            ..Default::default()
        };
        let summary = grid.add_magnetosphere(&star(), &cfg).unwrap();
        assert!(summary
            .build
            .warnings
            .contains(&ModelWarning::NonAxisymmetricOnAxisymmetricGrid { beta: 10.0 }));
    }

    #[test]
    fn test_invalid_obliquity_leaves_grid_untouched() {
        let mut grid = axisymmetric_grid();
        let cfg = MagnetosphereConfig {
            beta: 90.0,
            ..Default::default()
        };
        assert!(matches!(
            grid.add_magnetosphere(&star(), &cfg),
            Err(ModelError::InvalidParameter { name: "beta", .. })
        ));
        assert!(grid.regions().iter().all(|&r| r == Region::Transparent));
        assert!(grid.magnetosphere().is_none());
    }

    #[test]
    fn test_non_magnetic_star_rejected() {
        let mut grid = axisymmetric_grid();
        let star = Star::new(2.0, 0.5, 4000.0, None, 0.0).unwrap();
        assert!(matches!(
            grid.add_magnetosphere(&star, &MagnetosphereConfig::default()),
            Err(ModelError::NonMagneticStar)
        ));
    }

    #[test]
    fn test_unstructured_grid_rejected() {
        let mut grid = Grid::unstructured(vec![1.0, 2.5], vec![0.6, 1.2], vec![0.0, 0.0]).unwrap();
        assert!(matches!(
            grid.add_magnetosphere(&star(), &MagnetosphereConfig::default()),
            Err(ModelError::RequiresStructuredGrid(_))
        ));
        assert_eq!(grid.density(), &[0.0, 0.0]);
    }

    #[test]
    fn test_footprint_must_reach_inner_shell() {
        // The innermost shell at 3.5 R* lies outside every accreting field line
        let mut grid = Grid::structured(&linspace(3.5, 10.0, 10), &linspace(0.0, PI, 30), &[0.0]).unwrap();
        assert!(matches!(
            grid.add_magnetosphere(&star(), &MagnetosphereConfig::default()),
            Err(ModelError::EmptyAccretionFootprint)
        ));
    }

    #[test]
    fn test_rotation_adds_azimuthal_velocity() {
        let mut rotating = axisymmetric_grid();
        rotating
            .add_magnetosphere(&star(), &MagnetosphereConfig::default())
            .unwrap();
        let mut still = axisymmetric_grid();
        let static_star = Star::new(2.0, 0.5, 4000.0, None, 1000.0).unwrap();
        still
            .add_magnetosphere(&static_star, &MagnetosphereConfig::default())
            .unwrap();
        for i in 0..rotating.len() {
            if rotating.regions()[i] == Region::AccretionColumn {
                // Aligned dipole: no toroidal field, so v_φ is pure corotation
                assert_eq!(still.velocity()[i].z, 0.0);
                let expected = rotating.r()[i] * rotating.sin_theta()[i] * star().veq();
                assert_relative_eq!(rotating.velocity()[i].z, expected, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_axisymmetric_reference_density_is_kept() {
        let mut grid = axisymmetric_grid();
        grid.add_magnetosphere(&star(), &MagnetosphereConfig::default())
            .unwrap();
        let state = grid.magnetosphere().unwrap();
        assert!(state.rho_axi.iter().any(|&d| d > 0.0));
        let b = grid.magnetic_field_magnitude().unwrap();
        for i in 0..grid.len() {
            assert_eq!(b[i] > 0.0, state.accreting[i]);
        }
    }
}
