//! Disc wind
//!
//! Field lines of the wind diverge from a source point at height `±zs` on the
//! rotation axis and are anchored on the disc between `r_in` and `r_out`, so
//! the wind fills the wedge
//!
//! ```text
//! r_in (|z| + zs) / zs  <=  R  <=  r_out (|z| + zs) / zs
//! ```
//!
//! Only the membership is modelled. The wind density, velocity and
//! temperature are not implemented: [`Grid::disc_wind_fields`] reports it and
//! [`Grid::add_disc_wind`] flags the tagged cells in its summary.

use crate::config::DiscWindConfig;
use crate::core_types::Region;
use crate::error::{ModelError, ModelResult, ModelWarning};
use crate::grid::model_grid::{BuildSummary, Grid};
use crate::star::Star;
use rayon::prelude::*;
use tracing::{info, warn};

impl Grid {
    /// Label the cells inside the disc-wind wedge as [`Region::DiscWind`],
    /// leaving their physical fields untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for an invalid configuration
    /// and [`ModelError::RegionOverlap`] when overwriting is rejected.
    pub fn tag_disc_wind(&mut self, config: &DiscWindConfig) -> ModelResult<BuildSummary> {
        config.validate()?;
        let zs = config.zs;
        let mask: Vec<bool> = self
            .cylindrical_radius()
            .par_iter()
            .zip(self.z().par_iter())
            .map(|(&cyl_r, &z)| {
                let flare = (z.abs() + zs) / zs;
                cyl_r >= config.r_in * flare && cyl_r <= config.r_out * flare
            })
            .collect();
        let overwritten = self.check_overlap(&mask, Region::DiscWind)?;

        let mut cells = 0usize;
        for (i, _) in mask.iter().enumerate().filter(|&(_, &m)| m) {
            self.regions[i] = Region::DiscWind;
            cells += 1;
        }
        info!(r_in = config.r_in, r_out = config.r_out, zs, cells, overwritten, "Disc wind tagged");

        Ok(BuildSummary {
            region: Region::DiscWind,
            cells,
            overwritten,
            warnings: Vec::new(),
        })
    }

    /// Density, velocity and temperature of the disc wind.
    ///
    /// # Errors
    ///
    /// Always returns [`ModelError::NotImplemented`].
    #[allow(clippy::unused_self)]
    pub fn disc_wind_fields(&mut self, _star: &Star, _config: &DiscWindConfig) -> ModelResult<()> {
        Err(ModelError::NotImplemented("disc wind physical fields"))
    }

    /// Tag the disc wind. The summary carries a
    /// [`ModelWarning::DiscWindFieldsUnset`] since the tagged cells keep their
    /// previous density, velocity and temperature.
    ///
    /// # Errors
    ///
    /// See [`Grid::tag_disc_wind`].
    pub fn add_disc_wind(&mut self, star: &Star, config: &DiscWindConfig) -> ModelResult<BuildSummary> {
        let mut summary = self.tag_disc_wind(config)?;
        match self.disc_wind_fields(star, config) {
            Err(ModelError::NotImplemented(_)) => {
                let w = ModelWarning::DiscWindFieldsUnset { cells: summary.cells };
                warn!("{w}");
                summary.warnings.push(w);
            }
            other => other?,
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::linspace;
    use crate::Vec3;
    use std::f64::consts::PI;

    fn grid() -> Grid {
        Grid::structured(&linspace(1.0, 30.0, 30), &linspace(0.0, PI, 31), &[0.0]).unwrap()
    }

    #[test]
    fn test_wedge_membership() {
        let mut g = grid();
        let cfg = DiscWindConfig::default();
        let summary = g.tag_disc_wind(&cfg).unwrap();
        assert!(summary.cells > 0);
        for i in 0..g.len() {
            let flare = (g.z()[i].abs() + cfg.zs) / cfg.zs;
            let inside = g.cylindrical_radius()[i] >= cfg.r_in * flare && g.cylindrical_radius()[i] <= cfg.r_out * flare;
            assert_eq!(g.regions()[i] == Region::DiscWind, inside);
        }
    }

    #[test]
    fn test_fields_are_not_implemented() {
        let mut g = grid();
        let star = Star::from_parameters(crate::StarParameters::default()).unwrap();
        assert!(matches!(
            g.disc_wind_fields(&star, &DiscWindConfig::default()),
            Err(ModelError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_add_disc_wind_flags_unset_fields() {
        let mut g = grid();
        let star = Star::from_parameters(crate::StarParameters::default()).unwrap();
        let summary = g.add_disc_wind(&star, &DiscWindConfig::default()).unwrap();
        assert_eq!(
            summary.warnings,
            vec![ModelWarning::DiscWindFieldsUnset { cells: summary.cells }]
        );
        // Labels only
        assert!(g.density().iter().all(|&d| d == 0.0));
        assert!(g.velocity().iter().all(|v| *v == Vec3::zeros()));
    }
}
