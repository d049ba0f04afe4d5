//! Optically thick disc
//!
//! The disc is painted as opaque cells: for each radial shell and azimuth the
//! thinnest |z| reached by the θ lattice, widened by `width`, sets the
//! half-thickness. Only the label and a nominal density are assigned.

use crate::config::DiscConfig;
use crate::constants::DISC_DENSITY;
use crate::core_types::Region;
use crate::error::{ModelError, ModelResult};
use crate::grid::model_grid::{BuildSummary, Grid};
use tracing::info;

impl Grid {
    /// Tag the disc cells `R > r_in`, `|z| <= zmin(r, φ)` as [`Region::Dark`]
    /// with density [`DISC_DENSITY`]. Temperature and velocity are left as they
    /// are.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidParameter`] for an invalid configuration,
    /// [`ModelError::RequiresStructuredGrid`] on unstructured grids and
    /// [`ModelError::RegionOverlap`] when overwriting is rejected.
    pub fn add_disc(&mut self, config: &DiscConfig) -> ModelResult<BuildSummary> {
        config.validate()?;
        let (nr, nt, np) = self.shape();
        if self.axes().is_none() {
            return Err(ModelError::RequiresStructuredGrid("add_disc"));
        }

        // Thinnest |z| over θ, per (ir, iφ)
        let mut zmin = vec![f64::INFINITY; nr * np];
        for ir in 0..nr {
            for it in 0..nt {
                for ip in 0..np {
                    let z = self.z()[self.index(ir, it, ip)].abs();
                    let slot = &mut zmin[ir * np + ip];
                    *slot = slot.min(z);
                }
            }
        }

        let mask: Vec<bool> = (0..self.len())
            .map(|i| {
                let (ir, ip) = (i / (nt * np), i % np);
                self.cylindrical_radius()[i] > config.r_in && self.z()[i].abs() <= config.width + zmin[ir * np + ip]
            })
            .collect();
        let overwritten = self.check_overlap(&mask, Region::Dark)?;

        let mut cells = 0usize;
        for (i, _) in mask.iter().enumerate().filter(|&(_, &m)| m) {
            self.regions[i] = Region::Dark;
            self.density[i] = DISC_DENSITY;
            cells += 1;
        }
        info!(r_in = config.r_in, width = config.width, cells, overwritten, "Disc added");

        Ok(BuildSummary {
            region: Region::Dark,
            cells,
            overwritten,
            warnings: Vec::new(),
        })
    }
}
