//! Human-readable summary of the grid regions

use super::format_scientific;
use crate::constants::MSUN_PER_YEAR_TO_SI;
use crate::core_types::Region;
use crate::grid::Grid;
use rustc_hash::FxHashMap;
use std::io::{self, Write};

/// Velocity components listed in the report, in order
const VELOCITY_LABELS: [&str; 7] = ["Vx", "Vy", "Vz", "VR", "Vr", "Vtheta", "Vphi"];

/// Running statistics of one region
#[derive(Debug, Clone)]
struct RegionStats {
    cells: usize,
    r_min_filled: f64,
    r_max: f64,
    rho_min_filled: f64,
    rho_sum: f64,
    rho_max: f64,
    t_min_filled: f64,
    t_rho_sum: f64,
    t_max: f64,
    speed_min: [f64; 7],
    speed_max: [f64; 7],
}

impl Default for RegionStats {
    fn default() -> Self {
        Self {
            cells: 0,
            r_min_filled: f64::INFINITY,
            r_max: f64::NEG_INFINITY,
            rho_min_filled: f64::INFINITY,
            rho_sum: 0.0,
            rho_max: f64::NEG_INFINITY,
            t_min_filled: f64::INFINITY,
            t_rho_sum: 0.0,
            t_max: f64::NEG_INFINITY,
            speed_min: [f64::INFINITY; 7],
            speed_max: [0.0; 7],
        }
    }
}

impl RegionStats {
    fn push(&mut self, r: f64, rho: f64, t: f64, speeds: [f64; 7]) {
        self.cells += 1;
        self.r_max = self.r_max.max(r);
        self.rho_sum += rho;
        self.rho_max = self.rho_max.max(rho);
        self.t_rho_sum += t * rho;
        self.t_max = self.t_max.max(t);
        // Minima only over cells holding matter
        if rho > 0.0 {
            self.r_min_filled = self.r_min_filled.min(r);
            self.rho_min_filled = self.rho_min_filled.min(rho);
            self.t_min_filled = self.t_min_filled.min(t);
        }
        for (k, s) in speeds.iter().enumerate() {
            self.speed_min[k] = self.speed_min[k].min(s.abs());
            self.speed_max[k] = self.speed_max[k].max(s.abs());
        }
    }
}

impl Grid {
    /// Collect per-region statistics of the emitting regions
    fn region_stats(&self) -> FxHashMap<Region, RegionStats> {
        let v_cart = self.velocity_cartesian();
        let v_cyl = self.velocity_cylindrical();
        let mut stats: FxHashMap<Region, RegionStats> = FxHashMap::default();
        for i in 0..self.len() {
            let region = self.regions()[i];
            if matches!(region, Region::Transparent | Region::Dark) {
                continue;
            }
            let v = self.velocity()[i];
            let speeds = [v_cart[i].x, v_cart[i].y, v_cart[i].z, v_cyl[i].x, v.x, v.y, v.z];
            stats
                .entry(region)
                .or_default()
                .push(self.r()[i], self.density()[i], self.temperature()[i], speeds);
        }
        stats
    }

    /// Write the extent, density, temperature and velocity ranges of every
    /// emitting region.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "** Grid's regions:")?;
        writeln!(out, " ----------------------- ")?;
        writeln!(out, "Rmax = {:.6} Rstar", self.r_max())?;

        let stats = self.region_stats();
        for region in Region::ALL {
            let Some(s) = stats.get(&region) else {
                continue;
            };
            writeln!(out, " <//> {}", region.label())?;

            if region == Region::AccretionColumn {
                if let Some(m) = self.magnetosphere() {
                    let cfg = &m.config;
                    writeln!(out, "rmi = {:.6} Rstar; rmo = {:.6} Rstar", cfg.rmi, cfg.rmo)?;
                    writeln!(out, "no sec. columns ? {}", if cfg.no_sec { "Yes" } else { "No" })?;
                    writeln!(out, "beta_ma = {:.6} deg", cfg.beta)?;
                    writeln!(
                        out,
                        "Macc = {} Msun/yr",
                        format_scientific(m.normalisation.mdot_requested / MSUN_PER_YEAR_TO_SI, 3)
                    )?;
                    writeln!(out)?;
                }
            }

            let e4 = |v: f64| format_scientific(v, 4);
            writeln!(out, "  --  Extent -- ")?;
            writeln!(out, "   min(r) = {:.4} R*; max(r) = {:.4} R*", s.r_min_filled, s.r_max)?;
            writeln!(out, "  -- Density -- ")?;
            writeln!(
                out,
                "   min(rho) = {} kg/m3; <rho> = {} kg/m3; max(rho) = {} kg/m3",
                e4(s.rho_min_filled),
                e4(s.rho_sum / s.cells as f64),
                e4(s.rho_max)
            )?;
            writeln!(out, "  -- Temperature -- ")?;
            writeln!(
                out,
                "   min(T) = {} K; <T>_rho = {} K; max(T) = {} K",
                e4(s.t_min_filled),
                e4(s.t_rho_sum / s.rho_sum),
                e4(s.t_max)
            )?;
            writeln!(out, "  -- Velocities -- ")?;
            for (k, label) in VELOCITY_LABELS.iter().enumerate() {
                writeln!(
                    out,
                    "   |{label}| {:.6} km/s {:.6} km/s",
                    1e-3 * s.speed_max[k],
                    1e-3 * s.speed_min[k]
                )?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Vec3;
    use std::f64::consts::PI;

    #[test]
    fn test_report_skips_transparent_and_dark() {
        let mut grid = Grid::structured(&[2.0, 3.0], &[PI / 2.0], &[0.0]).unwrap();
        grid.regions[0] = Region::DiscWind;
        grid.density[0] = 2.0;
        grid.temperature[0] = 100.0;
        grid.velocity[0] = Vec3::new(-3000.0, 0.0, 4000.0);
        grid.regions[1] = Region::Dark;
        grid.r_max = 3.0;

        let mut buf = Vec::new();
        grid.write_report(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Rmax = 3.000000 Rstar"));
        assert!(text.contains(" <//> Disc Wind"));
        assert!(!text.contains("dark"));
        assert!(text.contains("min(r) = 2.0000 R*; max(r) = 2.0000 R*"));
        assert!(text.contains("<T>_rho = 1.0000e+02 K"));
        assert!(text.contains("|Vr| 3.000000 km/s 3.000000 km/s"));
        assert!(text.contains("|Vphi| 4.000000 km/s 4.000000 km/s"));
    }

    #[test]
    fn test_empty_grid_report() {
        let grid = Grid::structured(&[2.0], &[0.5, 1.0], &[0.0]).unwrap();
        let mut buf = Vec::new();
        grid.write_report(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
