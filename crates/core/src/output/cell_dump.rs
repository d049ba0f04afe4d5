//! Plain-text cell dump for the radiative-transfer code
//!
//! Layout:
//!
//! ```text
//! <2 for spherical coordinates | 1 for a cell list with volumes>
//! <t_ring with 4 decimals> <1 if accretion is on, else 0>
//! this line is empty and is here for retro-compatibility with cpinte/master (until merge)
//! R z φ T ρ 0 v_R v_z v_φ 0 flag      (one row per cell)
//! ```
//!
//! Floats use eight-digit scientific notation with a signed exponent of at
//! least two digits (`1.00000000e+00`). The flag is 1 for emitting regions, 0
//! for transparent cells and -1 for dark cells.

use crate::config::CellDumpOptions;
use crate::error::ModelResult;
use crate::grid::{Grid, GridKind};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const RETRO_COMPAT_LINE: &str =
    "this line is empty and is here for retro-compatibility with cpinte/master (until merge)";

/// Format `value` as `d.ddde±XX` with `precision` mantissa decimals.
pub fn format_scientific(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let raw = format!("{value:.precision$e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => raw,
    }
}

impl Grid {
    /// Write the cell dump to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::VolumeNotComputed`](crate::ModelError::VolumeNotComputed) for an unstructured grid
    /// without cell volumes, and [`ModelError::Io`](crate::ModelError::Io) on write failures.
    pub fn write_cell_dump<W: Write>(&self, out: &mut W, options: &CellDumpOptions) -> ModelResult<()> {
        let selector = match self.kind() {
            GridKind::Structured(_) => 2,
            GridKind::Unstructured => {
                self.cell_volumes()?;
                1
            }
        };

        writeln!(out, "{selector}")?;
        writeln!(out, "{:.4} {}", options.t_ring, u8::from(options.accretion))?;
        writeln!(out, "{RETRO_COMPAT_LINE}")?;

        let v_cyl = self.velocity_cylindrical();
        let phi = self.phi();
        for i in 0..self.len() {
            let row = [
                self.cylindrical_radius()[i],
                self.z()[i],
                phi[i],
                self.temperature()[i],
                self.density()[i],
                0.0,
                v_cyl[i].x,
                v_cyl[i].y,
                v_cyl[i].z,
                0.0,
            ];
            for value in row {
                write!(out, "{} ", format_scientific(value, 8))?;
            }
            writeln!(out, "{}", self.regions()[i].dump_flag())?;
        }
        Ok(())
    }

    /// Write the cell dump to a file.
    ///
    /// # Errors
    ///
    /// See [`Grid::write_cell_dump`]; also fails if the file cannot be created.
    pub fn save_cell_dump<P: AsRef<Path>>(&self, path: P, options: &CellDumpOptions) -> ModelResult<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write_cell_dump(&mut out, options)?;
        out.flush()?;
        info!(path = %path.display(), cells = self.len(), "Cell dump written");
        Ok(())
    }
}
