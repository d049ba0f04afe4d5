//! Text output: the cell dump read by the radiative-transfer code and the
//! human-readable region report

pub mod cell_dump;
pub mod report;

pub use cell_dump::format_scientific;
