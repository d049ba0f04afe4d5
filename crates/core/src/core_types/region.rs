//! Region labels attached to every grid cell

use serde::{Deserialize, Serialize};

/// Physical process owning a cell's field values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum Region {
    /// Optically thin, empty cell
    #[default]
    Transparent = 0,
    /// Magnetospheric accretion column
    AccretionColumn = 1,
    /// Magneto-centrifugal disc wind
    DiscWind = 2,
    /// Disc (reserved, the disc builder paints [`Region::Dark`])
    Disc = 3,
    /// Opaque cell
    Dark = -1,
}

impl Region {
    /// All labels, in report order
    pub const ALL: [Region; 5] = [
        Region::Transparent,
        Region::AccretionColumn,
        Region::DiscWind,
        Region::Disc,
        Region::Dark,
    ];

    /// Integer label used by external tools
    #[inline]
    pub fn id(self) -> i8 {
        self as i8
    }

    /// Short name used in reports
    pub fn label(self) -> &'static str {
        match self {
            Region::Transparent => "",
            Region::AccretionColumn => "Accr. Col",
            Region::DiscWind => "Disc Wind",
            Region::Disc => "Disc",
            Region::Dark => "dark",
        }
    }

    /// Opacity flag of the cell dump: 1 for emitting regions, 0 transparent, -1 dark
    pub fn dump_flag(self) -> i8 {
        self.id().min(1)
    }

    /// Look a label up from its integer id
    pub fn from_id(id: i8) -> Option<Region> {
        Region::ALL.into_iter().find(|r| r.id() == id)
    }
}
