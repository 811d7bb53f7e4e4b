use clap::ValueEnum;
use strum::Display;

/// ITRF2020 positions are handled in the WGS 84 geocentric system.
pub const ITRF2020_GEOCENTRIC: u32 = 4978;
/// ETRS89 / ETRS-GRS80, geocentric.
pub const ETRS89_GEOCENTRIC: u32 = 4936;
/// ETRS89, geographic 2D. The system the realization grid is defined in.
pub const ETRS89_GEOGRAPHIC: u32 = 4258;

/// Sense in which a transformation is applied.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Display, ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// ITRF2020 to ETRS89, or R2016 to R2025 for grid shifts.
    #[default]
    Forward,
    /// ETRS89 to ITRF2020, or R2025 to R2016 for grid shifts.
    Inverse,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Inverse,
            Direction::Inverse => Direction::Forward,
        }
    }
}

/// ETRS89 realization on the ETRS89 side of a conversion.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Display, ValueEnum)]
pub enum Realization {
    #[value(name = "R16")]
    R16,
    #[default]
    #[value(name = "R25")]
    R25,
}

impl Realization {
    /// Whether reaching this realization needs the R2016/R2025 grid.
    pub fn needs_grid_shift(self) -> bool {
        self == Realization::R16
    }
}
