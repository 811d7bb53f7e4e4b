use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    errors::Result,
    frame::{Direction, ETRS89_GEOCENTRIC, ETRS89_GEOGRAPHIC, ITRF2020_GEOCENTRIC, Realization},
    gridshift::GridShift,
    helmert::{HelmertTransform, ITRF2020_TO_ETRS89},
    trajectory::Trajectory,
};

/// Epochs further than this from the reference epoch are reported (years).
const EPOCH_WARNING_YEARS: f64 = 25.0;

/// Conversion between ITRF2020 and ETRS89.
#[derive(Clone, Debug)]
pub struct ItrfToEtrs {
    /// Epoch in decimal years.
    pub epoch: f64,
    pub direction: Direction,
    pub realization: Realization,
    pub target_epsg: Option<u32>,
    /// NTv2 grid from R2016 to R2025, only read for [`Realization::R16`].
    pub gsb: PathBuf,
}

impl ItrfToEtrs {
    /// EPSG code of the result.
    ///
    /// Defaults to the geocentric system on the far side of the conversion.
    pub fn target_epsg(&self) -> u32 {
        self.target_epsg.unwrap_or(match self.direction {
            Direction::Forward => ETRS89_GEOCENTRIC,
            Direction::Inverse => ITRF2020_GEOCENTRIC,
        })
    }

    /// Converts the trajectory in place.
    pub fn run(&self, trajectory: &mut Trajectory) -> Result<()> {
        let grid = match self.realization.needs_grid_shift() {
            true => Some(GridShift::new(&self.gsb)?),
            false => None,
        };

        let parameters = &ITRF2020_TO_ETRS89;
        if (self.epoch - parameters.t0).abs() > EPOCH_WARNING_YEARS {
            warn!(
                epoch = self.epoch,
                t0 = parameters.t0,
                "epoch is far from the reference epoch of the parameters"
            );
        }
        let transform = HelmertTransform::with_direction(parameters, self.epoch, self.direction)?;

        match self.direction {
            Direction::Forward => {
                info!("ITRF2020 to ETRS89");
                trajectory.to_epsg(ITRF2020_GEOCENTRIC)?;
                trajectory.apply_transformation(&transform);
                trajectory.set_epsg(ETRS89_GEOCENTRIC);

                if let Some(grid) = &grid {
                    info!("R2025 to R2016");
                    trajectory.to_epsg(ETRS89_GEOGRAPHIC)?;
                    grid.apply(trajectory.positions_mut(), self.direction.reversed())?;
                }
            }
            Direction::Inverse => {
                if let Some(grid) = &grid {
                    info!("R2016 to R2025");
                    trajectory.to_epsg(ETRS89_GEOGRAPHIC)?;
                    grid.apply(trajectory.positions_mut(), self.direction.reversed())?;
                }

                info!("ETRS89 to ITRF2020");
                trajectory.to_epsg(ETRS89_GEOCENTRIC)?;
                trajectory.apply_transformation(&transform);
                trajectory.set_epsg(ITRF2020_GEOCENTRIC);
            }
        }

        trajectory.to_epsg(self.target_epsg())
    }
}

/// Shift between the R2016 and R2025 realizations of ETRS89.
#[derive(Clone, Debug)]
pub struct RealizationShift {
    pub gsb: PathBuf,
    pub direction: Direction,
    pub target_epsg: u32,
}

impl RealizationShift {
    pub fn run(&self, trajectory: &mut Trajectory) -> Result<()> {
        let grid = GridShift::new(&self.gsb)?;
        trajectory.to_epsg(ETRS89_GEOGRAPHIC)?;
        grid.apply(trajectory.positions_mut(), self.direction)?;
        trajectory.to_epsg(self.target_epsg)
    }
}
