use std::path::{Path, PathBuf};

use geodesy::prelude::*;
use nalgebra::Point3;
use tracing::{debug, info};

use crate::{
    errors::{Result, TrajframeError},
    frame::Direction,
};

/// Horizontal grid shift between two realizations of a geographic system.
///
/// The grid's own sense (from its first to its second realization) is the
/// forward direction.
#[derive(Clone, Debug)]
pub struct GridShift {
    grid: PathBuf,
}

impl GridShift {
    /// Creates a grid shift for the given NTv2 (`.gsb`) file.
    pub fn new(grid: impl AsRef<Path>) -> Result<Self> {
        let grid = grid.as_ref();
        if !grid.is_file() {
            return Err(TrajframeError::GridNotFound(grid.to_path_buf()));
        }
        Ok(Self {
            grid: std::path::absolute(grid)?,
        })
    }

    /// Operator definition handed to the geodesy context.
    pub fn definition(&self) -> String {
        format!("gridshift grids={}", self.grid.display())
    }

    /// Shifts geographic positions (lat, lon, h in degrees and m) in place.
    ///
    /// Heights are left untouched. Fails without touching any position if
    /// some of them lie outside the grid.
    pub fn apply(&self, points: &mut [Point3<f64>], direction: Direction) -> Result<()> {
        let definition = self.definition();
        info!(grid = %self.grid.display(), %direction, "applying grid shift");

        let mut ctx = Plain::new();
        let op = ctx.op(&definition)?;

        // the library expects (lon, lat) in radians
        let mut data: Vec<Coor4D> = points
            .iter()
            .map(|p| Coor4D::raw(p.y.to_radians(), p.x.to_radians(), p.z, 0.0))
            .collect();
        let direction = match direction {
            Direction::Forward => Fwd,
            Direction::Inverse => Inv,
        };
        let n = ctx.apply(op, direction, &mut data)?;
        if n != data.len() {
            return Err(TrajframeError::OutsideGrid {
                grid: self.grid.clone(),
                count: data.len() - n,
            });
        }
        debug!(n, "grid shifted positions");

        for (p, c) in points.iter_mut().zip(&data) {
            *p = Point3::new(c[1].to_degrees(), c[0].to_degrees(), p.z);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// ED50 to ETRS89 grid covering Catalonia.
    const CATALONIA_GRID: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/100800401.gsb");

    #[test]
    fn missing_grid_fails_early() {
        let err = GridShift::new("does/not/exist/R16_to_R25.gsb").unwrap_err();
        assert!(matches!(err, TrajframeError::GridNotFound(_)));
    }

    #[test]
    fn definition_uses_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let grid = dir.path().join("R16_to_R25.gsb");
        std::fs::write(&grid, b"").unwrap();

        let shift = GridShift::new(&grid).unwrap();
        assert_eq!(
            shift.definition(),
            format!("gridshift grids={}", std::path::absolute(&grid).unwrap().display())
        );
    }

    #[test]
    fn forward_shift_keeps_axes_and_height() {
        let shift = GridShift::new(CATALONIA_GRID).unwrap();
        // Barcelona, (lat, lon, h)
        let mut points = vec![Point3::new(41.3874, 2.1686, 123.4)];
        shift.apply(&mut points, Direction::Forward).unwrap();

        assert_relative_eq!(points[0].x, 41.38627500250805, epsilon = 1e-8);
        assert_relative_eq!(points[0].y, 2.167450821894838, epsilon = 1e-8);
        assert_eq!(points[0].z, 123.4);
    }

    #[test]
    fn inverse_undoes_forward() {
        let shift = GridShift::new(CATALONIA_GRID).unwrap();
        let original = vec![Point3::new(41.3874, 2.1686, 123.4), Point3::new(41.5, 2.0, 0.0)];
        let mut points = original.clone();

        shift.apply(&mut points, Direction::Forward).unwrap();
        assert!((points[1].x - 41.5).abs() > 1e-4);
        shift.apply(&mut points, Direction::Inverse).unwrap();

        for (p, q) in points.iter().zip(&original) {
            assert_relative_eq!(p.x, q.x, epsilon = 1e-9);
            assert_relative_eq!(p.y, q.y, epsilon = 1e-9);
            assert_eq!(p.z, q.z);
        }
    }

    #[test]
    fn positions_outside_grid_are_rejected() {
        let shift = GridShift::new(CATALONIA_GRID).unwrap();
        let original = vec![Point3::new(41.3874, 2.1686, 0.0), Point3::new(52.0, 13.0, 100.0)];

        for direction in [Direction::Forward, Direction::Inverse] {
            let mut points = original.clone();
            assert!(matches!(
                shift.apply(&mut points, direction),
                Err(TrajframeError::OutsideGrid { count: 1, .. })
            ));
            assert_eq!(points, original);
        }
    }
}
