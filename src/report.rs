use std::io::Write;

use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::{
    errors::{Result, TrajframeError},
    trajectory::Trajectory,
};

/// Writes one position per line with `precision` decimal places.
pub fn print_positions<W: Write>(
    mut writer: W,
    positions: &[Point3<f64>],
    precision: usize,
) -> Result<()> {
    writeln!(writer, "Transformed positions:")?;
    for p in positions {
        writeln!(
            writer,
            "{:.precision$} {:.precision$} {:.precision$}",
            p.x, p.y, p.z
        )?;
    }
    Ok(())
}

/// Per-point differences between a trajectory and a reference, in mm.
#[derive(Debug)]
pub struct Differences {
    diffs: Vec<Vector3<f64>>,
}

impl Differences {
    /// Compares `output` against `reference`.
    ///
    /// The reference is reprojected into the reference system of the output
    /// first. Both must hold the same number of positions.
    pub fn compute(output: &Trajectory, mut reference: Trajectory) -> Result<Self> {
        let epsg = output.epsg().ok_or(TrajframeError::MissingCrs)?;
        reference.to_epsg(epsg)?;
        if reference.len() != output.len() {
            return Err(TrajframeError::LengthMismatch {
                expected: output.len(),
                actual: reference.len(),
            });
        }

        let diffs = output
            .positions()
            .iter()
            .zip(reference.positions())
            .map(|(p, q)| (p - q) * 1000.0)
            .collect();
        Ok(Self { diffs })
    }

    pub fn diffs(&self) -> &[Vector3<f64>] {
        &self.diffs
    }

    /// Largest absolute difference of each axis.
    pub fn max_abs(&self) -> Vector3<f64> {
        self.diffs
            .iter()
            .fold(Vector3::zeros(), |max, d| max.sup(&d.abs()))
    }

    pub fn print<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "Differences to reference [mm]:")?;
        for d in &self.diffs {
            writeln!(writer, "{:.3} {:.3} {:.3}", d.x, d.y, d.z)?;
        }
        let max = self.max_abs();
        writeln!(writer, "Max abs difference [mm]: {:.3} {:.3} {:.3}", max.x, max.y, max.z)?;
        info!(x = max.x, y = max.y, z = max.z, "compared against reference");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn trajectory(epsg: u32, rows: &[[f64; 3]]) -> Trajectory {
        let mut text = format!("#epsg {epsg}\n#fields t,px,py,pz\n");
        for (i, [x, y, z]) in rows.iter().enumerate() {
            text.push_str(&format!("{i},{x},{y},{z}\n"));
        }
        Trajectory::from_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn positions_are_rounded() {
        let mut out = Vec::new();
        print_positions(&mut out, &[Point3::new(1.23456, -2.0, 3.99999)], 4).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Transformed positions:\n1.2346 -2.0000 4.0000\n"
        );
    }

    #[test]
    fn differences_in_millimetres() {
        let output = trajectory(4936, &[[3770000.0, 446000.0, 5108000.0], [1.0, 2.0, 3.0]]);
        let reference = trajectory(4936, &[[3770000.001, 446000.0, 5107999.998], [1.0, 2.0, 3.0]]);

        let differences = Differences::compute(&output, reference).unwrap();
        assert_eq!(differences.diffs().len(), 2);
        assert_relative_eq!(differences.diffs()[0].x, -1.0, epsilon = 1e-4);
        assert_relative_eq!(differences.diffs()[0].z, 2.0, epsilon = 1e-4);
        assert_eq!(differences.diffs()[1], Vector3::zeros());

        let max = differences.max_abs();
        assert_relative_eq!(max.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(max.y, 0.0);
        assert_relative_eq!(max.z, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn reference_is_reprojected() {
        let output = trajectory(4936, &[[3770000.0, 446000.0, 5108000.0]]);
        let mut reference = output.clone();
        reference.to_epsg(4937).unwrap();

        let differences = Differences::compute(&output, reference).unwrap();
        assert!(differences.max_abs().norm() < 1e-2);
    }

    #[test]
    fn point_counts_must_match() {
        let output = trajectory(4936, &[[1.0, 2.0, 3.0]]);
        let reference = trajectory(4936, &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert!(matches!(
            Differences::compute(&output, reference),
            Err(TrajframeError::LengthMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }
}
