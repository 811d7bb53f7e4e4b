use std::f64::consts::PI;

use nalgebra::{Matrix4, Point3};
use tracing::debug;

use crate::{
    errors::{Result, TrajframeError},
    frame::Direction,
};

/// Milliarcseconds to radians.
const MAS_TO_RAD: f64 = 1.0 / 1000.0 * 1.0 / 3600.0 * PI / 180.0;

/// Parameters of a time-dependent 7-parameter similarity transformation.
///
/// Translations are in mm, rotations in mas and the scale in ppb. Rates are
/// given per year.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TransformParameters {
    /// Reference epoch (decimal year).
    pub t0: f64,
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub d: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub dot_t1: f64,
    pub dot_t2: f64,
    pub dot_t3: f64,
    pub dot_d: f64,
    pub dot_r1: f64,
    pub dot_r2: f64,
    pub dot_r3: f64,
}

/// ITRF2020 to ETRS89.
pub const ITRF2020_TO_ETRS89: TransformParameters = TransformParameters {
    t0: 2015.0,
    t1: 41.1393,
    t2: 51.9830,
    t3: -101.1455,
    d: 7.8918,
    r1: 0.8878,
    r2: 12.7748,
    r3: -22.2616,
    dot_t1: 0.0,
    dot_t2: 0.0,
    dot_t3: 0.0,
    dot_d: 0.0,
    dot_r1: 0.086,
    dot_r2: 0.519,
    dot_r3: -0.753,
};

impl TransformParameters {
    /// Builds the homogeneous transformation matrix at the given epoch.
    ///
    /// Small-angle form: scale on the diagonal, skew-symmetric rotation and
    /// the translation column.
    #[rustfmt::skip]
    pub fn matrix(&self, epoch: f64) -> Matrix4<f64> {
        let dt = epoch - self.t0;

        let tx = (self.t1 + self.dot_t1 * dt) / 1000.0;
        let ty = (self.t2 + self.dot_t2 * dt) / 1000.0;
        let tz = (self.t3 + self.dot_t3 * dt) / 1000.0;

        let rx = (self.r1 + self.dot_r1 * dt) * MAS_TO_RAD;
        let ry = (self.r2 + self.dot_r2 * dt) * MAS_TO_RAD;
        let rz = (self.r3 + self.dot_r3 * dt) * MAS_TO_RAD;

        let d = (self.d + self.dot_d * dt) / 1e9 + 1.0;

        Matrix4::new(
              d, -rz,  ry, tx,
             rz,   d, -rx, ty,
            -ry,  rx,   d, tz,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

/// A Helmert transformation ready to be applied to geocentric positions.
#[derive(Clone, PartialEq, Debug)]
pub struct HelmertTransform {
    matrix: Matrix4<f64>,
}

impl HelmertTransform {
    /// Creates the forward transformation at the given epoch.
    pub fn new(parameters: &TransformParameters, epoch: f64) -> Self {
        Self::from_matrix(parameters.matrix(epoch))
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Creates the transformation for the given direction.
    ///
    /// The inverse direction is the numerical inverse of the forward matrix,
    /// not a matrix rebuilt from negated parameters.
    pub fn with_direction(
        parameters: &TransformParameters,
        epoch: f64,
        direction: Direction,
    ) -> Result<Self> {
        let forward = Self::new(parameters, epoch);
        let transform = match direction {
            Direction::Forward => forward,
            Direction::Inverse => forward.inverse()?,
        };
        debug!(%direction, epoch, matrix = %transform.matrix, "helmert transformation");
        Ok(transform)
    }

    /// Returns the exact inverse of this transformation.
    pub fn inverse(&self) -> Result<Self> {
        self.matrix
            .try_inverse()
            .map(Self::from_matrix)
            .ok_or(TrajframeError::SingularMatrix)
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Transforms a single position.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from((self.matrix * point.to_homogeneous()).xyz())
    }

    /// Transforms all positions in place.
    pub fn apply(&self, points: &mut [Point3<f64>]) {
        for point in points.iter_mut() {
            *point = self.transform_point(point);
        }
    }
}
