use geodesy::prelude::*;
use nalgebra::Point3;
use strum::Display;
use tracing::debug;

use crate::errors::{Result, TrajframeError, malformed_value};

/// Geodetic datum a coordinate reference system is attached to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum Datum {
    #[strum(serialize = "WGS 84")]
    Wgs84,
    #[strum(serialize = "ITRF2020")]
    Itrf2020,
    #[strum(serialize = "ETRS89")]
    Etrs89,
}

impl Datum {
    /// Name of the datum's ellipsoid in operator definitions.
    pub fn ellipsoid(self) -> &'static str {
        match self {
            Datum::Wgs84 => "WGS84",
            Datum::Itrf2020 | Datum::Etrs89 => "GRS80",
        }
    }
}

/// Coordinate layout of a reference system.
///
/// Geocentric positions are (X, Y, Z) in m, geographic ones (lat, lon, h) in
/// degrees and m, and UTM ones (easting, northing, h) in m. Geographic 2D
/// systems carry the height through unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CrsKind {
    Geocentric,
    Geographic,
    Utm { zone: u8 },
}

/// A coordinate reference system identified by its EPSG code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Crs {
    epsg: u32,
    datum: Datum,
    kind: CrsKind,
}

impl Crs {
    /// Looks up a supported EPSG code.
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        use CrsKind::*;
        use Datum::*;

        let (datum, kind) = match epsg {
            4978 => (Wgs84, Geocentric),
            4979 | 4326 => (Wgs84, Geographic),
            32601..=32660 => (Wgs84, Utm { zone: (epsg - 32600) as u8 }),
            9988 => (Itrf2020, Geocentric),
            9989 | 9990 => (Itrf2020, Geographic),
            4936 => (Etrs89, Geocentric),
            4937 | 4258 => (Etrs89, Geographic),
            25828..=25838 => (Etrs89, Utm { zone: (epsg - 25800) as u8 }),
            _ => return Err(TrajframeError::UnsupportedEpsg(epsg)),
        };
        Ok(Self { epsg, datum, kind })
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn datum(&self) -> Datum {
        self.datum
    }

    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    /// Operator taking native coordinates of this system to geocentric ones.
    fn definition(self) -> Option<String> {
        let ellps = self.datum.ellipsoid();
        match self.kind {
            CrsKind::Geocentric => None,
            CrsKind::Geographic => Some(format!("cart ellps={ellps}")),
            CrsKind::Utm { zone } => Some(format!(
                "utm inv zone={zone} ellps={ellps} | cart ellps={ellps}"
            )),
        }
    }

    /// Positions in the axis order and units the operators work in.
    fn to_operands(self, points: &[Point3<f64>]) -> Result<Vec<Coor4D>> {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
                    return Err(malformed_value(i, format!("{} {} {}", p.x, p.y, p.z)));
                }
                Ok(match self.kind {
                    CrsKind::Geographic => {
                        if !(-90.0..=90.0).contains(&p.x) {
                            return Err(malformed_value(i, p.x));
                        }
                        Coor4D::raw(p.y.to_radians(), p.x.to_radians(), p.z, 0.0)
                    }
                    CrsKind::Geocentric | CrsKind::Utm { .. } => Coor4D::raw(p.x, p.y, p.z, 0.0),
                })
            })
            .collect()
    }

    fn write_operands(self, data: &[Coor4D], points: &mut [Point3<f64>]) {
        for (p, c) in points.iter_mut().zip(data) {
            *p = match self.kind {
                CrsKind::Geographic => Point3::new(c[1].to_degrees(), c[0].to_degrees(), c[2]),
                CrsKind::Geocentric | CrsKind::Utm { .. } => Point3::new(c[0], c[1], c[2]),
            };
        }
    }
}

/// Reprojects positions between two reference systems.
///
/// Conversions pivot through geocentric coordinates. No datum shift is applied
/// between different datums.
pub fn reproject(points: &mut [Point3<f64>], from: &Crs, to: &Crs) -> Result<()> {
    if from == to {
        return Ok(());
    }
    debug!(
        from = from.epsg(),
        to = to.epsg(),
        datums = %format_args!("{} -> {}", from.datum(), to.datum()),
        n = points.len(),
        "reprojecting"
    );

    let mut ctx = Minimal::new();
    let mut data = from.to_operands(points)?;
    if let Some(definition) = from.definition() {
        run(&mut ctx, &definition, Fwd, &mut data)?;
    }
    if let Some(definition) = to.definition() {
        run(&mut ctx, &definition, Inv, &mut data)?;
    }
    to.write_operands(&data, points);
    Ok(())
}

fn run(
    ctx: &mut Minimal,
    definition: &str,
    direction: Direction,
    data: &mut Vec<Coor4D>,
) -> Result<()> {
    let op = ctx.op(definition)?;
    let n = ctx.apply(op, direction, data)?;
    if n != data.len() {
        return Err(TrajframeError::ProjectionFailed {
            definition: definition.to_owned(),
            count: data.len() - n,
        });
    }
    Ok(())
}
