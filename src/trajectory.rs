use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use nalgebra::Point3;
use tracing::{debug, info};

use crate::{
    crs::{Crs, reproject},
    errors::{Result, TrajframeError, malformed_value},
    helmert::HelmertTransform,
};

const DEFAULT_FIELDS: &str = "t,px,py,pz,qx,qy,qz,qw";

/// Column layout of a trajectory file.
#[derive(Clone, PartialEq, Debug)]
struct Fields {
    names: Vec<String>,
    time: usize,
    position: [usize; 3],
}

impl Fields {
    fn parse(spec: &str) -> Result<Self> {
        let names: Vec<String> = spec.split(',').map(|s| s.trim().to_owned()).collect();
        let index = |name: &'static str| {
            names
                .iter()
                .position(|n| n == name)
                .ok_or(TrajframeError::MissingField(name))
        };
        Ok(Self {
            time: index("t")?,
            position: [index("px")?, index("py")?, index("pz")?],
            names,
        })
    }

    fn is_extra(&self, i: usize) -> bool {
        i != self.time && !self.position.contains(&i)
    }
}

/// A trajectory: timestamps, positions and any further columns of the file.
///
/// Files are plain text. Header lines start with `#` and hold a key and a
/// value, e.g. `#epsg 4978` or `#fields t,px,py,pz`. Data rows follow.
#[derive(Clone, PartialEq, Debug)]
pub struct Trajectory {
    /// Header lines in file order, as (key, value).
    header: Vec<(String, String)>,
    fields: Fields,
    delimiter: u8,
    epsg: Option<u32>,
    tstamps: Vec<f64>,
    positions: Vec<Point3<f64>>,
    /// Remaining columns of every row, in field order.
    extra: Vec<Vec<String>>,
}

impl Trajectory {
    /// Reads a trajectory file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let trajectory = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            n = trajectory.len(),
            epsg = ?trajectory.epsg,
            "read trajectory"
        );
        Ok(trajectory)
    }

    /// Reads a trajectory from any buffered source.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut header = Vec::new();
        let mut body = String::new();
        let mut line = String::new();

        // header lines lead the file, rows are handed to the CSV reader
        while reader.read_line(&mut line)? > 0 {
            let trimmed = line.trim();
            if let Some(entry) = trimmed.strip_prefix('#') {
                let (key, value) = entry.split_once(char::is_whitespace).unwrap_or((entry, ""));
                if key.is_empty() {
                    return Err(TrajframeError::MalformedHeader(trimmed.to_owned()));
                }
                header.push((key.to_owned(), value.trim().to_owned()));
            } else {
                body.push_str(&line);
                reader.read_to_string(&mut body)?;
            }
            line.clear();
        }

        let lookup = |key: &str| {
            header
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let fields = Fields::parse(lookup("fields").unwrap_or(DEFAULT_FIELDS))?;
        let delimiter = match lookup("delimiter") {
            Some(d) if d.len() == 1 => d.as_bytes()[0],
            Some(d) if d.is_empty() => b' ',
            Some(d) => return Err(TrajframeError::MalformedHeader(format!("#delimiter {d}"))),
            None => b',',
        };
        let epsg = match lookup("epsg") {
            Some(code) => Some(
                code.parse::<u32>()
                    .map_err(|_| TrajframeError::MalformedHeader(format!("#epsg {code}")))?,
            ),
            None => None,
        };

        let mut rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(body.as_bytes());

        let mut tstamps = Vec::new();
        let mut positions = Vec::new();
        let mut extra = Vec::new();
        for (row, record) in rows.records().enumerate() {
            let record = record?;
            if record.len() != fields.names.len() {
                let line: Vec<&str> = record.iter().collect();
                return Err(malformed_value(row, line.join(",")));
            }
            let value = |i: usize| {
                record[i]
                    .parse::<f64>()
                    .map_err(|_| malformed_value(row, &record[i]))
            };
            tstamps.push(value(fields.time)?);
            let [x, y, z] = fields.position;
            positions.push(Point3::new(value(x)?, value(y)?, value(z)?));
            extra.push(
                record
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| fields.is_extra(*i))
                    .map(|(_, v)| v.to_owned())
                    .collect(),
            );
        }

        Ok(Self {
            header,
            fields,
            delimiter,
            epsg,
            tstamps,
            positions,
            extra,
        })
    }

    /// Writes the trajectory file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_writer(BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), n = self.len(), epsg = ?self.epsg, "wrote trajectory");
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        for (key, value) in &self.header {
            if value.is_empty() {
                writeln!(writer, "#{key}")?;
            } else {
                writeln!(writer, "#{key} {value}")?;
            }
        }

        let mut rows = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .from_writer(writer);
        for ((t, p), extra) in self.tstamps.iter().zip(&self.positions).zip(&self.extra) {
            let mut extra = extra.iter();
            let record: Vec<String> = (0..self.fields.names.len())
                .map(|i| match i {
                    i if i == self.fields.time => t.to_string(),
                    i if i == self.fields.position[0] => p.x.to_string(),
                    i if i == self.fields.position[1] => p.y.to_string(),
                    i if i == self.fields.position[2] => p.z.to_string(),
                    _ => extra.next().cloned().unwrap_or_default(),
                })
                .collect();
            rows.write_record(&record)?;
        }
        rows.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// UNIX timestamps in seconds.
    pub fn tstamps(&self) -> &[f64] {
        &self.tstamps
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Point3<f64>] {
        &mut self.positions
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Relabels the positions without touching them.
    pub fn set_epsg(&mut self, epsg: u32) {
        debug!(from = ?self.epsg, to = epsg, "relabelling trajectory");
        self.epsg = Some(epsg);

        let value = epsg.to_string();
        match self.header.iter_mut().find(|(key, _)| key == "epsg") {
            Some(entry) => entry.1 = value,
            None => self.header.insert(0, ("epsg".to_owned(), value)),
        }
    }

    /// Reprojects the positions into another reference system.
    pub fn to_epsg(&mut self, epsg: u32) -> Result<()> {
        let from = Crs::from_epsg(self.epsg.ok_or(TrajframeError::MissingCrs)?)?;
        let to = Crs::from_epsg(epsg)?;
        reproject(&mut self.positions, &from, &to)?;
        self.set_epsg(epsg);
        Ok(())
    }

    /// Applies a Helmert transformation to the positions.
    pub fn apply_transformation(&mut self, transform: &HelmertTransform) {
        transform.apply(&mut self.positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "\
#name drive 12
#epsg 4978
#fields t,px,py,pz,qx,qy,qz,qw
1721001600.0,3770000.125,446000.5,5108000.75,0,0,0,1
1721001600.1,3770001.125,446001.5,5108001.75,0,0,0.7071,0.7071
";

    #[test]
    fn reads_header_and_rows() {
        let trajectory = Trajectory::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(trajectory.epsg(), Some(4978));
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.tstamps(), &[1721001600.0, 1721001600.1]);
        assert_eq!(
            trajectory.positions()[1],
            Point3::new(3770001.125, 446001.5, 5108001.75)
        );
        assert_eq!(trajectory.extra[1], vec!["0", "0", "0.7071", "0.7071"]);
    }

    #[test]
    fn write_then_read_preserves_everything() {
        let mut trajectory = Trajectory::from_reader(SAMPLE.as_bytes()).unwrap();
        trajectory.set_epsg(4936);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.traj");
        trajectory.to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("#name drive 12\n#epsg 4936\n#fields t,px,py,pz,qx,qy,qz,qw\n"));
        assert_eq!(Trajectory::from_file(&path).unwrap(), trajectory);
    }

    #[test]
    fn custom_field_order_and_delimiter() {
        let text = "#epsg 4937\n#delimiter ;\n#fields px,py,pz,t\n52.5;13.4;35.0;10.0\n";
        let trajectory = Trajectory::from_reader(text.as_bytes()).unwrap();
        assert_eq!(trajectory.tstamps(), &[10.0]);
        assert_eq!(trajectory.positions()[0], Point3::new(52.5, 13.4, 35.0));

        let mut out = Vec::new();
        trajectory.to_writer(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#epsg 4937\n#delimiter ;\n#fields px,py,pz,t\n52.5;13.4;35;10\n"
        );
    }

    #[test]
    fn missing_position_column() {
        let text = "#fields t,px,py\n1,2,3\n";
        assert!(matches!(
            Trajectory::from_reader(text.as_bytes()),
            Err(TrajframeError::MissingField("pz"))
        ));
    }

    #[test]
    fn malformed_number() {
        let text = "#fields t,px,py,pz\n1,2,x,4\n";
        assert!(matches!(
            Trajectory::from_reader(text.as_bytes()),
            Err(TrajframeError::MalformedValue { row: 0, .. })
        ));
    }

    #[test]
    fn reprojection_needs_crs() {
        let text = "#fields t,px,py,pz\n1,2,3,4\n";
        let mut trajectory = Trajectory::from_reader(text.as_bytes()).unwrap();
        assert!(matches!(
            trajectory.to_epsg(4936),
            Err(TrajframeError::MissingCrs)
        ));
    }

    #[test]
    fn reprojection_relabels() {
        let text = "#epsg 4937\n#fields t,px,py,pz\n0,52.5,13.4,35.0\n";
        let mut trajectory = Trajectory::from_reader(text.as_bytes()).unwrap();
        trajectory.to_epsg(4936).unwrap();
        assert_eq!(trajectory.epsg(), Some(4936));
        trajectory.to_epsg(4937).unwrap();
        assert_relative_eq!(trajectory.positions()[0].x, 52.5, epsilon = 1e-10);
        assert_relative_eq!(trajectory.positions()[0].z, 35.0, epsilon = 1e-6);
    }
}
