//! CSV reading and writing for keyed detections.
//!
//! One row per detection:
//!
//! ```text
//! key,t1,t2,x1,x2,y1,y2,label,score
//! video_1,0.0,1.5,0.1,0.4,0.2,0.9,person,0.92
//! video_1,2.0,3.0,0,1,0,1,car,
//! ```
//!
//! The header is required. `score` may be left empty. Track ids and
//! attributes have no column and are dropped on write.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Bounds, Detection, DetectionMapping, Interval};
use crate::error::StalgebraError;
use crate::mapping::IntervalSetMapping;

/// A single row in the detection CSV format.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    key: String,
    t1: f64,
    t2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
    label: String,
    score: Option<f64>,
}

impl CsvRow {
    fn into_keyed(self) -> (String, Interval<Detection>) {
        let mut detection = Detection::new(self.label);
        detection.score = self.score;
        let bounds = Bounds::new(self.t1, self.t2, self.x1, self.x2, self.y1, self.y2);
        (self.key, Interval::new(bounds, detection))
    }

    fn from_interval(key: &str, i: &Interval<Detection>) -> Self {
        CsvRow {
            key: key.to_string(),
            t1: i.t1(),
            t2: i.t2(),
            x1: i.x1(),
            x2: i.x2(),
            y1: i.y1(),
            y2: i.y2(),
            label: i.payload.label.clone(),
            score: i.payload.score,
        }
    }
}

fn read_rows<R: std::io::Read>(reader: R, path: &Path) -> Result<DetectionMapping, StalgebraError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result.map_err(|source| StalgebraError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row.into_keyed());
    }

    Ok(IntervalSetMapping::from_iterable(
        rows,
        |(key, _)| key.clone(),
        |(_, interval)| interval,
    ))
}

fn write_rows<W: Write>(writer: W, mapping: &DetectionMapping, path: &Path) -> Result<W, StalgebraError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (key, set) in mapping.iter() {
        for interval in set {
            csv_writer
                .serialize(CsvRow::from_interval(key, interval))
                .map_err(|source| StalgebraError::CsvWrite {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
    }
    csv_writer
        .into_inner()
        .map_err(|e| StalgebraError::Io(e.into_error()))
}

/// Reads keyed detections from a CSV file.
///
/// # Errors
/// Returns an error if the file cannot be read or a row does not parse.
pub fn read_detections_csv(path: &Path) -> Result<DetectionMapping, StalgebraError> {
    let file = File::open(path).map_err(StalgebraError::Io)?;
    read_rows(BufReader::new(file), path)
}

/// Writes keyed detections to a CSV file, ordered by key then interval.
pub fn write_detections_csv(path: &Path, mapping: &DetectionMapping) -> Result<(), StalgebraError> {
    let file = File::create(path).map_err(StalgebraError::Io)?;
    write_rows(BufWriter::new(file), mapping, path)?
        .flush()
        .map_err(StalgebraError::Io)
}

/// Reads keyed detections from a CSV string.
///
/// Useful for testing without file I/O.
pub fn from_csv_str(csv_str: &str) -> Result<DetectionMapping, StalgebraError> {
    from_csv_slice(csv_str.as_bytes())
}

/// Reads keyed detections from CSV bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_csv_slice(bytes: &[u8]) -> Result<DetectionMapping, StalgebraError> {
    read_rows(bytes, Path::new("<bytes>"))
}

/// Writes keyed detections to a CSV string.
pub fn to_csv_string(mapping: &DetectionMapping) -> Result<String, StalgebraError> {
    let dummy_path = Path::new("<string>");
    let bytes = write_rows(Vec::new(), mapping, dummy_path)?;
    String::from_utf8(bytes).map_err(|e| StalgebraError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
