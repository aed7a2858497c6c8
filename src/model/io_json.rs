//! JSON reading and writing for keyed detections.
//!
//! The input format is an object mapping each key (typically a video id) to
//! an array of detection records:
//!
//! ```json
//! {
//!   "video_1": [
//!     {"t1": 0.0, "t2": 1.5, "x1": 0.1, "x2": 0.4, "y1": 0.2, "y2": 0.9,
//!      "label": "person", "score": 0.92}
//!   ]
//! }
//! ```
//!
//! Spatial fields are optional and default to the full frame `[0, 1]`.
//! Records are not validated on read; run [`crate::validation`] on the
//! result to check them.
//!
//! Query results with arbitrary payloads are written with
//! [`write_mapping_json`], which nests the payload under `"payload"`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Bounds, Detection, DetectionMapping, Interval};
use crate::error::StalgebraError;
use crate::mapping::IntervalSetMapping;
use crate::set::IntervalSet;

fn frame_lo() -> f64 {
    0.0
}

fn frame_hi() -> f64 {
    1.0
}

/// A single detection record as it appears in the file.
#[derive(Debug, Serialize, Deserialize)]
struct DetectionRecord {
    t1: f64,
    t2: f64,
    #[serde(default = "frame_lo")]
    x1: f64,
    #[serde(default = "frame_hi")]
    x2: f64,
    #[serde(default = "frame_lo")]
    y1: f64,
    #[serde(default = "frame_hi")]
    y2: f64,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track_id: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

impl From<DetectionRecord> for Interval<Detection> {
    fn from(r: DetectionRecord) -> Self {
        Interval::new(
            Bounds::new(r.t1, r.t2, r.x1, r.x2, r.y1, r.y2),
            Detection {
                label: r.label,
                score: r.score,
                track_id: r.track_id,
                attributes: r.attributes,
            },
        )
    }
}

impl From<&Interval<Detection>> for DetectionRecord {
    fn from(i: &Interval<Detection>) -> Self {
        let d = &i.payload;
        DetectionRecord {
            t1: i.t1(),
            t2: i.t2(),
            x1: i.x1(),
            x2: i.x2(),
            y1: i.y1(),
            y2: i.y2(),
            label: d.label.clone(),
            score: d.score,
            track_id: d.track_id,
            attributes: d.attributes.clone(),
        }
    }
}

type RecordFile = BTreeMap<String, Vec<DetectionRecord>>;

fn records_to_mapping(records: RecordFile) -> DetectionMapping {
    records
        .into_iter()
        .map(|(key, rows)| {
            let set: IntervalSet<Detection> = rows.into_iter().map(Interval::from).collect();
            (key, set)
        })
        .collect()
}

fn mapping_to_records(mapping: &DetectionMapping) -> RecordFile {
    mapping
        .iter()
        .map(|(key, set)| (key.clone(), set.iter().map(DetectionRecord::from).collect()))
        .collect()
}

/// Reads keyed detections from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_detections_json(path: &Path) -> Result<DetectionMapping, StalgebraError> {
    let file = File::open(path).map_err(StalgebraError::Io)?;
    let reader = BufReader::new(file);

    let records: RecordFile =
        serde_json::from_reader(reader).map_err(|source| StalgebraError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    let mapping = records_to_mapping(records);
    log::debug!(
        "read {} detection(s) under {} key(s) from {}",
        mapping.total_len(),
        mapping.len(),
        path.display()
    );
    Ok(mapping)
}

/// Writes keyed detections to a JSON file in the input record format.
pub fn write_detections_json(path: &Path, mapping: &DetectionMapping) -> Result<(), StalgebraError> {
    let file = File::create(path).map_err(StalgebraError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &mapping_to_records(mapping)).map_err(|source| {
        StalgebraError::JsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(StalgebraError::Io)
}

/// Writes any mapping to a JSON file.
///
/// Each interval becomes `{t1, t2, x1, x2, y1, y2, payload}`. Keys must
/// serialize as JSON object keys (strings or integers).
pub fn write_mapping_json<K, P>(path: &Path, mapping: &IntervalSetMapping<K, P>) -> Result<(), StalgebraError>
where
    K: Ord + Serialize,
    P: Serialize,
{
    let file = File::create(path).map_err(StalgebraError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, mapping).map_err(|source| StalgebraError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(StalgebraError::Io)
}

/// Reads keyed detections from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<DetectionMapping, serde_json::Error> {
    serde_json::from_str(json).map(records_to_mapping)
}

/// Reads keyed detections from JSON bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_json_slice(bytes: &[u8]) -> Result<DetectionMapping, serde_json::Error> {
    serde_json::from_slice(bytes).map(records_to_mapping)
}

/// Writes keyed detections to a JSON string in the input record format.
pub fn to_json_string(mapping: &DetectionMapping) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&mapping_to_records(mapping))
}
