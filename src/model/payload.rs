//! The detection record carried as payload by loaded intervals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One labeled detection: a class label plus optional score, track and
/// free-form attributes.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (e.g. "person").
    pub label: String,

    /// Optional confidence score (e.g., from model predictions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Optional tracker identity linking detections across frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,

    /// Additional attributes (e.g., "occluded", "gender").
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Detection {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_track(mut self, track_id: u64) -> Self {
        self.track_id = Some(track_id);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Combines two detections of the same object.
    ///
    /// Keeps `self`'s label, the higher score, the track id only if both
    /// agree, and the union of attributes with `self` winning conflicts.
    pub fn combine(&self, other: &Detection) -> Detection {
        let score = match (self.score, other.score) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let track_id = match (self.track_id, other.track_id) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        };
        let mut attributes = other.attributes.clone();
        attributes.extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        Detection {
            label: self.label.clone(),
            score,
            track_id,
            attributes,
        }
    }
}
