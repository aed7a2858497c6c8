//! Detection inspection and statistics.
//!
//! Produces a structured report of per-key counts, the label distribution,
//! temporal extent and spatial quality metrics for a loaded mapping.

mod report;

pub use report::{
    GeometryStats, InspectReport, KeyCount, LabelCount, LabelsSection, SummarySection,
    TimingStats,
};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::mapping::IntervalSetMapping;
use crate::model::{Axis, Detection};

/// Options for inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Number of top labels to show in the histogram.
    pub top_labels: usize,
    /// Slack allowed outside the unit frame before a box counts as out of frame.
    pub frame_tolerance: f64,
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            top_labels: 10,
            frame_tolerance: 0.0,
            bar_width: 20,
        }
    }
}

/// Inspects a mapping and produces a detailed report.
pub fn inspect_mapping<K>(
    mapping: &IntervalSetMapping<K, Detection>,
    opts: &InspectOptions,
) -> InspectReport
where
    K: Ord + Clone + Display,
{
    InspectReport {
        summary: compute_summary(mapping),
        labels: compute_labels(mapping, opts.top_labels),
        timing: compute_timing(mapping),
        geometry: compute_geometry(mapping, opts.frame_tolerance),
        bar_width: opts.bar_width,
    }
}

fn compute_summary<K>(mapping: &IntervalSetMapping<K, Detection>) -> SummarySection
where
    K: Ord + Clone + Display,
{
    let tracks: BTreeSet<u64> = mapping
        .iter()
        .flat_map(|(_, set)| set.iter().filter_map(|i| i.payload.track_id))
        .collect();

    // first key wins ties
    let busiest_key = mapping
        .iter()
        .filter(|(_, set)| !set.is_empty())
        .fold(None::<(&K, usize)>, |best, (key, set)| match best {
            Some((_, count)) if count >= set.len() => best,
            _ => Some((key, set.len())),
        })
        .map(|(key, count)| KeyCount {
            key: key.to_string(),
            count,
        });

    SummarySection {
        keys: mapping.len(),
        non_empty_keys: mapping.iter().filter(|(_, set)| !set.is_empty()).count(),
        detections: mapping.total_len(),
        tracks: tracks.len(),
        busiest_key,
    }
}

fn compute_labels<K>(mapping: &IntervalSetMapping<K, Detection>, top_n: usize) -> LabelsSection
where
    K: Ord + Clone,
{
    let counts = mapping.fold(BTreeMap::<String, usize>::new(), |mut counts, (_, set)| {
        for interval in set {
            *counts.entry(interval.payload.label.clone()).or_insert(0) += 1;
        }
        counts
    });

    // count descending, then name ascending
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total_distinct = sorted.len();
    let rest = sorted.split_off(top_n.min(sorted.len()));
    let entries = sorted
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();

    LabelsSection {
        top_n,
        total_distinct,
        total_detections: mapping.total_len(),
        entries,
        other_count: rest.into_iter().map(|(_, count)| count).sum(),
    }
}

fn compute_timing<K>(mapping: &IntervalSetMapping<K, Detection>) -> TimingStats
where
    K: Ord + Clone,
{
    let mut stats = TimingStats::default();
    for (_, set) in mapping.iter() {
        for interval in set {
            let t = interval.bounds.t;
            if !t.is_finite() || !t.is_ordered() {
                continue;
            }
            let length = t.length();
            stats.total_time += length;
            if length == 0.0 {
                stats.zero_length += 1;
            }
            stats.min_length = Some(stats.min_length.map_or(length, |m| m.min(length)));
            stats.max_length = Some(stats.max_length.map_or(length, |m| m.max(length)));
            stats.extent = Some(match stats.extent {
                None => (t.lo, t.hi),
                Some((lo, hi)) => (lo.min(t.lo), hi.max(t.hi)),
            });
        }
    }
    stats
}

fn compute_geometry<K>(mapping: &IntervalSetMapping<K, Detection>, tolerance: f64) -> GeometryStats
where
    K: Ord + Clone,
{
    let mut stats = GeometryStats {
        total: mapping.total_len(),
        ..Default::default()
    };

    for (_, set) in mapping.iter() {
        for interval in set {
            let b = &interval.bounds;
            if !b.is_finite() {
                continue;
            }
            stats.finite += 1;

            if !b.is_ordered() {
                continue;
            }
            stats.ordered += 1;

            let (width, height) = (b.width(), b.height());
            stats.min_width = Some(stats.min_width.map_or(width, |m| m.min(width)));
            stats.max_width = Some(stats.max_width.map_or(width, |m| m.max(width)));
            stats.min_height = Some(stats.min_height.map_or(height, |m| m.min(height)));
            stats.max_height = Some(stats.max_height.map_or(height, |m| m.max(height)));

            if width * height <= 0.0 {
                stats.degenerate_area += 1;
            }

            let outside = [Axis::X, Axis::Y].into_iter().any(|axis| {
                let r = b.range(axis);
                r.lo < -tolerance || r.hi > 1.0 + tolerance
            });
            if outside {
                stats.out_of_frame += 1;
            }
        }
    }
    stats
}
