//! Inspect report types and terminal formatting.

use std::fmt;

use serde::Serialize;

/// Inner width of the report boxes, in characters.
const BOX_WIDTH: usize = 59;

/// The result of inspecting a detection mapping.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub summary: SummarySection,
    pub labels: LabelsSection,
    pub timing: TimingStats,
    pub geometry: GeometryStats,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Summary counts for the mapping.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    /// Number of keys.
    pub keys: usize,
    /// Keys holding at least one detection.
    pub non_empty_keys: usize,
    /// Total detections across keys.
    pub detections: usize,
    /// Distinct track ids across keys.
    pub tracks: usize,
    /// Largest per-key detection count, with its key.
    pub busiest_key: Option<KeyCount>,
}

#[derive(Clone, Debug, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: usize,
}

/// Label distribution section.
#[derive(Clone, Debug, Serialize)]
pub struct LabelsSection {
    pub top_n: usize,
    pub total_distinct: usize,
    pub total_detections: usize,
    /// Sorted by count descending, then label ascending.
    pub entries: Vec<LabelCount>,
    /// Sum of counts for labels not in the top N.
    pub other_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Temporal statistics over well-formed detections.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TimingStats {
    /// Sum of durations.
    pub total_time: f64,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    /// Earliest start and latest end across all keys.
    pub extent: Option<(f64, f64)>,
    /// Instantaneous detections.
    pub zero_length: usize,
}

/// Spatial quality metrics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GeometryStats {
    pub total: usize,
    /// Detections with finite coordinates.
    pub finite: usize,
    /// Detections with `lo <= hi` on every axis.
    pub ordered: usize,
    /// Detections reaching outside the unit frame.
    pub out_of_frame: usize,
    /// Detections with zero spatial area.
    pub degenerate_area: usize,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

impl InspectReport {
    /// Machine-readable form of the report.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭{}╮", "─".repeat(BOX_WIDTH + 2))?;
        writeln!(f, "│{:^w$}│", "Detection Inspection Report", w = BOX_WIDTH + 2)?;
        writeln!(f, "╰{}╯", "─".repeat(BOX_WIDTH + 2))?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_labels(f)?;
        writeln!(f)?;
        self.fmt_timing(f)?;
        writeln!(f)?;
        self.fmt_geometry(f)
    }
}

fn open_box(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let head = format!("─ {} ", title);
    let fill = (BOX_WIDTH + 1).saturating_sub(head.chars().count());
    writeln!(f, "┌{}{}┐", head, "─".repeat(fill))?;
    row(f, "")
}

fn close_box(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    row(f, "")?;
    writeln!(f, "└{}┘", "─".repeat(BOX_WIDTH + 1))
}

fn row(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    writeln!(f, "│ {:<w$}│", content, w = BOX_WIDTH)
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        open_box(f, "Summary")?;
        row(f, &format!("  Keys:          {:>8}", format_number(s.keys)))?;
        row(f, &format!("  Detections:    {:>8}", format_number(s.detections)))?;
        if s.tracks > 0 {
            row(f, &format!("  Tracks:        {:>8}", format_number(s.tracks)))?;
        }
        row(
            f,
            &format!(
                "  Non-empty:     {:>8} of {} ({})",
                format_number(s.non_empty_keys),
                format_number(s.keys),
                fmt_percent(s.non_empty_keys, s.keys)
            ),
        )?;
        if let Some(busiest) = &s.busiest_key {
            row(
                f,
                &format!(
                    "  Busiest key:   {} ({})",
                    truncate_label(&busiest.key, 24),
                    format_number(busiest.count)
                ),
            )?;
        }
        close_box(f)
    }

    fn fmt_labels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l = &self.labels;
        let title = if l.total_distinct > l.top_n {
            format!("Labels (top {} of {})", l.top_n, l.total_distinct)
        } else {
            format!("Labels ({})", l.total_distinct)
        };
        open_box(f, &title)?;

        if l.entries.is_empty() {
            row(f, "  No detections found.")?;
        } else {
            let max_count = l.entries.iter().map(|e| e.count).max().unwrap_or(1);
            let mut line = |label: &str, count: usize| {
                row(
                    f,
                    &format!(
                        "  {:<16} {:>7} {:>6}  {}",
                        truncate_label(label, 16),
                        format_number(count),
                        fmt_percent(count, l.total_detections),
                        render_bar(count, max_count, self.bar_width)
                    ),
                )
            };
            for entry in &l.entries {
                line(&entry.label, entry.count)?;
            }
            if l.other_count > 0 {
                line("(other)", l.other_count)?;
            }
        }
        close_box(f)
    }

    fn fmt_timing(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.timing;
        open_box(f, "Timing")?;
        match (t.extent, t.min_length, t.max_length) {
            (Some((start, end)), Some(min), Some(max)) => {
                row(f, &format!("  Extent:        {:.3} .. {:.3}", start, end))?;
                row(f, &format!("  Total time:    {:.3}", t.total_time))?;
                row(f, &format!("  Duration:      min {:.3}   max {:.3}", min, max))?;
                if t.zero_length > 0 {
                    row(f, &format!("  ⚠ Instantaneous: {}", format_number(t.zero_length)))?;
                }
            }
            _ => row(f, "  No well-formed intervals to measure.")?,
        }
        close_box(f)
    }

    fn fmt_geometry(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.geometry;
        open_box(f, "Geometry")?;

        if g.total == 0 {
            row(f, "  No detections found.")?;
            return close_box(f);
        }

        if let (Some(min_w), Some(max_w), Some(min_h), Some(max_h)) =
            (g.min_width, g.max_width, g.min_height, g.max_height)
        {
            row(f, &format!("  Width:    min {:>7.3}    max {:>7.3}", min_w, max_w))?;
            row(f, &format!("  Height:   min {:>7.3}    max {:>7.3}", min_h, max_h))?;
        }
        row(f, "")?;

        let ratio = |n: usize| {
            format!(
                "{:>7} / {:>7}  ({})",
                format_number(n),
                format_number(g.total),
                fmt_percent(n, g.total)
            )
        };
        row(f, &format!("  ✓ Finite coords:     {}", ratio(g.finite)))?;
        row(f, &format!("  ✓ Properly ordered:  {}", ratio(g.ordered)))?;

        let has_issues = g.out_of_frame > 0 || g.degenerate_area > 0 || g.finite < g.total;
        if has_issues {
            row(f, "")?;
            if g.out_of_frame > 0 {
                row(f, &format!("  ⚠ Out of frame:      {}", ratio(g.out_of_frame)))?;
            }
            if g.degenerate_area > 0 {
                row(f, &format!("  ⚠ Degenerate area:   {}", ratio(g.degenerate_area)))?;
            }
            if g.finite < g.total {
                row(f, &format!("  ✗ Non-finite coords: {}", ratio(g.total - g.finite)))?;
            }
        }
        close_box(f)
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }
    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to `max_len` characters.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_len - 1).collect();
        format!("{}…", head)
    }
}
