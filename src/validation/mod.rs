//! Detection validation.
//!
//! Loaders are permissive so that malformed input can be reported rather
//! than rejected at the first bad record. This module checks:
//! - Geometric validity (finite coordinates, `lo <= hi` on every axis)
//! - Frame conformance (spatial coordinates within `[0, 1]`)
//! - Payload quality (non-empty labels, scores in range)
//! - Mapping hygiene (empty keys, duplicated detections)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::fmt::Display;

use crate::mapping::IntervalSetMapping;
use crate::model::{Axis, Bounds, Detection, Interval};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,

    /// Slack allowed outside the unit frame before `OutOfFrame` is raised.
    pub frame_tolerance: f64,
}

/// Validates every detection in `mapping` and returns all issues found.
///
/// Issues are reported in key order, then interval order within a key.
pub fn validate_mapping<K>(
    mapping: &IntervalSetMapping<K, Detection>,
    opts: &ValidateOptions,
) -> ValidationReport
where
    K: Ord + Clone + Display,
{
    let mut report = ValidationReport::new();

    for (key, set) in mapping.iter() {
        let key = key.to_string();
        if set.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyKey,
                "No detections",
                IssueContext::Key { key: key.clone() },
            ));
            continue;
        }

        let mut previous: Option<&Interval<Detection>> = None;
        for (index, interval) in set.iter().enumerate() {
            let context = || IssueContext::Interval {
                key: key.clone(),
                index,
            };
            validate_bounds(&interval.bounds, opts, &context, &mut report);
            validate_payload(&interval.payload, &context, &mut report);

            // sorted, so duplicates are adjacent
            if let Some(prev) = previous {
                if prev.bounds == interval.bounds && prev.payload == interval.payload {
                    report.add(ValidationIssue::warning(
                        IssueCode::DuplicateDetection,
                        format!("Same bounds and payload as interval {}", index - 1),
                        context(),
                    ));
                }
            }
            previous = Some(interval);
        }
    }

    if opts.strict {
        log::debug!(
            "validation: {} issue(s), strict mode counts warnings as failures",
            report.issues.len()
        );
    }
    report
}

/// Checks one box. Non-finite coordinates skip the remaining checks.
fn validate_bounds<C>(bounds: &Bounds, opts: &ValidateOptions, context: &C, report: &mut ValidationReport)
where
    C: Fn() -> IssueContext,
{
    if !bounds.is_finite() {
        report.add(ValidationIssue::error(
            IssueCode::BoundsNotFinite,
            format!("Non-finite coordinates {:?}", bounds),
            context(),
        ));
        return;
    }

    if let Err(err) = bounds.validate() {
        report.add(ValidationIssue::error(
            IssueCode::InvalidBoundsOrdering,
            err.to_string(),
            context(),
        ));
        return;
    }

    let tol = opts.frame_tolerance;
    for axis in [Axis::X, Axis::Y] {
        let range = bounds.range(axis);
        if range.lo < -tol || range.hi > 1.0 + tol {
            report.add(ValidationIssue::warning(
                IssueCode::OutOfFrame,
                format!(
                    "Axis {} spans [{}, {}], outside the unit frame",
                    axis, range.lo, range.hi
                ),
                context(),
            ));
        }
    }

    if bounds.length() == 0.0 {
        report.add(ValidationIssue::warning(
            IssueCode::ZeroLength,
            format!("Instantaneous interval at t = {}", bounds.t1()),
            context(),
        ));
    }

    let area = bounds.area();
    if area <= 0.0 {
        report.add(ValidationIssue::warning(
            IssueCode::ZeroArea,
            format!("Zero spatial area ({}x{})", bounds.width(), bounds.height()),
            context(),
        ));
    }
}

fn validate_payload<C>(detection: &Detection, context: &C, report: &mut ValidationReport)
where
    C: Fn() -> IssueContext,
{
    if detection.label.trim().is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::EmptyLabel,
            "Empty label",
            context(),
        ));
    }

    if let Some(score) = detection.score {
        if !(0.0..=1.0).contains(&score) {
            report.add(ValidationIssue::warning(
                IssueCode::ScoreOutOfRange,
                format!("Score {} outside [0, 1]", score),
                context(),
            ));
        }
    }
}
