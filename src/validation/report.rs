//! Validation report types for structured error reporting.
//!
//! Reports can be printed for users or serialized to JSON for tooling.

use std::fmt;

use serde::Serialize;

/// The result of validating a detection mapping.
///
/// Contains all issues found during validation, categorized by severity.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if validation passed in strict mode (no errors or warnings).
    pub fn is_ok_strict(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues carrying the given code.
    pub fn with_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    /// Machine-readable summary: counts plus every issue.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Summary<'a> {
            error_count: usize,
            warning_count: usize,
            issues: &'a [ValidationIssue],
        }
        serde_json::to_string_pretty(&Summary {
            error_count: self.error_count(),
            warning_count: self.warning_count(),
            issues: &self.issues,
        })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    pub message: String,

    /// Where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Suspicious but usable; queries still behave.
    Warning,
    /// Breaks the bounds invariants queries rely on.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // Geometry
    /// A coordinate is NaN or infinite.
    BoundsNotFinite,
    /// Some axis has `lo > hi`.
    InvalidBoundsOrdering,
    /// A spatial coordinate lies outside the unit frame.
    OutOfFrame,
    /// The interval has zero duration.
    ZeroLength,
    /// The box has zero width or height.
    ZeroArea,

    // Payload
    /// The label is empty.
    EmptyLabel,
    /// The score lies outside `[0, 1]` or is not finite.
    ScoreOutOfRange,

    // Mapping
    /// A key holds no intervals.
    EmptyKey,
    /// Two intervals under one key share bounds, label and track.
    DuplicateDetection,
}

/// Context about where a validation issue occurred.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum IssueContext {
    /// Issue with the mapping as a whole.
    Mapping,
    /// Issue with one key's set.
    Key { key: String },
    /// Issue with one interval, by its sorted position under its key.
    Interval { key: String, index: usize },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Mapping => write!(f, "mapping"),
            IssueContext::Key { key } => write!(f, "key '{}'", key),
            IssueContext::Interval { key, index } => write!(f, "key '{}' interval {}", key, index),
        }
    }
}
