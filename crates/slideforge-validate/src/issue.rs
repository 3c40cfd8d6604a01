//! Validation findings

use std::fmt;

use serde::Serialize;

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but accepted by consumers
    Warning,
    /// The part does not conform
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single finding in one part of a package
///
/// `line` and `column` are 1-based; both are 0 when the finding has no
/// position (a missing part, an unlisted content type).
///
/// # Example
///
/// ```
/// use slideforge_validate::{Severity, ValidationIssue};
///
/// let issue = ValidationIssue::error("ppt/slides/slide1.xml", "element 'p:foo' is not expected in 'p:spTree'")
///     .at(12, 5);
/// assert_eq!(issue.severity, Severity::Error);
/// assert_eq!(
///     issue.to_string(),
///     "ppt/slides/slide1.xml:12:5: error: element 'p:foo' is not expected in 'p:spTree'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub part_path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn new(severity: Severity, part_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            part_path: part_path.into(),
            line: 0,
            column: 0,
            message: message.into(),
            severity,
        }
    }

    pub fn error(part_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, part_path, message)
    }

    pub fn warning(part_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, part_path, message)
    }

    /// Set the position
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Identity used to match findings across documents; positions shift
    /// with every edit and are left out
    pub fn key(&self) -> (&str, &str) {
        (&self.part_path, &self.message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{}:{}:{}: {}: {}",
                self.part_path, self.line, self.column, self.severity, self.message
            )
        } else {
            write!(f, "{}: {}: {}", self.part_path, self.severity, self.message)
        }
    }
}

/// Whether a finding was already present in the reference document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueOrigin {
    PreExisting,
    Introduced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedIssue {
    #[serde(flatten)]
    pub issue: ValidationIssue,
    pub origin: IssueOrigin,
}

/// Outcome of a validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// XML parts that were checked
    pub parts_checked: usize,
    pub issues: Vec<ReportedIssue>,
    /// Whether findings were classified against a reference document
    pub differential: bool,
}

impl ValidationReport {
    /// Findings that fail the run
    pub fn introduced(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|r| r.origin == IssueOrigin::Introduced)
            .map(|r| &r.issue)
    }

    pub fn pre_existing(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|r| r.origin == IssueOrigin::PreExisting)
            .map(|r| &r.issue)
    }

    /// No introduced error
    pub fn passed(&self) -> bool {
        !self.introduced().any(ValidationIssue::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.introduced().filter(|i| i.is_error()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_position() {
        let issue = ValidationIssue::warning("ppt/media/a.emf", "no content type");
        assert_eq!(issue.to_string(), "ppt/media/a.emf: warning: no content type");
    }

    #[test]
    fn test_key_ignores_position() {
        let a = ValidationIssue::error("p.xml", "bad").at(1, 1);
        let b = ValidationIssue::error("p.xml", "bad").at(40, 2);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_report_passes_with_only_warnings_or_pre_existing() {
        let report = ValidationReport {
            parts_checked: 2,
            issues: vec![
                ReportedIssue {
                    issue: ValidationIssue::warning("a.xml", "w"),
                    origin: IssueOrigin::Introduced,
                },
                ReportedIssue {
                    issue: ValidationIssue::error("b.xml", "e"),
                    origin: IssueOrigin::PreExisting,
                },
            ],
            differential: true,
        };
        assert!(report.passed());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.pre_existing().count(), 1);
    }

    #[test]
    fn test_serializes_flat() {
        let reported = ReportedIssue {
            issue: ValidationIssue::error("a.xml", "bad").at(3, 4),
            origin: IssueOrigin::Introduced,
        };
        let json = serde_json::to_value(&reported).unwrap();
        assert_eq!(json["part_path"], "a.xml");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["origin"], "introduced");
    }
}
