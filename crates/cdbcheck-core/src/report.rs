//! Violation and report types for structured output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Category of a structural violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Name does not match its grammar or fails the separator pre-check.
    Format,
    /// A matched field is invalid on its own (width, padding, range).
    Field,
    /// A field is invalid only given another field or its directory.
    CrossField,
    /// Archive size, container format or compression method.
    ArchiveStructure,
    /// An entry inside an archive fails name validation.
    ArchiveEntry,
}

impl ViolationKind {
    /// Stable identifier used in text and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Format => "format",
            ViolationKind::Field => "field",
            ViolationKind::CrossField => "cross_field",
            ViolationKind::ArchiveStructure => "archive_structure",
            ViolationKind::ArchiveEntry => "archive_entry",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conformance defect found during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Category of the defect.
    pub kind: ViolationKind,

    /// Human-readable description, echoing the offending literal.
    pub message: String,

    /// File or directory the defect was found on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Archive entry name, when the defect is inside an archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

impl Violation {
    /// Creates a new violation without path context.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: None,
            entry: None,
        }
    }

    /// Builder method to set the path context.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Re-scopes a name violation to an archive entry.
    ///
    /// The kind becomes [`ViolationKind::ArchiveEntry`] and the message gains
    /// an `in entry '<name>'` suffix so it reads differently from the same
    /// defect on a top-level file name.
    pub fn in_entry(mut self, entry: &str) -> Self {
        if self.kind != ViolationKind::ArchiveEntry {
            self.message = format!("{} in entry '{}'", self.message, entry);
        }
        self.kind = ViolationKind::ArchiveEntry;
        self.entry = Some(entry.to_string());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path {
            Some(ref path) => write!(f, "{}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Whether a scan ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScanStatus {
    Complete,
    /// The scan stopped early; the violations collected so far are kept.
    Aborted { reason: String },
}

/// Per-kind violation counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub format: usize,
    pub field: usize,
    pub cross_field: usize,
    pub archive_structure: usize,
    pub archive_entry: usize,
}

impl ScanSummary {
    /// Total number of violations.
    pub fn total(&self) -> usize {
        self.format + self.field + self.cross_field + self.archive_structure + self.archive_entry
    }
}

/// Complete, ordered result of a validation run.
///
/// Violations are never deduplicated; their order is the order in which
/// files were visited, then the order each validator emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub status: ScanStatus,
    /// Number of leaf files (names or archives) that were checked.
    pub files_checked: usize,
    pub violations: Vec<Violation>,
}

impl ScanReport {
    /// Creates an empty, complete report.
    pub fn new() -> Self {
        Self {
            status: ScanStatus::Complete,
            files_checked: 0,
            violations: Vec::new(),
        }
    }

    /// Appends one violation.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Appends violations that do not belong to a checked file.
    pub fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }

    /// Appends all violations for one checked file.
    pub fn record_file(&mut self, violations: Vec<Violation>) {
        self.files_checked += 1;
        self.violations.extend(violations);
    }

    /// Marks the report as aborted.
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.status = ScanStatus::Aborted {
            reason: reason.into(),
        };
    }

    /// True when the scan completed and found nothing.
    pub fn is_pass(&self) -> bool {
        self.status == ScanStatus::Complete && self.violations.is_empty()
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.status, ScanStatus::Aborted { .. })
    }

    /// Counts violations per kind.
    pub fn summary(&self) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for violation in &self.violations {
            match violation.kind {
                ViolationKind::Format => summary.format += 1,
                ViolationKind::Field => summary.field += 1,
                ViolationKind::CrossField => summary.cross_field += 1,
                ViolationKind::ArchiveStructure => summary.archive_structure += 1,
                ViolationKind::ArchiveEntry => summary.archive_entry += 1,
            }
        }
        summary
    }

    /// All messages joined by newlines, the form a test harness reports on failure.
    pub fn joined_messages(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ScanReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_builder() {
        let violation =
            Violation::new(ViolationKind::Field, "Invalid latitude (N99)").with_path("Tiles/N99");

        assert_eq!(violation.kind, ViolationKind::Field);
        assert_eq!(violation.path, Some(PathBuf::from("Tiles/N99")));
        assert_eq!(violation.to_string(), "Tiles/N99: Invalid latitude (N99)");
    }

    #[test]
    fn test_violation_in_entry() {
        let violation = Violation::new(ViolationKind::Field, "Invalid code 000").in_entry("a.rgb");
        assert_eq!(violation.kind, ViolationKind::ArchiveEntry);
        assert_eq!(violation.message, "Invalid code 000 in entry 'a.rgb'");
        assert_eq!(violation.entry.as_deref(), Some("a.rgb"));
    }

    #[test]
    fn test_entry_violation_message_not_suffixed_twice() {
        let violation = Violation::new(
            ViolationKind::ArchiveEntry,
            "Invalid entry '0.flt' in ZIP archive",
        )
        .in_entry("0.flt");
        assert_eq!(violation.message, "Invalid entry '0.flt' in ZIP archive");
    }

    #[test]
    fn test_report_pass_and_summary() {
        let mut report = ScanReport::new();
        assert!(report.is_pass());

        report.record_file(vec![]);
        report.record_file(vec![
            Violation::new(ViolationKind::Format, "Invalid file name: 0.zip"),
            Violation::new(ViolationKind::ArchiveStructure, "Zero-length ZIP archive"),
        ]);

        assert!(!report.is_pass());
        assert_eq!(report.files_checked, 2);
        let summary = report.summary();
        assert_eq!(summary.format, 1);
        assert_eq!(summary.archive_structure, 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(
            report.joined_messages(),
            "Invalid file name: 0.zip\nZero-length ZIP archive"
        );
    }

    #[test]
    fn test_aborted_report_never_passes() {
        let mut report = ScanReport::new();
        report.abort("timed out");
        assert!(report.is_aborted());
        assert!(!report.is_pass());
    }
}
