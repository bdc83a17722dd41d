//! Shared text and JSON output for the check commands.

use anyhow::{Context, Result};
use cdbcheck_core::{ScanReport, ScanStatus, ScanSummary, Violation, ViolationKind};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

/// JSON output of `cdbcheck scan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Whether the scan completed without violations.
    pub success: bool,
    pub root: String,
    pub status: ScanStatus,
    pub files_checked: usize,
    pub summary: ScanSummary,
    pub violations: Vec<Violation>,
}

impl ScanOutput {
    pub fn new(root: &str, report: &ScanReport) -> Self {
        Self {
            success: report.is_pass(),
            root: root.to_string(),
            status: report.status.clone(),
            files_checked: report.files_checked,
            summary: report.summary(),
            violations: report.violations.clone(),
        }
    }
}

/// JSON output of `cdbcheck check-name` and `cdbcheck check-archive`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutput {
    pub success: bool,
    /// The name or path that was checked.
    pub subject: String,
    pub dataset: u16,
    pub violations: Vec<Violation>,
}

pub(crate) fn print_json<T: Serialize>(output: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Prints violations one per line, in report order.
pub(crate) fn print_violations(violations: &[Violation]) {
    for violation in violations {
        let marker = match violation.kind {
            ViolationKind::Format | ViolationKind::ArchiveStructure => "x".red(),
            ViolationKind::Field | ViolationKind::CrossField | ViolationKind::ArchiveEntry => {
                "x".yellow()
            }
        };
        let location = violation
            .path
            .as_ref()
            .map(|p| format!(" {}", p.display()))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            marker,
            violation.kind.as_str().cyan(),
            location.dimmed(),
            violation.message
        );
    }
}

pub(crate) fn print_summary_line(summary: &ScanSummary, files_checked: usize, passed: bool) {
    let line = format!(
        "{} file(s) checked, {} violation(s): {} format, {} field, {} cross-field, {} archive, {} entry",
        files_checked,
        summary.total(),
        summary.format,
        summary.field,
        summary.cross_field,
        summary.archive_structure,
        summary.archive_entry
    );
    if passed {
        println!("\n{} {}", "PASSED".green().bold(), line.dimmed());
    } else {
        println!("\n{} {}", "FAILED".red().bold(), line.dimmed());
    }
}

/// 0 for a clean run, 1 when violations were found.
pub(crate) fn exit_code(violations: &[Violation]) -> ExitCode {
    if violations.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
