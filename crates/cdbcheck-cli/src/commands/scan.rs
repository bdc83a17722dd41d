//! Scan command implementation
//!
//! Walks a CDB root and checks every model file and archive it finds.

use anyhow::{Context, Result};
use cdbcheck_core::{DatasetFamily, GrammarRegistry, ScanOptions, ScanStatus, Scanner};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use super::reporting::{print_json, print_summary_line, print_violations, ScanOutput};

/// Arguments of the scan command.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest<'a> {
    pub root: &'a str,
    pub families: Vec<DatasetFamily>,
    pub datasets: Vec<u16>,
    pub policy: Option<&'a str>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<f64>,
    pub json: bool,
}

/// Run the scan command.
///
/// # Returns
/// Exit code: 0 if the tree conforms, 1 if violations were found,
/// 2 if the scan was aborted
pub fn run(request: &ScanRequest<'_>) -> Result<ExitCode> {
    let policy = super::load_policy(request.policy)?;
    let scanner = Scanner::new(GrammarRegistry::standard(), &policy);

    let mut options = ScanOptions {
        families: request.families.clone(),
        datasets: request.datasets.clone(),
        ..ScanOptions::default()
    };
    if let Some(jobs) = request.jobs {
        options.jobs = jobs;
    }
    if let Some(secs) = request.timeout_secs {
        let timeout = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Invalid timeout: {}", secs))?;
        options.timeout = Some(timeout);
    }

    let report = scanner
        .scan(Path::new(request.root), &options)
        .with_context(|| format!("Failed to scan {}", request.root))?;

    if request.json {
        print_json(&ScanOutput::new(request.root, &report))?;
    } else {
        println!("{} {}", "Scanning:".cyan().bold(), request.root);
        if !report.violations.is_empty() {
            println!("\n{}", "Violations:".red().bold());
            print_violations(&report.violations);
        }
        if let ScanStatus::Aborted { reason } = &report.status {
            println!("\n{} {}", "ABORTED".yellow().bold(), reason);
        }
        print_summary_line(&report.summary(), report.files_checked, report.is_pass());
    }

    Ok(if report.is_aborted() {
        ExitCode::from(2)
    } else if report.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("absent");
        let root = root.to_string_lossy();
        let request = ScanRequest {
            root: &root,
            json: true,
            ..ScanRequest::default()
        };
        let err = run(&request).unwrap_err();
        assert!(format!("{:#}", err).contains("CDB root not found"));
    }

    #[test]
    fn test_negative_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_string_lossy();
        let request = ScanRequest {
            root: &root,
            timeout_secs: Some(-1.0),
            json: true,
            ..ScanRequest::default()
        };
        assert!(run(&request).is_err());
    }

    #[test]
    fn test_empty_root_passes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_string_lossy();
        let request = ScanRequest {
            root: &root,
            json: true,
            ..ScanRequest::default()
        };
        assert_eq!(run(&request).unwrap(), ExitCode::SUCCESS);
    }
}
