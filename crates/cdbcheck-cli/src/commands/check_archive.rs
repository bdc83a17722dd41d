//! Check-archive command implementation
//!
//! Checks one archive file: its name, container structure and entry names.

use anyhow::{bail, Result};
use cdbcheck_core::{check_leaf, GrammarRegistry, Leaf, LeafKind, PathContext};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use super::reporting::{exit_code, print_json, print_violations, CheckOutput};

/// Run the check-archive command.
///
/// # Returns
/// Exit code: 0 if the archive conforms, 1 if violations were found
pub fn run(
    path: &str,
    dataset: u16,
    policy_path: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let archive = Path::new(path);
    if !archive.is_file() {
        bail!("Archive not found: {}", path);
    }

    let policy = super::load_policy(policy_path)?;
    let registry = GrammarRegistry::standard();
    if registry.grammar_for(dataset).is_none() {
        bail!("Dataset {:03} has no filename grammar", dataset);
    }

    let leaf = Leaf {
        path: archive.to_path_buf(),
        dataset,
        kind: LeafKind::Archive,
        context: PathContext::default(),
    };
    let violations = check_leaf(&leaf, registry, &policy);

    if json {
        print_json(&CheckOutput {
            success: violations.is_empty(),
            subject: path.to_string(),
            dataset,
            violations: violations.clone(),
        })?;
    } else {
        println!("{} {}", "Checking:".cyan().bold(), path);
        if violations.is_empty() {
            println!("\n{} No issues found", "PASSED".green().bold());
        } else {
            println!();
            print_violations(&violations);
            println!(
                "\n{} {}",
                "FAILED".red().bold(),
                format!("{} violation(s)", violations.len()).dimmed()
            );
        }
    }

    Ok(exit_code(&violations))
}
