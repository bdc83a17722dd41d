//! Check-name command implementation
//!
//! Validates a single file or archive-entry name without touching the disk.

use anyhow::{Context, Result};
use cdbcheck_core::{validate_name, GrammarRegistry, NameContext};
use colored::Colorize;
use std::process::ExitCode;

use super::reporting::{exit_code, print_json, print_violations, CheckOutput};

/// Run the check-name command.
///
/// # Arguments
/// * `name` - File or entry name to check
/// * `dataset` - Dataset code whose grammar applies
/// * `archive` - When set, `name` is checked as an entry of this archive
/// * `policy_path` - Optional reference policy file
/// * `json` - Emit JSON instead of colored text
pub fn run(
    name: &str,
    dataset: u16,
    archive: Option<&str>,
    policy_path: Option<&str>,
    json: bool,
) -> Result<ExitCode> {
    let policy = super::load_policy(policy_path)?;
    let registry = GrammarRegistry::standard();

    let violations = match archive {
        Some(archive) => {
            let grammar = registry
                .entry_grammar_for(dataset)
                .with_context(|| format!("Dataset {:03} has no archive entry grammar", dataset))?;
            let stem = archive.strip_suffix(".zip").unwrap_or(archive);
            validate_name(name, grammar, &policy, &NameContext::entry(stem))
        }
        None => {
            let grammar = registry
                .grammar_for(dataset)
                .with_context(|| format!("Dataset {:03} has no filename grammar", dataset))?;
            validate_name(name, grammar, &policy, &NameContext::file())
        }
    };

    if json {
        print_json(&CheckOutput {
            success: violations.is_empty(),
            subject: name.to_string(),
            dataset,
            violations: violations.clone(),
        })?;
    } else if violations.is_empty() {
        println!("{} {}", "PASSED".green().bold(), name);
    } else {
        println!("{} {}", "FAILED".red().bold(), name);
        print_violations(&violations);
    }

    Ok(exit_code(&violations))
}
