//! Datasets command implementation
//!
//! Lists the filename grammars and directory layouts the checker knows.

use anyhow::Result;
use cdbcheck_core::{standard_layouts, FilenameGrammar, GrammarRegistry};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

use super::reporting::print_json;

/// One dataset in the JSON listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub code: u16,
    pub name: String,
    pub pattern: String,
    pub separators: String,
    pub extensions: Vec<String>,
    pub example: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_example: Option<String>,
}

/// Builds the listing from the standard registry and layouts.
pub fn collect() -> Vec<DatasetInfo> {
    let registry = GrammarRegistry::standard();
    let layouts = standard_layouts();

    registry
        .grammars()
        .map(|grammar| DatasetInfo {
            code: grammar.dataset,
            name: grammar.name.to_string(),
            pattern: grammar.pattern().to_string(),
            separators: grammar.separators.to_string(),
            extensions: grammar.extensions.iter().map(|e| e.to_string()).collect(),
            example: grammar.example.to_string(),
            layout: layouts
                .iter()
                .find(|layout| layout.dataset == grammar.dataset)
                .map(|layout| layout.pattern()),
            entry_example: registry
                .entry_grammar_for(grammar.dataset)
                .map(|entry: &FilenameGrammar| entry.example.to_string()),
        })
        .collect()
}

/// Run the datasets command.
pub fn run(json: bool) -> Result<ExitCode> {
    let datasets = collect();

    if json {
        print_json(&datasets)?;
        return Ok(ExitCode::SUCCESS);
    }

    for info in &datasets {
        println!(
            "{} {}",
            format!("{:03}", info.code).cyan().bold(),
            info.name.bold()
        );
        println!("    {} {}", "example:".dimmed(), info.example);
        println!(
            "    {} {} underscore(s), .{}",
            "separators:".dimmed(),
            info.separators,
            info.extensions.join(" or .")
        );
        if let Some(layout) = &info.layout {
            println!("    {} {}", "layout:".dimmed(), layout);
        }
        if let Some(entry) = &info.entry_example {
            println!("    {} {}", "entry:".dimmed(), entry);
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_listing_covers_layouts() {
        let datasets = collect();
        let gs = datasets.iter().find(|d| d.code == 306).unwrap();
        assert_eq!(
            gs.layout.as_deref(),
            Some("Tiles/{lat}/{lon}/306_GSModelInteriorTexture/{lod}/{uref}")
        );
        assert!(gs.entry_example.is_some());

        let mmodel = datasets.iter().find(|d| d.code == 600).unwrap();
        assert!(mmodel.layout.is_none());
        assert_eq!(mmodel.extensions, vec!["flt"]);

        let navigation = datasets.iter().find(|d| d.code == 401).unwrap();
        assert_eq!(navigation.example, "D401_S001_T001.dbf");
        assert_eq!(navigation.extensions, vec!["dbf"]);
    }
}
