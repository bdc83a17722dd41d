//! cdbcheck - naming and structure conformance checks for CDB repositories
//!
//! This binary scans a CDB tree, or checks single names and archives, and
//! reports every defect it finds.

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

use cdbcheck_cli::commands;
use cdbcheck_cli::commands::scan::ScanRequest;
use cdbcheck_cli::logging;
use cdbcheck_core::DatasetFamily;

/// cdbcheck - CDB Naming and Structure Conformance Checker
#[derive(Parser)]
#[command(name = "cdbcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase diagnostic logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a CDB root and check every model file and archive
    Scan {
        /// CDB root directory
        #[arg(short, long)]
        root: String,

        /// Dataset families to scan (gsmodel, gtmodel); default: all
        #[arg(long)]
        family: Vec<DatasetFamily>,

        /// Dataset codes to scan; default: all
        #[arg(long)]
        dataset: Vec<u16>,

        /// Reference policy file (JSON); default: built-in table
        #[arg(long)]
        policy: Option<String>,

        /// Worker threads for leaf checks (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Abort the scan after this many seconds
        #[arg(long)]
        timeout: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check a single file name, or an archive entry name with --archive
    CheckName {
        /// Name to check
        name: String,

        /// Dataset code whose grammar applies
        #[arg(short, long)]
        dataset: u16,

        /// Check the name as an entry of this archive
        #[arg(long)]
        archive: Option<String>,

        /// Reference policy file (JSON); default: built-in table
        #[arg(long)]
        policy: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check one archive: name, container structure and entry names
    CheckArchive {
        /// Path to the archive
        path: String,

        /// Dataset code whose grammar applies
        #[arg(short, long)]
        dataset: u16,

        /// Reference policy file (JSON); default: built-in table
        #[arg(long)]
        policy: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List known dataset grammars and directory layouts
    Datasets {
        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Scan {
            root,
            family,
            dataset,
            policy,
            jobs,
            timeout,
            json,
        } => commands::scan::run(&ScanRequest {
            root: &root,
            families: family,
            datasets: dataset,
            policy: policy.as_deref(),
            jobs,
            timeout_secs: timeout,
            json,
        }),
        Commands::CheckName {
            name,
            dataset,
            archive,
            policy,
            json,
        } => commands::check_name::run(
            &name,
            dataset,
            archive.as_deref(),
            policy.as_deref(),
            json,
        ),
        Commands::CheckArchive {
            path,
            dataset,
            policy,
            json,
        } => commands::check_archive::run(&path, dataset, policy.as_deref(), json),
        Commands::Datasets { json } => commands::datasets::run(json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red(), e);
            ExitCode::from(2)
        }
    }
}
