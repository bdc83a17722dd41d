//! CLI command implementations

pub mod check_archive;
pub mod check_name;
pub mod datasets;
pub mod scan;

mod reporting;

pub use reporting::{CheckOutput, ScanOutput};

use anyhow::{Context, Result};
use cdbcheck_core::ReferencePolicy;
use std::path::Path;

/// Loads the policy file, or the built-in table when none is given.
pub(crate) fn load_policy(path: Option<&str>) -> Result<ReferencePolicy> {
    match path {
        Some(path) => ReferencePolicy::from_file(Path::new(path))
            .with_context(|| format!("Failed to load policy file: {}", path)),
        None => Ok(ReferencePolicy::builtin()),
    }
}
