//! Naming and structure conformance checks for CDB repositories.
//!
//! A CDB repository encodes tile location, dataset, component selectors,
//! level of detail and sub-tile references in every directory and file name.
//! This crate checks those names against per-dataset grammars, checks tiled
//! archives for size, format and compression, and reports every defect found.
//!
//! # Example
//!
//! ```no_run
//! use cdbcheck_core::{GrammarRegistry, ReferencePolicy, ScanOptions, Scanner};
//! use std::path::Path;
//!
//! let policy = ReferencePolicy::builtin();
//! let scanner = Scanner::new(GrammarRegistry::standard(), &policy);
//! let report = scanner.scan(Path::new("/data/cdb"), &ScanOptions::default()).unwrap();
//!
//! if !report.is_pass() {
//!     eprintln!("{}", report.joined_messages());
//! }
//! ```

pub mod archive;
pub mod error;
pub mod fields;
pub mod grammar;
pub mod layout;
pub mod name;
pub mod policy;
pub mod report;
pub mod scan;
pub mod tile;
pub mod walker;

pub use archive::{
    validate_archive, validate_entries, ArchiveDescriptor, ArchiveEntry, Compression,
    MAX_ARCHIVE_SIZE,
};
pub use error::{ArchiveError, PolicyError, ScanError};
pub use grammar::{FieldName, FilenameGrammar, GrammarRegistry, Separators};
pub use layout::{standard_layouts, DatasetFamily, DatasetLayout, LeafKind, NodeRole};
pub use name::{validate_name, NameContext, NameScope, PathContext};
pub use policy::{DatasetPolicy, ReferencePolicy};
pub use report::{ScanReport, ScanStatus, ScanSummary, Violation, ViolationKind};
pub use scan::{CancelToken, ScanOptions, Scanner};
pub use walker::{check_leaf, collect_leaves, walk, Leaf, WalkItem};
