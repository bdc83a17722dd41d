//! cdbcheck integration test infrastructure
//!
//! Builds CDB trees on disk and writes ZIP archives byte by byte, so the
//! scanner can be exercised end to end without binary fixtures.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cdbcheck-tests
//! ```

pub mod fixtures;
pub mod zip_builder;

pub use fixtures::{valid_geometry_archive, CdbFixture, FeatureLocation, TileLocation};
pub use zip_builder::{ZipBuilder, ZipMethod};
