//! On-disk CDB trees for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::zip_builder::ZipBuilder;

/// Where a GSModel archive sits: tile, dataset directory, LOD and UREF.
#[derive(Debug, Clone, Copy)]
pub struct TileLocation<'a> {
    pub lat: &'a str,
    pub lon: &'a str,
    pub dataset_dir: &'a str,
    pub lod: &'a str,
    pub uref: &'a str,
}

impl<'a> TileLocation<'a> {
    /// `Tiles/N62/W162/<dataset_dir>/L07/U38`, matching the standard examples.
    pub fn standard(dataset_dir: &'a str) -> Self {
        Self {
            lat: "N62",
            lon: "W162",
            dataset_dir,
            lod: "L07",
            uref: "U38",
        }
    }
}

/// Where a GTModel file sits: dataset directory, feature classification
/// and an optional LOD level.
#[derive(Debug, Clone, Copy)]
pub struct FeatureLocation<'a> {
    pub dataset_dir: &'a str,
    pub category: &'a str,
    pub subcategory: &'a str,
    pub feature_type: &'a str,
    pub lod: Option<&'a str>,
}

impl<'a> FeatureLocation<'a> {
    /// `GTModel/<dataset_dir>/A_Culture/L_Misc_Feature/015_Building`, the
    /// classification of feature code AL015.
    pub fn building(dataset_dir: &'a str, lod: Option<&'a str>) -> Self {
        Self {
            dataset_dir,
            category: "A_Culture",
            subcategory: "L_Misc_Feature",
            feature_type: "015_Building",
            lod,
        }
    }
}

/// A temporary CDB root.
pub struct CdbFixture {
    pub temp_dir: TempDir,
}

impl CdbFixture {
    /// Creates an empty CDB root.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes an archive built from `zip` under a tile directory.
    pub fn add_gs_archive(&self, at: TileLocation<'_>, name: &str, zip: &ZipBuilder) -> PathBuf {
        self.add_gs_bytes(at, name, &zip.build())
    }

    /// Writes raw bytes as a GSModel leaf file.
    pub fn add_gs_bytes(&self, at: TileLocation<'_>, name: &str, bytes: &[u8]) -> PathBuf {
        let dir = self
            .root()
            .join("Tiles")
            .join(at.lat)
            .join(at.lon)
            .join(at.dataset_dir)
            .join(at.lod)
            .join(at.uref);
        write_file(&dir, name, bytes)
    }

    /// Writes a GTModel payload file.
    pub fn add_gt_file(&self, at: FeatureLocation<'_>, name: &str, bytes: &[u8]) -> PathBuf {
        let mut dir = self
            .root()
            .join("GTModel")
            .join(at.dataset_dir)
            .join(at.category)
            .join(at.subcategory)
            .join(at.feature_type);
        if let Some(lod) = at.lod {
            dir = dir.join(lod);
        }
        write_file(&dir, name, bytes)
    }

    /// Writes any file relative to the root.
    pub fn add_file(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root().join(relative);
        let dir = path.parent().expect("relative path has a parent").to_path_buf();
        let name = path
            .file_name()
            .expect("relative path has a file name")
            .to_string_lossy()
            .into_owned();
        write_file(&dir, &name, bytes)
    }

    /// Writes a reference policy document and returns its path.
    pub fn write_policy(&self, policy: &serde_json::Value) -> PathBuf {
        let path = self.root().join("policy.json");
        let content = serde_json::to_string_pretty(policy).expect("Failed to serialize policy");
        fs::write(&path, content).expect("Failed to write policy");
        path
    }
}

impl Default for CdbFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create directory");
    let path = dir.join(name);
    fs::write(&path, bytes).expect("Failed to write file");
    path
}

/// The standard valid GSModelGeometry archive: one stored entry.
pub fn valid_geometry_archive() -> ZipBuilder {
    ZipBuilder::new().stored(
        "N62W162_D300_S001_T001_L07_U38_R102_AL015_004_Castle.flt",
        b"flight",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gs_archive_lands_in_tile_directory() {
        let fixture = CdbFixture::new();
        let path = fixture.add_gs_archive(
            TileLocation::standard("300_GSModelGeometry"),
            "N62W162_D300_S001_T001_L07_U38_R102.zip",
            &valid_geometry_archive(),
        );
        assert!(path.is_file());
        assert!(path.ends_with(
            "Tiles/N62/W162/300_GSModelGeometry/L07/U38/N62W162_D300_S001_T001_L07_U38_R102.zip"
        ));
    }

    #[test]
    fn test_gt_file_with_lod() {
        let fixture = CdbFixture::new();
        let path = fixture.add_gt_file(
            FeatureLocation::building("510_GTModelGeometry", Some("L10")),
            "D510_S001_T001_L10_AL015_004_Castle.flt",
            b"",
        );
        assert!(path.ends_with("015_Building/L10/D510_S001_T001_L10_AL015_004_Castle.flt"));
    }
}
