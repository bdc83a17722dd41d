//! End-to-end scans of GSModel tile trees.

use cdbcheck_core::{
    GrammarRegistry, ReferencePolicy, ScanOptions, ScanReport, Scanner, ViolationKind,
};
use cdbcheck_tests::{valid_geometry_archive, CdbFixture, TileLocation, ZipBuilder};
use pretty_assertions::assert_eq;

const ARCHIVE: &str = "N62W162_D300_S001_T001_L07_U38_R102.zip";
const GEOMETRY: &str = "300_GSModelGeometry";

fn scan(fixture: &CdbFixture) -> ScanReport {
    let policy = ReferencePolicy::builtin();
    Scanner::new(GrammarRegistry::standard(), &policy)
        .scan(fixture.root(), &ScanOptions::default())
        .expect("scan should run")
}

fn messages(report: &ScanReport) -> Vec<String> {
    report.violations.iter().map(|v| v.message.clone()).collect()
}

// ============================================================================
// Conforming trees
// ============================================================================

#[test]
fn test_valid_archive_passes() {
    let fixture = CdbFixture::new();
    fixture.add_gs_archive(TileLocation::standard(GEOMETRY), ARCHIVE, &valid_geometry_archive());

    let report = scan(&fixture);
    assert!(report.is_pass(), "unexpected: {:?}", messages(&report));
    assert_eq!(report.files_checked, 1);
}

#[test]
fn test_empty_root_passes_with_nothing_checked() {
    let fixture = CdbFixture::new();
    let report = scan(&fixture);
    assert!(report.is_pass());
    assert_eq!(report.files_checked, 0);
}

#[test]
fn test_texture_archive_with_several_entries_passes() {
    let fixture = CdbFixture::new();
    let zip = ZipBuilder::new()
        .stored("N62W162_D301_S001_T001_L07_U38_R102_AcmeFactoryWall.rgb", b"a")
        .stored("N62W162_D301_S001_T001_L07_U38_R102_Brick_Red.rgb", b"b");
    fixture.add_gs_archive(
        TileLocation::standard("301_GSModelTexture"),
        "N62W162_D301_S001_T001_L07_U38_R102.zip",
        &zip,
    );

    let report = scan(&fixture);
    assert!(report.is_pass(), "unexpected: {:?}", messages(&report));
}

#[test]
fn test_unrelated_directories_are_ignored() {
    let fixture = CdbFixture::new();
    fixture.add_file("Metadata/Version.xml", b"<Version/>");
    fixture.add_file("Tiles/N62/W162/001_Elevation/LC/U0/readme.txt", b"");

    let report = scan(&fixture);
    assert!(report.is_pass(), "unexpected: {:?}", messages(&report));
    assert_eq!(report.files_checked, 0);
}

// ============================================================================
// Directory defects
// ============================================================================

#[test]
fn test_misnamed_latitude_directory() {
    let fixture = CdbFixture::new();
    let at = TileLocation {
        lat: "n62",
        ..TileLocation::standard(GEOMETRY)
    };
    fixture.add_gs_archive(at, ARCHIVE, &valid_geometry_archive());

    let report = scan(&fixture);
    assert_eq!(messages(&report), vec!["Invalid latitude directory: n62"]);
    assert_eq!(report.violations[0].kind, ViolationKind::Format);
    assert_eq!(
        report.violations[0].path.as_deref(),
        Some(fixture.root().join("Tiles/n62").as_path())
    );
    assert!(!report.is_pass());
}

#[test]
fn test_misnamed_lod_directory() {
    let fixture = CdbFixture::new();
    let at = TileLocation {
        lod: "L7",
        ..TileLocation::standard(GEOMETRY)
    };
    fixture.add_gs_archive(at, ARCHIVE, &valid_geometry_archive());

    let report = scan(&fixture);
    assert_eq!(messages(&report), vec!["Invalid LOD directory: L7"]);
    assert_eq!(report.files_checked, 0);
}

#[test]
fn test_stray_folder_in_dataset_is_reported() {
    let fixture = CdbFixture::new();
    fixture.add_gs_archive(TileLocation::standard(GEOMETRY), ARCHIVE, &valid_geometry_archive());
    fixture.add_file("Tiles/N62/W162/300_GSModelGeometry/notes/readme.txt", b"");

    let report = scan(&fixture);
    assert_eq!(messages(&report), vec!["Invalid LOD directory: notes"]);
    assert_eq!(report.files_checked, 1);
}

// ============================================================================
// Archive name defects
// ============================================================================

#[test]
fn test_latitude_out_of_range() {
    let fixture = CdbFixture::new();
    let at = TileLocation {
        lat: "N99",
        ..TileLocation::standard(GEOMETRY)
    };
    fixture.add_gs_archive(at, "N99W162_D300_S001_T001_L07_U38_R102.zip", &ZipBuilder::new());

    let report = scan(&fixture);
    assert_eq!(messages(&report), vec!["Invalid latitude (N99)"]);
    assert_eq!(report.violations[0].kind, ViolationKind::Field);
}

#[test]
fn test_name_disagrees_with_tile_directory() {
    let fixture = CdbFixture::new();
    let at = TileLocation {
        lat: "N63",
        ..TileLocation::standard(GEOMETRY)
    };
    fixture.add_gs_archive(at, ARCHIVE, &ZipBuilder::new());

    let report = scan(&fixture);
    assert_eq!(
        messages(&report),
        vec!["Latitude N62 does not match tile directory N63"]
    );
    assert_eq!(report.violations[0].kind, ViolationKind::CrossField);
}

#[test]
fn test_uref_out_of_bounds_for_lod() {
    let fixture = CdbFixture::new();
    let at = TileLocation {
        lod: "L02",
        uref: "U9",
        ..TileLocation::standard(GEOMETRY)
    };
    fixture.add_gs_archive(at, "N62W162_D300_S001_T001_L02_U9_R1.zip", &ZipBuilder::new());

    let report = scan(&fixture);
    assert_eq!(
        messages(&report),
        vec!["UREF value out of bounds: 9 (valid range 0-3 for L02)"]
    );
}

#[test]
fn test_wrong_archive_extension() {
    let fixture = CdbFixture::new();
    fixture.add_gs_archive(
        TileLocation::standard(GEOMETRY),
        "N62W162_D300_S001_T001_L07_U38_R102.7z",
        &ZipBuilder::new(),
    );

    let report = scan(&fixture);
    assert_eq!(
        messages(&report),
        vec!["Invalid archive extension: 7z (expected zip)"]
    );
}

#[test]
fn test_unknown_selector() {
    let fixture = CdbFixture::new();
    fixture.add_gs_archive(
        TileLocation::standard(GEOMETRY),
        "N62W162_D300_S005_T001_L07_U38_R102.zip",
        &ZipBuilder::new(),
    );

    let report = scan(&fixture);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, ViolationKind::CrossField);
    assert!(report.violations[0].message.contains("005"));
}

// ============================================================================
// Archive container and entry defects
// ============================================================================

#[test]
fn test_single_invalid_entry_gives_one_violation() {
    let fixture = CdbFixture::new();
    let path = fixture.add_gs_archive(
        TileLocation::standard(GEOMETRY),
        ARCHIVE,
        &ZipBuilder::new().stored("0.flt", b"x"),
    );

    let report = scan(&fixture);
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.kind, ViolationKind::ArchiveEntry);
    assert_eq!(violation.entry.as_deref(), Some("0.flt"));
    assert_eq!(violation.path.as_deref(), Some(path.as_path()));
    assert!(violation
        .message
        .starts_with("Invalid entry '0.flt' in ZIP archive"));
}

#[test]
fn test_misnamed_archive_is_reported_once() {
    let fixture = CdbFixture::new();
    let stem = "N62W162_D306_S001_T001_L07_U38_R102";
    let zip = ZipBuilder::new()
        .stored(&format!("{}_Wall.rgb", stem), b"a")
        .stored(&format!("{}_Floor.rgb", stem), b"b");
    fixture.add_gs_archive(TileLocation::standard("306_GSModelInteriorTexture"), "0.zip", &zip);

    let report = scan(&fixture);
    assert_eq!(
        messages(&report),
        vec!["Invalid file name: 0.zip (expected 6 underscore separators, found 0)"]
    );
    assert_eq!(report.violations[0].kind, ViolationKind::Format);
}

#[test]
fn test_entry_from_another_tile() {
    let fixture = CdbFixture::new();
    let entry = "N62W162_D300_S001_T001_L07_U38_R103_AL015_004_Castle.flt";
    fixture.add_gs_archive(
        TileLocation::standard(GEOMETRY),
        ARCHIVE,
        &ZipBuilder::new().stored(entry, b""),
    );

    let report = scan(&fixture);
    assert_eq!(
        messages(&report),
        vec![format!(
            "Entry '{}' does not belong to archive 'N62W162_D300_S001_T001_L07_U38_R102'",
            entry
        )]
    );
}

#[test]
fn test_zero_length_archive() {
    let fixture = CdbFixture::new();
    fixture.add_gs_bytes(TileLocation::standard(GEOMETRY), ARCHIVE, b"");

    let report = scan(&fixture);
    assert_eq!(messages(&report), vec!["Zero-length ZIP archive"]);
    assert_eq!(report.violations[0].kind, ViolationKind::ArchiveStructure);
}

#[test]
fn test_not_a_zip() {
    let fixture = CdbFixture::new();
    fixture.add_gs_bytes(
        TileLocation::standard(GEOMETRY),
        ARCHIVE,
        b"this is a flight file, not an archive",
    );

    let report = scan(&fixture);
    assert_eq!(messages(&report), vec!["Invalid ZIP archive file"]);
}

#[test]
fn test_compressed_entry() {
    let fixture = CdbFixture::new();
    let entry = "N62W162_D300_S001_T001_L07_U38_R102_AL015_004_Castle.flt";
    fixture.add_gs_archive(
        TileLocation::standard(GEOMETRY),
        ARCHIVE,
        &ZipBuilder::new().deflated(entry, b"flight"),
    );

    let report = scan(&fixture);
    assert_eq!(
        messages(&report),
        vec![format!("ZIP entry '{}' should not be compressed (deflated)", entry)]
    );
}

#[test]
fn test_one_report_per_defect_across_archives() {
    let fixture = CdbFixture::new();
    fixture.add_gs_archive(TileLocation::standard(GEOMETRY), ARCHIVE, &valid_geometry_archive());
    let second = TileLocation {
        uref: "U39",
        ..TileLocation::standard(GEOMETRY)
    };
    fixture.add_gs_bytes(second, "N62W162_D300_S001_T001_L07_U39_R102.zip", b"");

    let report = scan(&fixture);
    assert_eq!(report.files_checked, 2);
    assert_eq!(messages(&report), vec!["Zero-length ZIP archive"]);
    assert_eq!(report.summary().archive_structure, 1);
}
