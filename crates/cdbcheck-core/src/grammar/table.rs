//! The CDB filename grammar table.

use super::{
    ExtensionKind, FieldName, FieldRule, FieldSpec, GrammarBuilder, GrammarRegistry, Separators,
};

/// Tile location, dataset, selectors, LOD and sub-tile references.
const TILE_PREFIX: &str = r"(?<lat>(S|N)[0-9]{2})(?<lon>(E|W)[0-9]{3})_D(?<datasetCode>[0-9]{3})_S(?<cs1>[0-9]{3})_T(?<cs2>[0-9]{3})_(?<lod>LC|L[0-9]{2})_U(?<uref>[0-9]+)_R(?<rref>[0-9]+)";

/// Underscores in [`TILE_PREFIX`].
const TILE_SEPARATORS: usize = 6;

const TILE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(FieldName::Latitude, FieldRule::Latitude),
    FieldSpec::new(FieldName::Longitude, FieldRule::Longitude),
    FieldSpec::new(FieldName::DatasetCode, FieldRule::DatasetCode),
    FieldSpec::new(FieldName::Cs1, FieldRule::ZeroPadded { width: 3 }),
    FieldSpec::new(FieldName::Cs2, FieldRule::ZeroPadded { width: 3 }),
    FieldSpec::new(FieldName::Lod, FieldRule::Lod),
    FieldSpec::new(FieldName::Uref, FieldRule::TileRef),
    FieldSpec::new(FieldName::Rref, FieldRule::TileRef),
];

const SELECTOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(FieldName::Cs1, FieldRule::ZeroPadded { width: 3 }),
    FieldSpec::new(FieldName::Cs2, FieldRule::ZeroPadded { width: 3 }),
];

const LOD_FIELD: &[FieldSpec] = &[FieldSpec::new(FieldName::Lod, FieldRule::Lod)];

const MODEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(FieldName::FeatureCode, FieldRule::FixedLength(5)),
    FieldSpec::new(FieldName::FeatureSubCode, FieldRule::ZeroPadded { width: 3 }),
    FieldSpec::new(FieldName::ModelName, FieldRule::MaxLength(32)),
];

const TEXTURE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(FieldName::TextureSubCode, FieldRule::ZeroPadded { width: 2 }),
    FieldSpec::new(FieldName::TextureName, FieldRule::MaxLength(32)),
];

const EXT_FIELD: &[FieldSpec] = &[FieldSpec::new(FieldName::Ext, FieldRule::Extension)];

/// What follows the tile prefix inside a GSModel archive.
#[derive(Clone, Copy)]
enum EntryShape {
    /// `_{featureCode}_{fsc}_{modl}.{ext}`
    Model(&'static [&'static str]),
    /// `_{tnam}.{ext}`
    Texture(&'static [&'static str]),
}

/// GSModel datasets: tiled archives on disk, per-model entries inside.
const GS_MODEL_DATASETS: &[(u16, &str, &str, EntryShape, &str)] = &[
    (
        300,
        "GSModelGeometry",
        "N62W162_D300_S001_T001_L07_U38_R102.zip",
        EntryShape::Model(&["flt"]),
        "N62W162_D300_S001_T001_L07_U38_R102_AL015_004_Castle.flt",
    ),
    (
        301,
        "GSModelTexture",
        "N62W162_D301_S001_T001_L07_U38_R102.zip",
        EntryShape::Texture(&["rgb"]),
        "N62W162_D301_S001_T001_L07_U38_R102_AcmeFactoryWall.rgb",
    ),
    (
        302,
        "GSModelSignature",
        "N62W162_D302_S001_T001_L07_U38_R102.zip",
        EntryShape::Model(&["flt"]),
        "N62W162_D302_S001_T001_L07_U38_R102_AL015_004_Castle.flt",
    ),
    (
        303,
        "GSModelDescriptor",
        "N62W162_D303_S001_T001_L07_U38_R102.zip",
        EntryShape::Model(&["xml"]),
        "N62W162_D303_S001_T001_L07_U38_R102_AL015_004_Castle.xml",
    ),
    (
        304,
        "GSModelMaterial",
        "N62W162_D304_S001_T001_L07_U38_R102.zip",
        EntryShape::Texture(&["tif"]),
        "N62W162_D304_S001_T001_L07_U38_R102_AcmeFactoryWall.tif",
    ),
    (
        305,
        "GSModelInteriorGeometry",
        "N62W162_D305_S001_T001_L07_U38_R102.zip",
        EntryShape::Model(&["flt"]),
        "N62W162_D305_S001_T001_L07_U38_R102_AL015_004_Castle.flt",
    ),
    (
        306,
        "GSModelInteriorTexture",
        "N62W162_D306_S001_T001_L07_U38_R102.zip",
        EntryShape::Texture(&["rgb"]),
        "N62W162_D306_S001_T001_L07_U38_R102_AcmeFactoryWall.rgb",
    ),
    (
        307,
        "GSModelInteriorDescriptor",
        "N62W162_D307_S001_T001_L07_U38_R102.zip",
        EntryShape::Model(&["xml"]),
        "N62W162_D307_S001_T001_L07_U38_R102_AL015_004_Castle.xml",
    ),
    (
        308,
        "GSModelInteriorMaterial",
        "N62W162_D308_S001_T001_L07_U38_R102.zip",
        EntryShape::Texture(&["tif"]),
        "N62W162_D308_S001_T001_L07_U38_R102_AcmeFactoryWall.tif",
    ),
    (
        309,
        "GSModelCMT",
        "N62W162_D309_S001_T001_L07_U38_R102.zip",
        EntryShape::Texture(&["xml"]),
        "N62W162_D309_S001_T001_L07_U38_R102_AcmeFactoryWall.xml",
    ),
];

/// GTModel datasets named by feature code and model name.
/// (code, name, has LOD, extensions, example)
const GT_MODEL_DATASETS: &[(u16, &str, bool, &[&str], &str)] = &[
    (500, "GTModelGeometry", false, &["flt"], "D500_S001_T001_AL015_004_Castle.flt"),
    (503, "GTModelDescriptor", false, &["xml"], "D503_S001_T001_AL015_004_Castle.xml"),
    (506, "GTModelInteriorGeometry", true, &["flt"], "D506_S001_T001_L03_AL015_004_Castle.flt"),
    (508, "GTModelInteriorDescriptor", false, &["xml"], "D508_S001_T001_AL015_004_Castle.xml"),
    (510, "GTModelGeometry", true, &["flt"], "D510_S001_T001_L10_AL015_004_Castle.flt"),
    (512, "GTModelSignature", true, &["flt"], "D512_S001_T001_L10_AL015_004_Castle.flt"),
];

/// GTModel datasets named by texture name.
/// (code, name, has LOD, extensions, example)
const GT_TEXTURE_DATASETS: &[(u16, &str, bool, &[&str], &str)] = &[
    (504, "GTModelMaterial", true, &["tif"], "D504_S001_T001_L10_AC_1.tif"),
    (505, "GTModelCMT", false, &["xml"], "D505_S001_T001_AC1.xml"),
    (507, "GTModelInteriorTexture", true, &["rgb"], "D507_S001_T001_L10_AC_1.rgb"),
    (509, "GTModelInteriorMaterial", true, &["tif"], "D509_S001_T001_L10_AC_1.tif"),
    (511, "GTModelTexture", true, &["rgb"], "D511_S001_T001_L10_AC_1.rgb"),
];

pub(super) fn build() -> GrammarRegistry {
    let mut registry = GrammarRegistry::new();

    for &(code, name, archive_example, shape, entry_example) in GS_MODEL_DATASETS {
        registry.register(
            GrammarBuilder::new(code, name, format!(r"^{}\.(?<ext>.+)$", TILE_PREFIX))
                .example(archive_example)
                .separators(Separators::Exactly(TILE_SEPARATORS))
                .fields(TILE_FIELDS)
                .fields(EXT_FIELD)
                .extensions(ExtensionKind::Archive, &["zip"])
                .build(),
        );
        registry.register_entry(gs_model_entry(code, name, shape, entry_example));
    }

    for &(code, name, has_lod, extensions, example) in GT_MODEL_DATASETS {
        let (lod, lod_fields, separators): (&str, &[FieldSpec], usize) = if has_lod {
            (r"_(?<lod>LC|L\d{2})", LOD_FIELD, 6)
        } else {
            ("", &[], 5)
        };
        let pattern = format!(
            r"^D{:03}_S(?<cs1>\d+)_T(?<cs2>\d+){}_(?<featureCode>.{{5}})_(?<fsc>\d+)_(?<modl>[^.]+)\.(?<ext>.+)$",
            code, lod
        );
        registry.register(
            GrammarBuilder::new(code, name, pattern)
                .example(example)
                .separators(Separators::Exactly(separators))
                .fields(SELECTOR_FIELDS)
                .fields(lod_fields)
                .fields(MODEL_FIELDS)
                .fields(EXT_FIELD)
                .extensions(ExtensionKind::Payload, extensions)
                .build(),
        );
    }

    for &(code, name, has_lod, extensions, example) in GT_TEXTURE_DATASETS {
        let (lod, lod_fields, separators): (&str, &[FieldSpec], usize) = if has_lod {
            (r"_(?<lod>LC|L\d{2})", LOD_FIELD, 4)
        } else {
            ("", &[], 3)
        };
        let pattern = format!(
            r"^D{:03}_S(?<cs1>\d+)_T(?<cs2>\d+){}_(?<tnam>[^.]+)\.(?<ext>.+)$",
            code, lod
        );
        registry.register(
            GrammarBuilder::new(code, name, pattern)
                .example(example)
                .separators(Separators::AtLeast(separators))
                .fields(SELECTOR_FIELDS)
                .fields(lod_fields)
                .fields(TEXTURE_FIELDS)
                .fields(EXT_FIELD)
                .extensions(ExtensionKind::Payload, extensions)
                .build(),
        );
    }

    for &(code, name, example) in NAVIGATION_DATASETS {
        registry.register(
            GrammarBuilder::new(
                code,
                name,
                format!(r"^D{:03}_S(?<cs1>\d+)_T(?<cs2>\d+)\.(?<ext>.+)$", code),
            )
            .example(example)
            .separators(Separators::Exactly(2))
            .fields(SELECTOR_FIELDS)
            .fields(EXT_FIELD)
            .extensions(ExtensionKind::Payload, &["dbf"])
            .build(),
        );
    }

    register_moving_models(&mut registry);
    registry
}

/// Navigation library tables. (code, name, example)
const NAVIGATION_DATASETS: &[(u16, &str, &str)] = &[
    (400, "NavData", "D400_S001_T001.dbf"),
    (401, "Navigation", "D401_S001_T001.dbf"),
];

fn gs_model_entry(
    code: u16,
    name: &'static str,
    shape: EntryShape,
    example: &'static str,
) -> super::FilenameGrammar {
    let builder = match shape {
        EntryShape::Model(extensions) => GrammarBuilder::new(
            code,
            name,
            format!(
                r"^{}_(?<featureCode>.{{5}})_(?<fsc>[0-9]+)_(?<modl>[^.]+)\.(?<ext>.+)$",
                TILE_PREFIX
            ),
        )
        .separators(Separators::Exactly(TILE_SEPARATORS + 3))
        .fields(TILE_FIELDS)
        .fields(MODEL_FIELDS)
        .extensions(ExtensionKind::Payload, extensions),
        EntryShape::Texture(extensions) => GrammarBuilder::new(
            code,
            name,
            format!(r"^{}_(?<tnam>[^.]+)\.(?<ext>.+)$", TILE_PREFIX),
        )
        .separators(Separators::AtLeast(TILE_SEPARATORS + 1))
        .fields(TILE_FIELDS)
        .fields(TEXTURE_FIELDS)
        .extensions(ExtensionKind::Payload, extensions),
    };
    builder.fields(EXT_FIELD).example(example).build()
}

/// MModel datasets named by DIS entity code. (code, name, extensions, example)
const MMODEL_GEOMETRY_DATASETS: &[(u16, &str, &[&str], &str)] = &[
    (600, "MModelGeometry", &["flt"], "D600_S001_T001_1_1_225_1_1_8_0.flt"),
    (603, "MModelDescriptor", &["xml"], "D603_S001_T001_1_1_225_1_1_8_0.xml"),
];

/// MModel datasets named by texture name. (code, name, extensions, example)
const MMODEL_TEXTURE_DATASETS: &[(u16, &str, &[&str], &str)] = &[
    (601, "MModelTexture", &["rgb"], "D601_S001_T001_W10_M1A2_SEP.rgb"),
    (604, "MModelMaterial", &["tif"], "D604_S001_T001_M1A2_SEP.tif"),
    (605, "MModelCMT", &["xml"], "D605_S001_T001_M1A2.xml"),
];

/// MModel datasets: DIS-style model codes and textures.
fn register_moving_models(registry: &mut GrammarRegistry) {
    const MMDC: &str = r"(?<mmdc>(?<kind>\d+)_(?<domain>\d+)_(?<country>\d+)_(?<category>\d+)_(\d+)_(\d+)_(\d+))";

    for &(code, name, ext, example) in MMODEL_GEOMETRY_DATASETS {
        registry.register(
            GrammarBuilder::new(
                code,
                name,
                format!(r"^D{:03}_S(?<cs1>\d+)_T(?<cs2>\d+)_{}\.(?<ext>.+)$", code, MMDC),
            )
            .example(example)
            .separators(Separators::Exactly(9))
            .fields(SELECTOR_FIELDS)
            .fields(EXT_FIELD)
            .extensions(ExtensionKind::Payload, ext)
            .build(),
        );
    }

    registry.register(
        GrammarBuilder::new(
            606,
            "MModelSignature",
            format!(
                r"^D606_S(?<cs1>\d+)_T(?<cs2>\d+)_(?<lod>LC|L\d{{2}})_{}\.(?<ext>.+)$",
                MMDC
            ),
        )
        .example("D606_S001_T001_LC_0_0_0_0_0_0_0.shp")
        .separators(Separators::Exactly(10))
        .fields(SELECTOR_FIELDS)
        .fields(LOD_FIELD)
        .fields(EXT_FIELD)
        .extensions(ExtensionKind::Payload, &["shp"])
        .build(),
    );

    for &(code, name, ext, example) in MMODEL_TEXTURE_DATASETS {
        registry.register(
            GrammarBuilder::new(
                code,
                name,
                format!(
                    r"^D{:03}_S(?<cs1>\d+)_T(?<cs2>\d+)(_W(?<tsc>\d{{2}}))?_(?<tnam>[^.]+)\.(?<ext>.+)$",
                    code
                ),
            )
            .example(example)
            .separators(Separators::AtLeast(3))
            .fields(SELECTOR_FIELDS)
            .fields(TEXTURE_FIELDS)
            .fields(EXT_FIELD)
            .extensions(ExtensionKind::Payload, ext)
            .build(),
        );
    }
}
