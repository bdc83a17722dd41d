//! Directory layouts: how deep each dataset's leaves sit and what each level
//! of the tree encodes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Groups of datasets sharing a directory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFamily {
    /// Geospecific models, tiled and packed into archives.
    GsModel,
    /// Geotypical models, organized by feature classification.
    GtModel,
}

impl DatasetFamily {
    pub const ALL: [DatasetFamily; 2] = [DatasetFamily::GsModel, DatasetFamily::GtModel];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetFamily::GsModel => "gsmodel",
            DatasetFamily::GtModel => "gtmodel",
        }
    }
}

impl fmt::Display for DatasetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gsmodel" => Ok(DatasetFamily::GsModel),
            "gtmodel" => Ok(DatasetFamily::GtModel),
            other => Err(format!(
                "unknown dataset family '{}' (expected gsmodel or gtmodel)",
                other
            )),
        }
    }
}

/// What one directory level between the root and the leaves encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// A directory with exactly this name.
    Fixed(&'static str),
    Latitude,
    Longitude,
    Lod,
    Uref,
    Category,
    Subcategory,
    FeatureType,
}

static LATITUDE_DIR: OnceLock<Regex> = OnceLock::new();
static LONGITUDE_DIR: OnceLock<Regex> = OnceLock::new();
static LOD_DIR: OnceLock<Regex> = OnceLock::new();
static UREF_DIR: OnceLock<Regex> = OnceLock::new();

fn dir_pattern(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("invalid directory pattern"))
}

impl NodeRole {
    /// True if a directory with this name can play the role.
    ///
    /// Roles with a name grammar reject directories that do not look like
    /// their values; free-form roles accept any directory.
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            NodeRole::Fixed(expected) => name == *expected,
            NodeRole::Latitude => dir_pattern(&LATITUDE_DIR, r"^[NS][0-9]{2}$").is_match(name),
            NodeRole::Longitude => dir_pattern(&LONGITUDE_DIR, r"^[EW][0-9]{3}$").is_match(name),
            NodeRole::Lod => dir_pattern(&LOD_DIR, r"^(LC|L[0-9]{2})$").is_match(name),
            NodeRole::Uref => dir_pattern(&UREF_DIR, r"^U[0-9]+$").is_match(name),
            NodeRole::Category | NodeRole::Subcategory | NodeRole::FeatureType => true,
        }
    }

    /// Human name of the role, used in directory violations.
    pub fn describe(&self) -> &'static str {
        match self {
            NodeRole::Fixed(name) => *name,
            NodeRole::Latitude => "latitude",
            NodeRole::Longitude => "longitude",
            NodeRole::Lod => "LOD",
            NodeRole::Uref => "UREF",
            NodeRole::Category => "category",
            NodeRole::Subcategory => "subcategory",
            NodeRole::FeatureType => "feature type",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeRole::Fixed(name) => *name,
            NodeRole::Latitude => "{lat}",
            NodeRole::Longitude => "{lon}",
            NodeRole::Lod => "{lod}",
            NodeRole::Uref => "{uref}",
            NodeRole::Category => "{category}",
            NodeRole::Subcategory => "{subcategory}",
            NodeRole::FeatureType => "{featureType}",
        }
    }
}

/// What the files at the bottom of a layout are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    /// Archives whose name and entries are both checked.
    Archive,
    /// Plain files; only the name is checked.
    File,
}

/// Where the leaves of one dataset sit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub dataset: u16,
    /// Dataset directory name, such as `306_GSModelInteriorTexture`.
    pub directory: String,
    pub family: DatasetFamily,
    /// Directory levels from the root down to the leaf directory.
    pub levels: Vec<NodeRole>,
    pub leaf: LeafKind,
}

impl DatasetLayout {
    /// Layout pattern such as `Tiles/{lat}/{lon}/306_GSModelInteriorTexture/{lod}/{uref}`.
    pub fn pattern(&self) -> String {
        self.levels
            .iter()
            .map(NodeRole::label)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// (code, directory) of the tiled GSModel datasets.
const GS_MODEL_LAYOUTS: &[(u16, &str)] = &[
    (300, "300_GSModelGeometry"),
    (301, "301_GSModelTexture"),
    (302, "302_GSModelSignature"),
    (303, "303_GSModelDescriptor"),
    (304, "304_GSModelMaterial"),
    (305, "305_GSModelInteriorGeometry"),
    (306, "306_GSModelInteriorTexture"),
    (307, "307_GSModelInteriorDescriptor"),
    (308, "308_GSModelInteriorMaterial"),
    (309, "309_GSModelCMT"),
];

/// (code, directory, LOD level below the feature type) of the GTModel datasets.
const GT_MODEL_LAYOUTS: &[(u16, &str, bool)] = &[
    (500, "500_GTModelGeometry", false),
    (503, "503_GTModelDescriptor", false),
    (506, "506_GTModelInteriorGeometry", true),
    (508, "508_GTModelInteriorDescriptor", false),
    (510, "510_GTModelGeometry", true),
    (512, "512_GTModelSignature", true),
];

/// The layouts checked by a full scan, in dataset order.
pub fn standard_layouts() -> Vec<DatasetLayout> {
    let mut layouts = Vec::new();

    for &(dataset, directory) in GS_MODEL_LAYOUTS {
        layouts.push(DatasetLayout {
            dataset,
            directory: directory.to_string(),
            family: DatasetFamily::GsModel,
            levels: vec![
                NodeRole::Fixed("Tiles"),
                NodeRole::Latitude,
                NodeRole::Longitude,
                NodeRole::Fixed(directory),
                NodeRole::Lod,
                NodeRole::Uref,
            ],
            leaf: LeafKind::Archive,
        });
    }

    for &(dataset, directory, has_lod) in GT_MODEL_LAYOUTS {
        let mut levels = vec![
            NodeRole::Fixed("GTModel"),
            NodeRole::Fixed(directory),
            NodeRole::Category,
            NodeRole::Subcategory,
            NodeRole::FeatureType,
        ];
        if has_lod {
            levels.push(NodeRole::Lod);
        }
        layouts.push(DatasetLayout {
            dataset,
            directory: directory.to_string(),
            family: DatasetFamily::GtModel,
            levels,
            leaf: LeafKind::File,
        });
    }

    layouts
}
