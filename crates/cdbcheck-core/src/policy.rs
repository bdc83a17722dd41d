//! Reference policy: which dataset codes exist and which component selectors
//! each dataset accepts.
//!
//! The policy is an explicitly constructed, read-only value handed to the
//! engine. A dataset or selector the policy knows nothing about is invalid;
//! absence of data never means "skip".

use crate::error::PolicyError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Highest value a three-digit code or selector can hold.
const MAX_THREE_DIGIT: u32 = 999;

/// Dataset table shipped with the tool: code and directory name.
const BUILTIN_DATASETS: &[(u16, &str)] = &[
    (1, "Elevation"),
    (2, "MinMaxElevation"),
    (3, "MaxCulture"),
    (4, "Imagery"),
    (5, "RMTexture"),
    (6, "RMDescriptor"),
    (100, "GSFeature"),
    (101, "GTFeature"),
    (102, "GeoPolitical"),
    (201, "RoadNetwork"),
    (202, "RailRoadNetwork"),
    (203, "PowerLineNetwork"),
    (204, "HydrographyNetwork"),
    (300, "GSModelGeometry"),
    (301, "GSModelTexture"),
    (302, "GSModelSignature"),
    (303, "GSModelDescriptor"),
    (304, "GSModelMaterial"),
    (305, "GSModelInteriorGeometry"),
    (306, "GSModelInteriorTexture"),
    (307, "GSModelInteriorDescriptor"),
    (308, "GSModelInteriorMaterial"),
    (309, "GSModelCMT"),
    (310, "T2DModelGeometry"),
    (400, "NavData"),
    (401, "Navigation"),
    (500, "GTModelGeometry"),
    (503, "GTModelDescriptor"),
    (504, "GTModelMaterial"),
    (505, "GTModelCMT"),
    (506, "GTModelInteriorGeometry"),
    (507, "GTModelInteriorTexture"),
    (508, "GTModelInteriorDescriptor"),
    (509, "GTModelInteriorMaterial"),
    (510, "GTModelGeometry"),
    (511, "GTModelTexture"),
    (512, "GTModelSignature"),
    (600, "MModelGeometry"),
    (601, "MModelTexture"),
    (603, "MModelDescriptor"),
    (604, "MModelMaterial"),
    (605, "MModelCMT"),
    (606, "MModelSignature"),
];

/// Selector pairs accepted beyond the `001`/`001` default, as (dataset, cs1, cs2).
const BUILTIN_EXTRA_SELECTORS: &[(u16, u16, u16)] = &[
    (1, 1, 2),
    (1, 2, 1),
    (1, 2, 2),
    (4, 1, 2),
    (300, 1, 2),
    (301, 1, 2),
    (306, 1, 2),
    (510, 1, 2),
    (511, 1, 2),
];

/// Accepted component selectors for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPolicy {
    pub name: String,
    selectors: BTreeMap<u16, BTreeSet<u16>>,
}

impl DatasetPolicy {
    /// Creates a dataset entry with no accepted selectors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selectors: BTreeMap::new(),
        }
    }

    /// Accepts the (cs1, cs2) pair.
    pub fn allow(&mut self, cs1: u16, cs2: u16) {
        self.selectors.entry(cs1).or_default().insert(cs2);
    }

    /// Accepted CS1 values in ascending order.
    pub fn cs1_values(&self) -> impl Iterator<Item = u16> + '_ {
        self.selectors.keys().copied()
    }
}

/// Read-only lookup table of dataset codes and component selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencePolicy {
    datasets: BTreeMap<u16, DatasetPolicy>,
}

impl ReferencePolicy {
    /// Creates an empty policy. Every code is invalid until datasets are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// The CDB 1.0 dataset table shipped with the tool.
    ///
    /// Every dataset accepts CS1 `001` with CS2 `001`; a handful accept
    /// additional pairs. Use [`ReferencePolicy::from_file`] to supply the full
    /// reference tables of a particular CDB profile.
    pub fn builtin() -> Self {
        let mut policy = Self::new();
        for &(code, name) in BUILTIN_DATASETS {
            let mut dataset = DatasetPolicy::new(name);
            dataset.allow(1, 1);
            policy.datasets.insert(code, dataset);
        }
        for &(code, cs1, cs2) in BUILTIN_EXTRA_SELECTORS {
            if let Some(dataset) = policy.datasets.get_mut(&code) {
                dataset.allow(cs1, cs2);
            }
        }
        policy
    }

    /// Loads a policy from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parses a policy from a JSON document.
    ///
    /// ```
    /// use cdbcheck_core::ReferencePolicy;
    ///
    /// let policy = ReferencePolicy::from_json_str(
    ///     r#"{"datasets":[{"code":306,"name":"GSModelInteriorTexture","selectors":[{"cs1":1,"cs2":[1,2]}]}]}"#,
    /// ).unwrap();
    /// assert!(policy.is_valid_cs2(306, 1, 2));
    /// ```
    pub fn from_json_str(content: &str) -> Result<Self, PolicyError> {
        let document: PolicyDocument = serde_json::from_str(content)?;
        let mut policy = Self::new();

        for dataset in document.datasets {
            let code = three_digit("dataset code", dataset.code)?;
            if policy.datasets.contains_key(&code) {
                return Err(PolicyError::DuplicateDataset(code));
            }
            let mut entry = DatasetPolicy::new(dataset.name);
            for selector in dataset.selectors {
                let cs1 = three_digit("cs1", selector.cs1)?;
                for cs2 in selector.cs2 {
                    entry.allow(cs1, three_digit("cs2", cs2)?);
                }
            }
            policy.datasets.insert(code, entry);
        }

        Ok(policy)
    }

    /// Inserts or replaces a dataset entry.
    pub fn insert(&mut self, code: u16, dataset: DatasetPolicy) {
        self.datasets.insert(code, dataset);
    }

    /// True if the dataset code is known.
    pub fn is_valid_code(&self, code: u16) -> bool {
        self.datasets.contains_key(&code)
    }

    /// Name of a known dataset.
    pub fn dataset_name(&self, code: u16) -> Option<&str> {
        self.datasets.get(&code).map(|d| d.name.as_str())
    }

    /// True if `cs1` is accepted for the dataset.
    pub fn is_valid_cs1(&self, code: u16, cs1: u16) -> bool {
        self.datasets
            .get(&code)
            .is_some_and(|d| d.selectors.contains_key(&cs1))
    }

    /// True if `cs2` is accepted for the (dataset, cs1) pair.
    pub fn is_valid_cs2(&self, code: u16, cs1: u16, cs2: u16) -> bool {
        self.datasets
            .get(&code)
            .and_then(|d| d.selectors.get(&cs1))
            .is_some_and(|set| set.contains(&cs2))
    }

    /// Known datasets in ascending code order.
    pub fn datasets(&self) -> impl Iterator<Item = (u16, &DatasetPolicy)> {
        self.datasets.iter().map(|(code, d)| (*code, d))
    }
}

fn three_digit(field: &'static str, value: u32) -> Result<u16, PolicyError> {
    if value > MAX_THREE_DIGIT {
        return Err(PolicyError::OutOfRange { field, value });
    }
    Ok(value as u16)
}

/// On-disk policy document.
#[derive(Debug, Clone, Deserialize)]
struct PolicyDocument {
    datasets: Vec<DatasetDocument>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetDocument {
    code: u32,
    name: String,
    #[serde(default)]
    selectors: Vec<SelectorDocument>,
}

#[derive(Debug, Clone, Deserialize)]
struct SelectorDocument {
    cs1: u32,
    cs2: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_knows_model_datasets() {
        let policy = ReferencePolicy::builtin();
        assert!(policy.is_valid_code(306));
        assert!(policy.is_valid_code(500));
        assert!(!policy.is_valid_code(0));
        assert_eq!(policy.dataset_name(306), Some("GSModelInteriorTexture"));
    }

    #[test]
    fn test_builtin_selectors() {
        let policy = ReferencePolicy::builtin();
        assert!(policy.is_valid_cs1(306, 1));
        assert!(!policy.is_valid_cs1(306, 0));
        assert!(policy.is_valid_cs2(306, 1, 1));
        assert!(policy.is_valid_cs2(306, 1, 2));
        assert!(!policy.is_valid_cs2(306, 1, 0));
        assert!(!policy.is_valid_cs2(306, 0, 1));
    }

    #[test]
    fn test_unknown_dataset_is_invalid_not_skipped() {
        let policy = ReferencePolicy::new();
        assert!(!policy.is_valid_code(306));
        assert!(!policy.is_valid_cs1(306, 1));
        assert!(!policy.is_valid_cs2(306, 1, 1));
    }

    #[test]
    fn test_from_json() {
        let policy = ReferencePolicy::from_json_str(
            r#"{"datasets":[
                {"code":300,"name":"GSModelGeometry","selectors":[{"cs1":1,"cs2":[1]},{"cs1":2,"cs2":[1,3]}]},
                {"code":4,"name":"Imagery"}
            ]}"#,
        )
        .unwrap();

        assert!(policy.is_valid_cs2(300, 2, 3));
        assert!(!policy.is_valid_cs2(300, 2, 2));
        assert!(policy.is_valid_code(4));
        assert!(!policy.is_valid_cs1(4, 1));
        assert_eq!(policy.datasets().count(), 2);
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let err = ReferencePolicy::from_json_str(
            r#"{"datasets":[{"code":300,"name":"A"},{"code":300,"name":"B"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::DuplicateDataset(300)));
    }

    #[test]
    fn test_from_json_rejects_wide_values() {
        let err = ReferencePolicy::from_json_str(
            r#"{"datasets":[{"code":300,"name":"A","selectors":[{"cs1":1000,"cs2":[1]}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::OutOfRange { field: "cs1", .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ReferencePolicy::from_file(Path::new("/nonexistent/policy.json")).unwrap_err();
        assert!(matches!(err, PolicyError::Io { .. }));
    }
}
