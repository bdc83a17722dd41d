//! Grammar registry: the filename pattern of every dataset, keyed by dataset code.
//!
//! Grammars are data. Each one is a pattern with named capture groups plus a
//! declared list of fields and the rule each field obeys; the generic
//! validators in [`crate::fields`] do the rest.

mod table;

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// A semantic field encoded in a file or entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Latitude,
    Longitude,
    DatasetCode,
    Cs1,
    Cs2,
    Lod,
    Uref,
    Rref,
    FeatureCode,
    FeatureSubCode,
    ModelName,
    TextureName,
    TextureSubCode,
    Ext,
}

impl FieldName {
    /// Capture group name used in grammar patterns.
    pub fn group(&self) -> &'static str {
        match self {
            FieldName::Latitude => "lat",
            FieldName::Longitude => "lon",
            FieldName::DatasetCode => "datasetCode",
            FieldName::Cs1 => "cs1",
            FieldName::Cs2 => "cs2",
            FieldName::Lod => "lod",
            FieldName::Uref => "uref",
            FieldName::Rref => "rref",
            FieldName::FeatureCode => "featureCode",
            FieldName::FeatureSubCode => "fsc",
            FieldName::ModelName => "modl",
            FieldName::TextureName => "tnam",
            FieldName::TextureSubCode => "tsc",
            FieldName::Ext => "ext",
        }
    }

    /// Label used in violation messages.
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Latitude => "latitude",
            FieldName::Longitude => "longitude",
            FieldName::DatasetCode => "dataset code",
            FieldName::Cs1 => "CS1",
            FieldName::Cs2 => "CS2",
            FieldName::Lod => "LOD",
            FieldName::Uref => "UREF",
            FieldName::Rref => "RREF",
            FieldName::FeatureCode => "Feature Code",
            FieldName::FeatureSubCode => "FSC",
            FieldName::ModelName => "Model name",
            FieldName::TextureName => "Texture name",
            FieldName::TextureSubCode => "TSC",
            FieldName::Ext => "extension",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.group())
    }
}

/// The check applied to one field's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Latitude,
    Longitude,
    /// Numeric code that must be known to the reference policy.
    DatasetCode,
    /// Fixed-width, zero-padded non-negative integer.
    ZeroPadded { width: usize },
    /// Exactly this many characters.
    FixedLength(usize),
    /// At most this many characters.
    MaxLength(usize),
    Lod,
    /// UREF/RREF index bounded by the LOD.
    TileRef,
    /// Exact match against the grammar's extension allow-list.
    Extension,
}

/// A declared field and its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: FieldName,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub const fn new(field: FieldName, rule: FieldRule) -> Self {
        Self { field, rule }
    }
}

/// Expected number of `_` separators, checked before pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separators {
    Exactly(usize),
    /// Free-text fields such as texture names may contain underscores.
    AtLeast(usize),
}

impl Separators {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Separators::Exactly(n) => count == n,
            Separators::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Separators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separators::Exactly(n) => write!(f, "{}", n),
            Separators::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

/// Whether the name belongs to a container or to a payload file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    Archive,
    Payload,
}

/// Compiled filename grammar of one dataset.
#[derive(Debug, Clone)]
pub struct FilenameGrammar {
    /// Dataset code the grammar belongs to.
    pub dataset: u16,
    /// Dataset name, as used in directory names (`306_GSModelInteriorTexture`).
    pub name: &'static str,
    /// A conforming name, used in listings and tests.
    pub example: &'static str,
    pub separators: Separators,
    pub fields: Vec<FieldSpec>,
    pub extensions: &'static [&'static str],
    pub extension_kind: ExtensionKind,
    pattern: Regex,
}

impl FilenameGrammar {
    /// The regular expression source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Directory name of the dataset (`{code}_{name}`).
    pub fn directory(&self) -> String {
        format!("{:03}_{}", self.dataset, self.name)
    }

    /// True if the grammar declares the field.
    pub fn has_field(&self, field: FieldName) -> bool {
        self.fields.iter().any(|spec| spec.field == field)
    }

    /// Matches the whole name, capturing every declared field that is present.
    ///
    /// Returns `None` unless the name fully matches; partial matches are never
    /// accepted.
    pub fn parse(&self, name: &str) -> Option<ParsedFields> {
        let captures = self.pattern.captures(name)?;
        let mut values = BTreeMap::new();
        for spec in &self.fields {
            if let Some(m) = captures.name(spec.field.group()) {
                values.insert(spec.field, m.as_str().to_string());
            }
        }
        Some(ParsedFields { values })
    }

    /// True if the name passes the separator pre-check and the full match.
    /// Field values are not judged.
    pub fn matches(&self, name: &str) -> bool {
        self.separators.accepts(name.matches('_').count()) && self.pattern.is_match(name)
    }
}

/// Raw captured field values of one matched name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    values: BTreeMap<FieldName, String>,
}

impl ParsedFields {
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

static STANDARD_REGISTRY: OnceLock<GrammarRegistry> = OnceLock::new();

/// Read-only table of filename grammars keyed by dataset code.
///
/// Holds two tables: grammars for names found on disk, and grammars for
/// entries inside tiled archives.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    files: BTreeMap<u16, FilenameGrammar>,
    entries: BTreeMap<u16, FilenameGrammar>,
}

impl GrammarRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The CDB grammar table, compiled once per process.
    pub fn standard() -> &'static GrammarRegistry {
        STANDARD_REGISTRY.get_or_init(table::build)
    }

    /// Registers a grammar for names on disk, replacing any previous one.
    pub fn register(&mut self, grammar: FilenameGrammar) {
        self.files.insert(grammar.dataset, grammar);
    }

    /// Registers a grammar for entries inside archives of the dataset.
    pub fn register_entry(&mut self, grammar: FilenameGrammar) {
        self.entries.insert(grammar.dataset, grammar);
    }

    /// Grammar for names of the dataset, if any.
    pub fn grammar_for(&self, dataset: u16) -> Option<&FilenameGrammar> {
        self.files.get(&dataset)
    }

    /// Grammar for archive entries of the dataset, if any.
    pub fn entry_grammar_for(&self, dataset: u16) -> Option<&FilenameGrammar> {
        self.entries.get(&dataset)
    }

    /// File grammars in ascending dataset order.
    pub fn grammars(&self) -> impl Iterator<Item = &FilenameGrammar> {
        self.files.values()
    }

    /// Entry grammars in ascending dataset order.
    pub fn entry_grammars(&self) -> impl Iterator<Item = &FilenameGrammar> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Builder used by the grammar table.
pub(crate) struct GrammarBuilder {
    dataset: u16,
    name: &'static str,
    example: &'static str,
    pattern: String,
    separators: Separators,
    fields: Vec<FieldSpec>,
    extensions: &'static [&'static str],
    extension_kind: ExtensionKind,
}

impl GrammarBuilder {
    pub(crate) fn new(dataset: u16, name: &'static str, pattern: String) -> Self {
        Self {
            dataset,
            name,
            example: "",
            pattern,
            separators: Separators::AtLeast(0),
            fields: Vec::new(),
            extensions: &[],
            extension_kind: ExtensionKind::Payload,
        }
    }

    pub(crate) fn example(mut self, example: &'static str) -> Self {
        self.example = example;
        self
    }

    pub(crate) fn separators(mut self, separators: Separators) -> Self {
        self.separators = separators;
        self
    }

    pub(crate) fn fields(mut self, fields: &[FieldSpec]) -> Self {
        self.fields.extend_from_slice(fields);
        self
    }

    pub(crate) fn extensions(
        mut self,
        kind: ExtensionKind,
        extensions: &'static [&'static str],
    ) -> Self {
        self.extension_kind = kind;
        self.extensions = extensions;
        self
    }

    pub(crate) fn build(self) -> FilenameGrammar {
        FilenameGrammar {
            dataset: self.dataset,
            name: self.name,
            example: self.example,
            separators: self.separators,
            fields: self.fields,
            extensions: self.extensions,
            extension_kind: self.extension_kind,
            pattern: Regex::new(&self.pattern).expect("invalid grammar pattern"),
        }
    }
}
