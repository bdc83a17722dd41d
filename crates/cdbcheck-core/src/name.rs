//! Name validation pipeline: separator pre-check, full match, per-field
//! validators, then cross-field checks.

use crate::fields::{self, FieldContext};
use crate::grammar::{FieldName, FilenameGrammar, ParsedFields};
use crate::policy::ReferencePolicy;
use crate::report::{Violation, ViolationKind};

/// Directory values captured by the walker on the way down to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathContext {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub lod: Option<String>,
    /// The UREF directory name, including its `U` prefix.
    pub uref: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub feature_type: Option<String>,
}

/// Where a name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope<'a> {
    /// A file on disk.
    File,
    /// An entry inside the archive whose name without extension is
    /// `archive_stem`. With no stem the entry is not tied to its archive.
    Entry { archive_stem: Option<&'a str> },
}

/// Context a name is validated in.
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    pub path: Option<&'a PathContext>,
    pub scope: NameScope<'a>,
}

impl<'a> NameContext<'a> {
    /// A file name with no directory context.
    pub fn file() -> Self {
        Self {
            path: None,
            scope: NameScope::File,
        }
    }

    /// An entry of the archive named `archive_stem`.
    pub fn entry(archive_stem: &'a str) -> Self {
        Self {
            path: None,
            scope: NameScope::Entry {
                archive_stem: Some(archive_stem),
            },
        }
    }

    /// An archive entry checked on its own, without the archive prefix rule.
    pub fn any_entry() -> Self {
        Self {
            path: None,
            scope: NameScope::Entry { archive_stem: None },
        }
    }

    /// Adds the directory values the name must agree with.
    pub fn with_path(mut self, path: &'a PathContext) -> Self {
        self.path = Some(path);
        self
    }
}

/// Validates one name against a grammar.
///
/// A name that fails the separator count or does not match the pattern gets a
/// single format violation. A matched name runs every field validator and
/// every applicable cross-field check, so all of its defects are reported at
/// once.
///
/// ```
/// use cdbcheck_core::{validate_name, GrammarRegistry, NameContext, ReferencePolicy};
///
/// let grammar = GrammarRegistry::standard().grammar_for(306).unwrap();
/// let policy = ReferencePolicy::builtin();
/// let violations = validate_name("N99W162_D306_S001_T001_L07_U38_R102.zip", grammar, &policy, &NameContext::file());
/// assert_eq!(violations[0].message, "Invalid latitude (N99)");
/// ```
pub fn validate_name(
    name: &str,
    grammar: &FilenameGrammar,
    policy: &ReferencePolicy,
    ctx: &NameContext<'_>,
) -> Vec<Violation> {
    let separators = name.matches('_').count();
    if !grammar.separators.accepts(separators) {
        let detail = format!(
            "expected {} underscore separators, found {}",
            grammar.separators, separators
        );
        return vec![mismatch(name, ctx.scope, Some(&detail))];
    }

    let Some(parsed) = grammar.parse(name) else {
        return vec![mismatch(name, ctx.scope, None)];
    };

    let field_ctx = FieldContext {
        grammar,
        policy,
        fields: &parsed,
    };
    let mut violations = Vec::new();
    for spec in &grammar.fields {
        if let Some(raw) = parsed.get(spec.field) {
            violations.extend(fields::validate_field(spec, raw, &field_ctx));
        }
    }

    if grammar.has_field(FieldName::Cs1) {
        violations.extend(fields::check_component_selectors(
            parsed.get(FieldName::Cs1),
            parsed.get(FieldName::Cs2),
            grammar.dataset,
            policy,
        ));
    }

    if let Some(path) = ctx.path {
        violations.extend(check_against_path(&parsed, path));
    }

    match ctx.scope {
        NameScope::File => violations,
        NameScope::Entry { archive_stem } => {
            let foreign = archive_stem.filter(|stem| !belongs_to_archive(name, stem));
            if let Some(archive_stem) = foreign {
                violations.push(Violation::new(
                    ViolationKind::ArchiveEntry,
                    format!(
                        "Entry '{}' does not belong to archive '{}'",
                        name, archive_stem
                    ),
                ));
            }
            violations.into_iter().map(|v| v.in_entry(name)).collect()
        }
    }
}

/// An entry belongs to the archive when it starts with the archive's full
/// tile prefix followed by a separator.
fn belongs_to_archive(entry: &str, archive_stem: &str) -> bool {
    entry
        .strip_prefix(archive_stem)
        .is_some_and(|rest| rest.starts_with('_'))
}

fn mismatch(name: &str, scope: NameScope<'_>, detail: Option<&str>) -> Violation {
    let (kind, subject) = match scope {
        NameScope::File => (ViolationKind::Format, format!("Invalid file name: {}", name)),
        NameScope::Entry { .. } => (
            ViolationKind::ArchiveEntry,
            format!("Invalid entry '{}' in ZIP archive", name),
        ),
    };
    let message = match detail {
        Some(detail) => format!("{} ({})", subject, detail),
        None => subject,
    };
    let violation = Violation::new(kind, message);
    match scope {
        NameScope::File => violation,
        NameScope::Entry { .. } => violation.in_entry(name),
    }
}

/// Fields that repeat a directory value must agree with it.
fn check_against_path(parsed: &ParsedFields, path: &PathContext) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut compare = |value: Option<&str>, dir: Option<&str>, what: &str, dir_label: &str| {
        if let (Some(value), Some(dir)) = (value, dir) {
            if value != dir {
                violations.push(Violation::new(
                    ViolationKind::CrossField,
                    format!(
                        "{} {} does not match {} directory {}",
                        what, value, dir_label, dir
                    ),
                ));
            }
        }
    };

    compare(
        parsed.get(FieldName::Latitude),
        path.latitude.as_deref(),
        "Latitude",
        "tile",
    );
    compare(
        parsed.get(FieldName::Longitude),
        path.longitude.as_deref(),
        "Longitude",
        "tile",
    );
    compare(
        parsed.get(FieldName::Lod),
        path.lod.as_deref(),
        "LOD",
        "LOD",
    );

    let uref = parsed.get(FieldName::Uref).map(|raw| format!("U{}", raw));
    compare(uref.as_deref(), path.uref.as_deref(), "UREF", "UREF");

    if let Some(code) = parsed.get(FieldName::FeatureCode) {
        violations.extend(check_feature_code(code, path));
    }

    violations
}

/// A feature code such as `AL015` is spelled out by the directories above
/// the model: category `A_*`, subcategory `L_*` and feature type `015_*`.
fn check_feature_code(code: &str, path: &PathContext) -> Vec<Violation> {
    let chars: Vec<char> = code.chars().collect();
    // Wrong-length codes are reported by the field validator.
    if chars.len() != 5 {
        return Vec::new();
    }
    let category = chars[0].to_string();
    let subcategory = chars[1].to_string();
    let feature_type: String = chars[2..].iter().collect();

    let expected = [
        (category, path.category.as_deref(), "category"),
        (subcategory, path.subcategory.as_deref(), "subcategory"),
        (feature_type, path.feature_type.as_deref(), "feature type"),
    ];

    let mut violations = Vec::new();
    for (part, dir, label) in expected {
        let Some(dir) = dir else { continue };
        let prefix = dir.split('_').next().unwrap_or(dir);
        if prefix != part {
            violations.push(Violation::new(
                ViolationKind::CrossField,
                format!(
                    "Feature code {} does not match {} directory {}",
                    code, label, dir
                ),
            ));
        }
    }
    violations
}
