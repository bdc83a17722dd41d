//! Field validators.
//!
//! Each validator looks at one field's raw text, plus whatever context the
//! field depends on, and returns zero or more violations. Validators never
//! fail: malformed input is itself a violation.

use crate::grammar::{ExtensionKind, FieldName, FieldRule, FieldSpec, FilenameGrammar, ParsedFields};
use crate::policy::ReferencePolicy;
use crate::report::{Violation, ViolationKind};
use crate::tile::{Latitude, Longitude, Lod};

/// Everything a field validator may consult besides the field itself.
#[derive(Debug, Clone, Copy)]
pub struct FieldContext<'a> {
    pub grammar: &'a FilenameGrammar,
    pub policy: &'a ReferencePolicy,
    pub fields: &'a ParsedFields,
}

/// Runs the rule declared for one field.
pub fn validate_field(spec: &FieldSpec, raw: &str, ctx: &FieldContext<'_>) -> Vec<Violation> {
    let label = spec.field.label();
    match spec.rule {
        FieldRule::Latitude => check_latitude(raw).into_iter().collect(),
        FieldRule::Longitude => check_longitude(raw).into_iter().collect(),
        FieldRule::DatasetCode => check_dataset_code(raw, ctx.grammar.dataset, ctx.policy),
        FieldRule::ZeroPadded { width } => check_zero_padded(raw, width, label),
        FieldRule::FixedLength(n) => check_fixed_length(raw, n, label).into_iter().collect(),
        FieldRule::MaxLength(n) => check_max_length(raw, n, label).into_iter().collect(),
        FieldRule::Lod => check_lod(raw).into_iter().collect(),
        FieldRule::TileRef => check_tile_ref(spec.field, raw, ctx.fields.get(FieldName::Lod))
            .into_iter()
            .collect(),
        FieldRule::Extension => {
            check_extension(raw, ctx.grammar.extensions, ctx.grammar.extension_kind)
                .into_iter()
                .collect()
        }
    }
}

pub fn check_latitude(raw: &str) -> Option<Violation> {
    match Latitude::parse(raw) {
        Some(_) => None,
        None => Some(Violation::new(
            ViolationKind::Field,
            format!("Invalid latitude ({})", raw),
        )),
    }
}

pub fn check_longitude(raw: &str) -> Option<Violation> {
    match Longitude::parse(raw) {
        Some(_) => None,
        None => Some(Violation::new(
            ViolationKind::Field,
            format!("Invalid longitude ({})", raw),
        )),
    }
}

/// The code must be known to the policy and must be the dataset the grammar
/// was selected for.
pub fn check_dataset_code(raw: &str, expected: u16, policy: &ReferencePolicy) -> Vec<Violation> {
    let code = match parse_ascii_number(raw) {
        Some(code) if code <= u64::from(u16::MAX) => code as u16,
        _ => {
            return vec![Violation::new(
                ViolationKind::Field,
                format!("Invalid code {}", raw),
            )]
        }
    };

    if !policy.is_valid_code(code) {
        return vec![Violation::new(
            ViolationKind::Field,
            format!("Invalid code {}", raw),
        )];
    }

    if code != expected {
        return vec![Violation::new(
            ViolationKind::CrossField,
            format!("Dataset code {} does not match dataset {:03}", raw, expected),
        )];
    }

    Vec::new()
}

/// Checks a fixed-width, zero-padded non-negative integer.
///
/// Malformed text (empty or non-digit) is reported on its own and stops
/// further checks. Otherwise a wrong width, missing padding and a value too
/// large for the width are each reported.
///
/// ```
/// use cdbcheck_core::fields::check_zero_padded;
///
/// assert!(check_zero_padded("007", 3, "CS1").is_empty());
/// assert_eq!(check_zero_padded("07", 3, "CS1").len(), 2);
/// ```
pub fn check_zero_padded(raw: &str, width: usize, label: &str) -> Vec<Violation> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return vec![Violation::new(
            ViolationKind::Field,
            format!("Invalid {} number format ({})", label, raw),
        )];
    }

    let mut violations = Vec::new();
    if raw.len() != width {
        violations.push(Violation::new(
            ViolationKind::Field,
            format!("{} should be {} characters ({})", label, width, raw),
        ));
    }

    if raw.len() < width {
        let padded = format!("{:0>width$}", raw, width = width);
        violations.push(Violation::new(
            ViolationKind::Field,
            format!("Invalid padding on {} ({}, expected {})", label, raw, padded),
        ));
    }

    let significant = raw.trim_start_matches('0');
    if significant.len() > width {
        violations.push(Violation::new(
            ViolationKind::Field,
            format!(
                "{} out of range ({}, maximum {})",
                label,
                raw,
                "9".repeat(width)
            ),
        ));
    }

    violations
}

pub fn check_fixed_length(raw: &str, length: usize, label: &str) -> Option<Violation> {
    (raw.chars().count() != length).then(|| {
        Violation::new(
            ViolationKind::Field,
            format!("{} should be {} characters ({})", label, length, raw),
        )
    })
}

pub fn check_max_length(raw: &str, max: usize, label: &str) -> Option<Violation> {
    let length = raw.chars().count();
    (length > max).then(|| {
        Violation::new(
            ViolationKind::Field,
            format!(
                "{} should not exceed {} characters ({} has {})",
                label, max, raw, length
            ),
        )
    })
}

/// `LC`, or `L` plus two digits naming a level the tile hierarchy defines.
pub fn check_lod(raw: &str) -> Option<Violation> {
    match Lod::parse(raw) {
        Some(_) => None,
        None => Some(Violation::new(
            ViolationKind::Field,
            format!("Invalid LOD name: {}", raw),
        )),
    }
}

/// Checks a UREF or RREF index against the bound its LOD implies.
///
/// Skipped when the LOD is missing or invalid; that defect is reported by
/// [`check_lod`] and a bound cannot be derived from it.
pub fn check_tile_ref(field: FieldName, raw: &str, lod: Option<&str>) -> Option<Violation> {
    let lod = lod.and_then(Lod::parse)?;
    let in_range = parse_ascii_number(raw).is_some_and(|index| lod.contains_ref(index));
    if in_range {
        return None;
    }

    let message = match field {
        FieldName::Rref => format!(
            "RREF out of bounds for LOD: {} (valid range 0-{} for {})",
            raw,
            lod.max_ref(),
            lod
        ),
        _ => format!(
            "{} value out of bounds: {} (valid range 0-{} for {})",
            field.label(),
            raw,
            lod.max_ref(),
            lod
        ),
    };
    Some(Violation::new(ViolationKind::CrossField, message))
}

/// Exact match against the allow-list.
pub fn check_extension(raw: &str, allowed: &[&str], kind: ExtensionKind) -> Option<Violation> {
    if allowed.contains(&raw) {
        return None;
    }
    let expected = allowed.join(" or ");
    let message = match kind {
        ExtensionKind::Archive => format!("Invalid archive extension: {} (expected {})", raw, expected),
        ExtensionKind::Payload => format!("Invalid file extension: {} (expected {})", raw, expected),
    };
    Some(Violation::new(ViolationKind::Field, message))
}

/// Checks CS1 against the dataset and CS2 against the (dataset, CS1) pair.
///
/// A selector whose text is not a number is skipped here; the format check
/// already reported it. CS2 is only looked up when CS1 is valid, since its
/// accepted set is defined per CS1.
pub fn check_component_selectors(
    cs1: Option<&str>,
    cs2: Option<&str>,
    dataset: u16,
    policy: &ReferencePolicy,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let Some(cs1_raw) = cs1 else {
        return violations;
    };
    let Some(cs1_value) = parse_selector(cs1_raw) else {
        return violations;
    };

    if !policy.is_valid_cs1(dataset, cs1_value) {
        violations.push(Violation::new(
            ViolationKind::CrossField,
            format!(
                "Invalid Component Selector 1 ({}) for Dataset ({:03})",
                cs1_raw, dataset
            ),
        ));
        return violations;
    }

    if let Some(cs2_raw) = cs2 {
        if let Some(cs2_value) = parse_selector(cs2_raw) {
            if !policy.is_valid_cs2(dataset, cs1_value, cs2_value) {
                violations.push(Violation::new(
                    ViolationKind::CrossField,
                    format!(
                        "Invalid Component Selector 2 ({}) for CS1 ({}) and Dataset ({:03})",
                        cs2_raw, cs1_raw, dataset
                    ),
                ));
            }
        }
    }

    violations
}

fn parse_selector(raw: &str) -> Option<u16> {
    parse_ascii_number(raw)
        .filter(|value| *value <= u64::from(u16::MAX))
        .map(|value| value as u16)
}

/// Parses ASCII digits only; `str::parse` would also accept a leading `+`.
fn parse_ascii_number(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn messages(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.message.as_str()).collect()
    }

    #[test]
    fn test_latitude_and_longitude_messages() {
        assert!(check_latitude("N62").is_none());
        assert_eq!(
            check_latitude("N99").unwrap().message,
            "Invalid latitude (N99)"
        );
        assert!(check_longitude("W162").is_none());
        assert_eq!(
            check_longitude("W999").unwrap().message,
            "Invalid longitude (W999)"
        );
    }

    #[test]
    fn test_dataset_code() {
        let policy = ReferencePolicy::builtin();
        assert!(check_dataset_code("306", 306, &policy).is_empty());

        let unknown = check_dataset_code("000", 306, &policy);
        assert_eq!(messages(&unknown), vec!["Invalid code 000"]);
        assert_eq!(unknown[0].kind, ViolationKind::Field);

        let mismatch = check_dataset_code("300", 306, &policy);
        assert_eq!(
            messages(&mismatch),
            vec!["Dataset code 300 does not match dataset 306"]
        );
        assert_eq!(mismatch[0].kind, ViolationKind::CrossField);
    }

    #[test]
    fn test_zero_padded_valid() {
        for raw in ["000", "007", "042", "100", "306", "999"] {
            assert!(check_zero_padded(raw, 3, "CS1").is_empty(), "{}", raw);
        }
    }

    #[test]
    fn test_zero_padded_short_values() {
        assert_eq!(
            messages(&check_zero_padded("7", 3, "CS1")),
            vec![
                "CS1 should be 3 characters (7)",
                "Invalid padding on CS1 (7, expected 007)",
            ]
        );
        // Boundary values: exactly 10 and exactly 100.
        assert_eq!(check_zero_padded("10", 3, "CS1").len(), 2);
        assert!(check_zero_padded("010", 3, "CS1").is_empty());
        assert!(check_zero_padded("100", 3, "CS1").is_empty());
    }

    #[test]
    fn test_zero_padded_long_values() {
        assert_eq!(
            messages(&check_zero_padded("0007", 3, "FSC")),
            vec!["FSC should be 3 characters (0007)"]
        );
        assert_eq!(
            messages(&check_zero_padded("1000", 3, "CS2")),
            vec![
                "CS2 should be 3 characters (1000)",
                "CS2 out of range (1000, maximum 999)",
            ]
        );
    }

    #[test]
    fn test_zero_padded_malformed_is_distinct() {
        assert_eq!(
            messages(&check_zero_padded("0x1", 3, "CS1")),
            vec!["Invalid CS1 number format (0x1)"]
        );
        assert_eq!(
            messages(&check_zero_padded("", 3, "CS1")),
            vec!["Invalid CS1 number format ()"]
        );
        // Unicode digits match `\d` but are not accepted as numbers.
        assert_eq!(check_zero_padded("٠٠١", 3, "CS1").len(), 1);
    }

    #[test]
    fn test_lengths() {
        assert!(check_fixed_length("AL015", 5, "Feature Code").is_none());
        assert!(check_fixed_length("AL01", 5, "Feature Code").is_some());
        assert!(check_max_length(&"m".repeat(32), 32, "Model name").is_none());
        assert_eq!(
            check_max_length(&"m".repeat(33), 32, "Model name")
                .unwrap()
                .message,
            format!(
                "Model name should not exceed 32 characters ({} has 33)",
                "m".repeat(33)
            )
        );
    }

    #[test]
    fn test_lod() {
        assert!(check_lod("LC").is_none());
        assert!(check_lod("L07").is_none());
        assert_eq!(check_lod("L99").unwrap().message, "Invalid LOD name: L99");
        assert!(check_lod("L7").is_some());
    }

    #[test]
    fn test_tile_refs() {
        assert!(check_tile_ref(FieldName::Uref, "38", Some("L07")).is_none());
        assert!(check_tile_ref(FieldName::Rref, "127", Some("L07")).is_none());

        let uref = check_tile_ref(FieldName::Uref, "999", Some("L07")).unwrap();
        assert_eq!(
            uref.message,
            "UREF value out of bounds: 999 (valid range 0-127 for L07)"
        );
        assert_eq!(uref.kind, ViolationKind::CrossField);

        let rref = check_tile_ref(FieldName::Rref, "9999", Some("L07")).unwrap();
        assert!(rref.message.starts_with("RREF out of bounds for LOD: 9999"));

        assert!(check_tile_ref(FieldName::Uref, "0", Some("LC")).is_none());
        assert!(check_tile_ref(FieldName::Uref, "1", Some("LC")).is_some());
        // Too many digits for any integer type is still just out of bounds.
        assert!(check_tile_ref(FieldName::Uref, &"9".repeat(40), Some("L23")).is_some());
        // No bound without a valid LOD.
        assert!(check_tile_ref(FieldName::Uref, "999", Some("L99")).is_none());
        assert!(check_tile_ref(FieldName::Uref, "999", None).is_none());
    }

    #[test]
    fn test_extensions() {
        assert!(check_extension("zip", &["zip"], ExtensionKind::Archive).is_none());
        assert_eq!(
            check_extension("7z", &["zip"], ExtensionKind::Archive)
                .unwrap()
                .message,
            "Invalid archive extension: 7z (expected zip)"
        );
        assert_eq!(
            check_extension("txt", &["rgb"], ExtensionKind::Payload)
                .unwrap()
                .message,
            "Invalid file extension: txt (expected rgb)"
        );
        assert!(check_extension("FLT", &["flt"], ExtensionKind::Payload).is_some());
    }

    #[test]
    fn test_component_selectors() {
        let policy = ReferencePolicy::builtin();
        assert!(check_component_selectors(Some("001"), Some("001"), 306, &policy).is_empty());

        assert_eq!(
            messages(&check_component_selectors(
                Some("000"),
                Some("001"),
                306,
                &policy
            )),
            vec!["Invalid Component Selector 1 (000) for Dataset (306)"]
        );
        assert_eq!(
            messages(&check_component_selectors(
                Some("001"),
                Some("000"),
                306,
                &policy
            )),
            vec!["Invalid Component Selector 2 (000) for CS1 (001) and Dataset (306)"]
        );
        // Malformed text is left to the format check.
        assert!(check_component_selectors(Some("x01"), Some("001"), 306, &policy).is_empty());
    }

    #[test]
    fn test_unknown_dataset_selectors_are_invalid() {
        let policy = ReferencePolicy::new();
        assert_eq!(
            check_component_selectors(Some("001"), Some("001"), 306, &policy).len(),
            1
        );
    }
}
