//! Block tree validation rules
//!
//! Structural rules run per block before any schema lookup:
//! 1. type name present and `<namespace>/<name>` shaped, namespace accepted
//! 2. attrs present and an object
//! 3. governed blocks carry a well-formed identifier
//! 4. children are an array, validated recursively with re-rooted paths
//! 5. duplicate identifiers across the whole tree yield a single warning
//!
//! Schema-aware rules run only for types whose schema was supplied;
//! a missing schema degrades to structural checks, never to an error.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{json, Value};

use crate::identity;
use crate::observability::Logger;
use crate::schema::{json_kind_name, TypeSchema};

use super::aliases::{is_accepted_namespace, is_governed, suggest_type_name};
use super::report::{ErrorKind, FixSuggestion, ValidationReport, WarningKind};

/// Attributes exempt from unknown-attribute warnings: the identifier
/// itself and the host-generated CSS class.
const HOUSEKEEPING_ATTRS: &[&str] = &[identity::BLOCK_ID_ATTR, "className"];

/// Schemas supplied for type-aware checks, keyed by type name.
pub type SchemasByType = HashMap<String, Arc<TypeSchema>>;

fn type_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9-]*/[a-z][a-z0-9-]*$").expect("valid type-name pattern")
    })
}

/// Validates a tree structurally only.
pub fn validate(tree: &Value) -> ValidationReport {
    validate_with_schemas(tree, &SchemasByType::new())
}

/// Validates a tree structurally and against the supplied type schemas.
///
/// The input is never mutated; all findings are path-addressed relative
/// to the root `blocks[i]` prefix.
pub fn validate_with_schemas(tree: &Value, schemas: &SchemasByType) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut identifiers: Vec<String> = Vec::new();

    match tree.as_array() {
        Some(blocks) => {
            for (i, block) in blocks.iter().enumerate() {
                let path = format!("blocks[{}]", i);
                validate_block(block, &path, schemas, &mut report, &mut identifiers);
            }
        }
        None => {
            report.error(
                "blocks",
                ErrorKind::BlockNotObject,
                format!("content must be an array of blocks, got {}", json_kind_name(tree)),
                FixSuggestion::replace("blocks", "wrap the content in a block array", json!([])),
            );
        }
    }

    report_duplicates(&identifiers, &mut report);
    report
}

fn validate_block(
    block: &Value,
    path: &str,
    schemas: &SchemasByType,
    report: &mut ValidationReport,
    identifiers: &mut Vec<String>,
) {
    let obj = match block.as_object() {
        Some(obj) => obj,
        None => {
            report.error(
                path,
                ErrorKind::BlockNotObject,
                format!("block must be an object, got {}", json_kind_name(block)),
                FixSuggestion::manual(path, "replace the entry with a block object"),
            );
            return;
        }
    };

    // Rule 1: type name
    let type_name = match obj.get("type").and_then(Value::as_str) {
        Some(name) => name,
        None => {
            report.error(
                format!("{}.type", path),
                ErrorKind::MissingType,
                "block has no type name",
                FixSuggestion::manual(
                    format!("{}.type", path),
                    "set type to a namespaced name such as \"craft/paragraph\"",
                ),
            );
            ""
        }
    };

    if !type_name.is_empty() && !is_well_formed_type(type_name) {
        let suggestion = suggest_type_name(type_name);
        let fix = match &suggestion {
            Some(canonical) => FixSuggestion::replace(
                format!("{}.type", path),
                format!("rename type to \"{}\"", canonical),
                json!(canonical),
            ),
            None => FixSuggestion::manual(
                format!("{}.type", path),
                "use a namespaced type name matching <namespace>/<name> \
                 with an accepted namespace (craft, core)",
            ),
        };
        report.error(
            format!("{}.type", path),
            ErrorKind::MalformedTypeName,
            format!("type name '{}' is not a valid namespaced type", type_name),
            fix,
        );
    }

    // Rule 2: attrs map
    let attrs = obj.get("attrs");
    let attrs_obj = attrs.and_then(Value::as_object);
    if attrs_obj.is_none() {
        let got = attrs.map(json_kind_name).unwrap_or("missing");
        report.error(
            format!("{}.attrs", path),
            ErrorKind::AttrsNotObject,
            format!("attributes must be an object, got {}", got),
            FixSuggestion::replace(
                format!("{}.attrs", path),
                "replace attributes with an empty object",
                json!({}),
            ),
        );
    }

    // Rule 3: identifier, governed namespace only
    if is_governed(type_name) {
        if let Some(attrs_obj) = attrs_obj {
            match attrs_obj.get(identity::BLOCK_ID_ATTR) {
                None => {
                    report.error(
                        format!("{}.attrs.{}", path, identity::BLOCK_ID_ATTR),
                        ErrorKind::MissingIdentifier,
                        format!("governed block '{}' has no identifier", type_name),
                        FixSuggestion::replace(
                            format!("{}.attrs.{}", path, identity::BLOCK_ID_ATTR),
                            "insert a generated identifier",
                            json!(identity::generate()),
                        ),
                    );
                }
                Some(value) => {
                    let id = value.as_str().unwrap_or("");
                    if !identity::is_valid(id) {
                        report.error(
                            format!("{}.attrs.{}", path, identity::BLOCK_ID_ATTR),
                            ErrorKind::MalformedIdentifier,
                            format!(
                                "identifier '{}' must match {} (e.g. \"ab12\") or {} (e.g. \"ab12_55\")",
                                id,
                                identity::base_pattern(),
                                identity::suffixed_pattern()
                            ),
                            FixSuggestion::replace(
                                format!("{}.attrs.{}", path, identity::BLOCK_ID_ATTR),
                                "replace with a generated identifier",
                                json!(identity::generate()),
                            ),
                        );
                    }
                    if let Some(id) = value.as_str() {
                        identifiers.push(id.to_string());
                    }
                }
            }
        }
    }

    // Schema-aware rules
    if let (Some(attrs_obj), Some(schema)) = (attrs_obj, schemas.get(type_name)) {
        validate_attributes(attrs_obj, schema, path, report);
    }

    // Rule 4: children
    if let Some(children) = obj.get("innerBlocks") {
        match children.as_array() {
            Some(children) => {
                for (j, child) in children.iter().enumerate() {
                    let child_path = format!("{}.innerBlocks[{}]", path, j);
                    validate_block(child, &child_path, schemas, report, identifiers);
                }
            }
            None => {
                report.error(
                    format!("{}.innerBlocks", path),
                    ErrorKind::ChildrenNotArray,
                    format!("children must be an array, got {}", json_kind_name(children)),
                    FixSuggestion::replace(
                        format!("{}.innerBlocks", path),
                        "replace children with an empty array",
                        json!([]),
                    ),
                );
            }
        }
    }
}

fn validate_attributes(
    attrs: &serde_json::Map<String, Value>,
    schema: &TypeSchema,
    path: &str,
    report: &mut ValidationReport,
) {
    // Deterministic finding order regardless of map iteration order
    let declared: BTreeMap<&str, _> = schema
        .attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect();

    for (name, attr) in &declared {
        let apath = format!("{}.attrs.{}", path, name);

        let value = match attrs.get(*name) {
            Some(value) => value,
            None => {
                if attr.required {
                    let fix = match &attr.default {
                        Some(default) => FixSuggestion::replace(
                            &apath,
                            format!("add required attribute '{}'", name),
                            default.clone(),
                        ),
                        None => FixSuggestion::manual(
                            &apath,
                            format!("add required attribute '{}'", name),
                        ),
                    };
                    report.error(
                        &apath,
                        ErrorKind::MissingRequired,
                        format!("missing required attribute '{}'", name),
                        fix,
                    );
                }
                continue;
            }
        };

        if let Some(kind) = attr.kind {
            if !kind.matches(value) {
                report.error(
                    &apath,
                    ErrorKind::TypeMismatch,
                    format!(
                        "attribute '{}' expected {}, got {}",
                        name,
                        kind.name(),
                        json_kind_name(value)
                    ),
                    FixSuggestion::manual(
                        &apath,
                        format!("provide a {} value for '{}'", kind.name(), name),
                    ),
                );
                continue;
            }
        }

        if let Some(allowed) = &attr.enum_values {
            if !allowed.contains(value) {
                report.error(
                    &apath,
                    ErrorKind::EnumViolation,
                    format!(
                        "attribute '{}' must be one of {}",
                        name,
                        enum_preview(allowed)
                    ),
                    FixSuggestion::manual(
                        &apath,
                        format!("choose one of {}", enum_preview(allowed)),
                    ),
                );
                continue;
            }
        }

        if let (Some(pattern), Some(text)) = (&attr.pattern, value.as_str()) {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(text) {
                        report.error(
                            &apath,
                            ErrorKind::PatternViolation,
                            format!("attribute '{}' must match pattern {}", name, pattern),
                            FixSuggestion::manual(
                                &apath,
                                format!("provide a value matching {}", pattern),
                            ),
                        );
                        continue;
                    }
                }
                Err(_) => {
                    Logger::warn(
                        "schema_pattern_invalid",
                        &[("attribute", name), ("pattern", pattern)],
                    );
                }
            }
        }

        // Bounds are soft recommendations, not structural breakage
        if let Some(n) = value.as_f64() {
            if let Some(min) = attr.minimum {
                if n < min {
                    report.warn(
                        &apath,
                        WarningKind::NumericOutOfRange,
                        format!("attribute '{}' value {} below minimum {}", name, n, min),
                    );
                }
            }
            if let Some(max) = attr.maximum {
                if n > max {
                    report.warn(
                        &apath,
                        WarningKind::NumericOutOfRange,
                        format!("attribute '{}' value {} above maximum {}", name, n, max),
                    );
                }
            }
        }

        if let Some(text) = value.as_str() {
            let len = text.chars().count();
            if let Some(min) = attr.min_length {
                if len < min {
                    report.warn(
                        &apath,
                        WarningKind::LengthOutOfRange,
                        format!("attribute '{}' length {} below minimum {}", name, len, min),
                    );
                }
            }
            if let Some(max) = attr.max_length {
                if len > max {
                    report.warn(
                        &apath,
                        WarningKind::LengthOutOfRange,
                        format!("attribute '{}' length {} above maximum {}", name, len, max),
                    );
                }
            }
        }
    }

    // Unknown attributes, housekeeping exempt
    let mut unknown: Vec<&str> = attrs
        .keys()
        .map(String::as_str)
        .filter(|k| !declared.contains_key(k) && !HOUSEKEEPING_ATTRS.contains(k))
        .collect();
    unknown.sort_unstable();

    for name in unknown {
        report.warn(
            format!("{}.attrs.{}", path, name),
            WarningKind::UnknownAttribute,
            format!("attribute '{}' is not declared by the schema (unknown or deprecated)", name),
        );
    }
}

fn is_well_formed_type(type_name: &str) -> bool {
    if !type_name_re().is_match(type_name) {
        return false;
    }
    type_name
        .split_once('/')
        .map(|(ns, _)| is_accepted_namespace(ns))
        .unwrap_or(false)
}

/// Lists up to the first five allowed values, with an ellipsis marker
/// when more exist.
fn enum_preview(allowed: &[Value]) -> String {
    let mut parts: Vec<String> = allowed.iter().take(5).map(Value::to_string).collect();
    if allowed.len() > 5 {
        parts.push("…".to_string());
    }
    format!("[{}]", parts.join(", "))
}

/// One warning for the whole tree naming every duplicated value once.
fn report_duplicates(identifiers: &[String], report: &mut ValidationReport) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in identifiers {
        *counts.entry(id.as_str()).or_default() += 1;
    }

    let duplicated: Vec<String> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, count)| format!("'{}' ({} occurrences)", id, count))
        .collect();

    if !duplicated.is_empty() {
        report.warn(
            "blocks",
            WarningKind::DuplicateIdentifiers,
            format!("duplicate identifiers: {}", duplicated.join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeKind, AttributeSchema};

    fn heading_schema() -> Arc<TypeSchema> {
        let mut attributes = HashMap::new();
        attributes.insert(
            "title".to_string(),
            AttributeSchema::required(AttributeKind::String),
        );
        let mut level = AttributeSchema::optional(AttributeKind::Integer);
        level.minimum = Some(1.0);
        level.maximum = Some(6.0);
        attributes.insert("level".to_string(), level);
        let mut align = AttributeSchema::optional(AttributeKind::String);
        align.enum_values = Some(vec![json!("left"), json!("center"), json!("right")]);
        attributes.insert("align".to_string(), align);

        Arc::new(TypeSchema {
            name: "craft/heading".to_string(),
            title: None,
            category: None,
            complexity: None,
            use_cases: vec![],
            attributes,
            editing: None,
        })
    }

    fn schemas() -> SchemasByType {
        let mut map = SchemasByType::new();
        map.insert("craft/heading".to_string(), heading_schema());
        map
    }

    #[test]
    fn test_valid_block_passes() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {"blockId": "ab12", "title": "Hello", "level": 2}
        }]);
        let report = validate_with_schemas(&tree, &schemas());
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_identifier_is_identity_error() {
        let tree = json!([{"type": "craft/heading", "attrs": {}}]);
        let report = validate(&tree);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::MissingIdentifier);
        assert_eq!(report.errors[0].path, "blocks[0].attrs.blockId");
        let replacement = report.errors[0].fix.replacement.as_ref().unwrap();
        assert!(identity::is_base(replacement.as_str().unwrap()));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_core_namespace_needs_no_identifier() {
        let tree = json!([{"type": "core/quote", "attrs": {}}]);
        let report = validate(&tree);
        assert!(report.is_valid());
    }

    #[test]
    fn test_malformed_identifier_names_pattern() {
        let tree = json!([{"type": "craft/heading", "attrs": {"blockId": "XYZ"}}]);
        let report = validate(&tree);
        assert_eq!(report.errors[0].kind, ErrorKind::MalformedIdentifier);
        assert!(report.errors[0].message.contains("^[0-9a-f]{4}$"));
        assert!(report.errors[0].message.contains("ab12"));
    }

    #[test]
    fn test_bare_type_gets_alias_suggestion() {
        let tree = json!([{"type": "heading", "attrs": {}}]);
        let report = validate(&tree);
        let err = report
            .errors
            .iter()
            .find(|e| e.kind == ErrorKind::MalformedTypeName)
            .unwrap();
        assert_eq!(err.fix.replacement, Some(json!("craft/heading")));
    }

    #[test]
    fn test_attrs_not_object() {
        let tree = json!([{"type": "core/quote", "attrs": [1, 2]}]);
        let report = validate(&tree);
        assert_eq!(report.errors[0].kind, ErrorKind::AttrsNotObject);
        assert_eq!(report.errors[0].fix.replacement, Some(json!({})));
    }

    #[test]
    fn test_children_not_array() {
        let tree = json!([{"type": "core/quote", "attrs": {}, "innerBlocks": "nope"}]);
        let report = validate(&tree);
        assert_eq!(report.errors[0].kind, ErrorKind::ChildrenNotArray);
    }

    #[test]
    fn test_nested_paths_re_rooted() {
        let tree = json!([
            {"type": "core/quote", "attrs": {}},
            {
                "type": "craft/container",
                "attrs": {"blockId": "aa11"},
                "innerBlocks": [
                    {"type": "craft/heading", "attrs": {"blockId": "bb22", "title": 7}}
                ]
            }
        ]);
        let mut map = SchemasByType::new();
        map.insert("craft/heading".to_string(), heading_schema());
        let report = validate_with_schemas(&tree, &map);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].path,
            "blocks[1].innerBlocks[0].attrs.title"
        );
        assert_eq!(report.errors[0].kind, ErrorKind::TypeMismatch);
        assert!(report.errors[0].message.contains("string"));
        assert!(report.errors[0].message.contains("integer"));
    }

    #[test]
    fn test_duplicate_identifiers_single_warning_no_errors() {
        let tree = json!([
            {"type": "craft/heading", "attrs": {"blockId": "ab12", "title": "a"}},
            {"type": "craft/heading", "attrs": {"blockId": "ab12", "title": "b"}}
        ]);
        let report = validate(&tree);
        assert!(report.errors.is_empty());
        let dup: Vec<_> = report
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DuplicateIdentifiers)
            .collect();
        assert_eq!(dup.len(), 1);
        assert!(dup[0].message.contains("'ab12' (2 occurrences)"));
    }

    #[test]
    fn test_enum_preview_capped_at_five() {
        let mut attr = AttributeSchema::optional(AttributeKind::String);
        attr.enum_values = Some(
            ["a", "b", "c", "d", "e", "f", "g"]
                .iter()
                .map(|s| json!(s))
                .collect(),
        );
        let mut attributes = HashMap::new();
        attributes.insert("variant".to_string(), attr);
        let schema = Arc::new(TypeSchema {
            name: "craft/button".to_string(),
            title: None,
            category: None,
            complexity: None,
            use_cases: vec![],
            attributes,
            editing: None,
        });
        let mut map = SchemasByType::new();
        map.insert("craft/button".to_string(), schema);

        let tree = json!([{
            "type": "craft/button",
            "attrs": {"blockId": "ab12", "variant": "zzz"}
        }]);
        let report = validate_with_schemas(&tree, &map);
        let err = report
            .errors
            .iter()
            .find(|e| e.kind == ErrorKind::EnumViolation)
            .unwrap();
        assert!(err.message.contains("…"));
        assert!(!err.message.contains("\"f\""));
    }

    #[test]
    fn test_bounds_are_warnings_not_errors() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {"blockId": "ab12", "title": "x", "level": 9}
        }]);
        let report = validate_with_schemas(&tree, &schemas());
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::NumericOutOfRange);
        assert_eq!(report.warnings[0].path, "blocks[0].attrs.level");
    }

    #[test]
    fn test_unknown_attribute_warned_housekeeping_exempt() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {
                "blockId": "ab12",
                "title": "x",
                "className": "craft-heading-ab12",
                "legacyColor": "#fff"
            }
        }]);
        let report = validate_with_schemas(&tree, &schemas());
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::UnknownAttribute);
        assert!(report.warnings[0].path.ends_with("attrs.legacyColor"));
    }

    #[test]
    fn test_validator_never_mutates_input() {
        let tree = json!([{"type": "heading", "attrs": "bad", "innerBlocks": 3}]);
        let before = tree.clone();
        let _ = validate_with_schemas(&tree, &schemas());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_non_array_tree() {
        let report = validate(&json!({"type": "craft/heading"}));
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "blocks");
    }
}
