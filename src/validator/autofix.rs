//! Bounded auto-fix engine
//!
//! Applies only rewrites that are safe without knowing the author's
//! intent: canonicalizing type names through the alias table, restoring
//! the attrs and children containers to their required shapes, and
//! inserting or regenerating identifiers on governed blocks. Attribute
//! content is never invented; schema-level problems stay in the report
//! for the caller. One pass converges: re-validating the fixed tree
//! yields no structural or identity errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::identity;

use super::aliases::{is_governed, suggest_type_name};

/// One applied rewrite, path-addressed like validation findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub path: String,
    pub action: String,
}

/// A repaired copy of the tree plus everything that was changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixOutcome {
    pub fixed: Value,
    pub change_log: Vec<ChangeLogEntry>,
}

/// Repairs a tree without mutating the input.
///
/// A non-array tree is returned unchanged; the validator reports the
/// shape problem and its fix, which is a judgement call for the caller.
pub fn auto_fix(tree: &Value) -> FixOutcome {
    let mut fixed = tree.clone();
    let mut change_log = Vec::new();

    if let Some(blocks) = fixed.as_array_mut() {
        for (i, block) in blocks.iter_mut().enumerate() {
            let path = format!("blocks[{}]", i);
            fix_block(block, &path, &mut change_log);
        }
    }

    FixOutcome { fixed, change_log }
}

fn fix_block(block: &mut Value, path: &str, log: &mut Vec<ChangeLogEntry>) {
    let obj = match block.as_object_mut() {
        Some(obj) => obj,
        // Not repairable without inventing content
        None => return,
    };

    // Type-name canonicalization runs first: a bare alias like "heading"
    // only becomes governed after the rewrite, and the identifier and
    // attrs repairs below depend on the canonical name. This ordering is
    // what makes a single fix pass converge to a clean re-validation.
    fix_type_name(obj, path, log);

    let type_name = obj
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    fix_attrs_container(obj, path, log);

    if is_governed(&type_name) {
        fix_identifier(obj, path, log);
    }

    fix_children(obj, path, log);
}

/// Canonicalizes a malformed type name when the alias table knows it.
fn fix_type_name(obj: &mut Map<String, Value>, path: &str, log: &mut Vec<ChangeLogEntry>) {
    let current = match obj.get("type").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return,
    };

    if is_governed(&current) || current.starts_with("core/") {
        return;
    }

    if let Some(canonical) = suggest_type_name(&current) {
        obj.insert("type".to_string(), json!(canonical));
        log.push(ChangeLogEntry {
            path: format!("{}.type", path),
            action: format!("renamed type '{}' to '{}'", current, canonical),
        });
    }
}

/// Restores a missing or non-object attrs container to an empty object.
fn fix_attrs_container(obj: &mut Map<String, Value>, path: &str, log: &mut Vec<ChangeLogEntry>) {
    let ok = obj.get("attrs").map(Value::is_object).unwrap_or(false);
    if !ok {
        obj.insert("attrs".to_string(), json!({}));
        log.push(ChangeLogEntry {
            path: format!("{}.attrs", path),
            action: "replaced attributes with an empty object".to_string(),
        });
    }
}

/// Inserts or regenerates the identifier on a governed block.
fn fix_identifier(obj: &mut Map<String, Value>, path: &str, log: &mut Vec<ChangeLogEntry>) {
    let attrs = match obj.get_mut("attrs").and_then(Value::as_object_mut) {
        Some(attrs) => attrs,
        None => return,
    };

    let current = attrs.get(identity::BLOCK_ID_ATTR);
    let valid = current
        .and_then(Value::as_str)
        .map(identity::is_valid)
        .unwrap_or(false);
    if valid {
        return;
    }

    let id = identity::generate();
    let action = match current {
        Some(old) => format!("replaced malformed identifier {} with '{}'", old, id),
        None => format!("inserted generated identifier '{}'", id),
    };
    attrs.insert(identity::BLOCK_ID_ATTR.to_string(), json!(id));
    log.push(ChangeLogEntry {
        path: format!("{}.attrs.{}", path, identity::BLOCK_ID_ATTR),
        action,
    });
}

/// Restores a non-array children container and recurses into children.
fn fix_children(obj: &mut Map<String, Value>, path: &str, log: &mut Vec<ChangeLogEntry>) {
    let children = match obj.get_mut("innerBlocks") {
        Some(children) => children,
        None => return,
    };

    match children.as_array_mut() {
        Some(children) => {
            for (j, child) in children.iter_mut().enumerate() {
                let child_path = format!("{}.innerBlocks[{}]", path, j);
                fix_block(child, &child_path, log);
            }
        }
        None => {
            *children = json!([]);
            log.push(ChangeLogEntry {
                path: format!("{}.innerBlocks", path),
                action: "replaced children with an empty array".to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;

    #[test]
    fn test_inserts_identifier_on_governed_block() {
        let tree = json!([{"type": "craft/heading", "attrs": {}}]);
        let outcome = auto_fix(&tree);

        let id = outcome.fixed[0]["attrs"]["blockId"].as_str().unwrap();
        assert!(identity::is_base(id));
        assert_eq!(outcome.change_log.len(), 1);
        assert_eq!(outcome.change_log[0].path, "blocks[0].attrs.blockId");
    }

    #[test]
    fn test_replaces_malformed_identifier() {
        let tree = json!([{"type": "craft/heading", "attrs": {"blockId": "XYZ"}}]);
        let outcome = auto_fix(&tree);

        let id = outcome.fixed[0]["attrs"]["blockId"].as_str().unwrap();
        assert!(identity::is_base(id));
        assert!(outcome.change_log[0].action.contains("XYZ"));
    }

    #[test]
    fn test_keeps_valid_identifier() {
        let tree = json!([{"type": "craft/heading", "attrs": {"blockId": "ab12"}}]);
        let outcome = auto_fix(&tree);

        assert_eq!(outcome.fixed, tree);
        assert!(outcome.change_log.is_empty());
    }

    #[test]
    fn test_alias_rewrite_then_identifier_same_pass() {
        let tree = json!([{"type": "heading", "attrs": {}}]);
        let outcome = auto_fix(&tree);

        assert_eq!(outcome.fixed[0]["type"], json!("craft/heading"));
        assert!(identity::is_base(
            outcome.fixed[0]["attrs"]["blockId"].as_str().unwrap()
        ));
        assert!(validate(&outcome.fixed).is_valid());
    }

    #[test]
    fn test_non_object_attrs_replaced_then_identified() {
        let tree = json!([{"type": "craft/paragraph", "attrs": "nope"}]);
        let outcome = auto_fix(&tree);

        assert!(outcome.fixed[0]["attrs"].is_object());
        assert!(identity::is_base(
            outcome.fixed[0]["attrs"]["blockId"].as_str().unwrap()
        ));
        assert!(validate(&outcome.fixed).is_valid());
    }

    #[test]
    fn test_children_restored_and_recursed() {
        let tree = json!([
            {"type": "core/quote", "attrs": {}, "innerBlocks": "bad"},
            {
                "type": "craft/container",
                "attrs": {"blockId": "aa11"},
                "innerBlocks": [{"type": "craft/heading", "attrs": {}}]
            }
        ]);
        let outcome = auto_fix(&tree);

        assert_eq!(outcome.fixed[0]["innerBlocks"], json!([]));
        let paths: Vec<&str> = outcome.change_log.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"blocks[0].innerBlocks"));
        assert!(paths.contains(&"blocks[1].innerBlocks[0].attrs.blockId"));
        assert!(validate(&outcome.fixed).is_valid());
    }

    #[test]
    fn test_never_invents_attribute_content() {
        // Missing required attributes stay missing; only containers and
        // identifiers are repaired.
        let tree = json!([{"type": "craft/image", "attrs": {"blockId": "ab12"}}]);
        let outcome = auto_fix(&tree);
        assert_eq!(outcome.fixed, tree);
    }

    #[test]
    fn test_input_not_mutated() {
        let tree = json!([{"type": "heading"}]);
        let before = tree.clone();
        let _ = auto_fix(&tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_non_array_tree_unchanged() {
        let tree = json!({"type": "craft/heading"});
        let outcome = auto_fix(&tree);
        assert_eq!(outcome.fixed, tree);
        assert!(outcome.change_log.is_empty());
    }
}
