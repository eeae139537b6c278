//! Host-side identifier binding
//!
//! When a tree is durably stored, every governed block's identifier is
//! stamped with the record id. The suffix rule here must stay in
//! lockstep with `identity::finalize`: a tree passes through both the
//! client stage and this stage (on create and on every update), and the
//! two must never diverge or stack suffixes. The rule is deliberately
//! reimplemented rather than shared so the equivalence tests exercise
//! two independent copies, mirroring the deployed split.

use serde_json::Value;

use crate::identity::BLOCK_ID_ATTR;
use crate::validator::is_governed;

/// Binds an identifier to a record: keep the base, set the suffix.
pub fn finalize_id(id: &str, record_id: u64) -> String {
    let base = match id.find('_') {
        Some(pos) => &id[..pos],
        None => id,
    };
    format!("{}_{}", base, record_id)
}

/// Returns a copy of `tree` with every governed block's identifier
/// bound to `record_id`. Blocks without an identifier are left alone;
/// validation owns that complaint.
pub fn finalize_tree(tree: &Value, record_id: u64) -> Value {
    let mut bound = tree.clone();
    if let Some(blocks) = bound.as_array_mut() {
        for block in blocks.iter_mut() {
            finalize_block_mut(block, record_id);
        }
    }
    bound
}

fn finalize_block_mut(block: &mut Value, record_id: u64) {
    let obj = match block.as_object_mut() {
        Some(obj) => obj,
        None => return,
    };

    let governed = obj
        .get("type")
        .and_then(Value::as_str)
        .map(is_governed)
        .unwrap_or(false);

    if governed {
        if let Some(attrs) = obj.get_mut("attrs").and_then(Value::as_object_mut) {
            if let Some(id) = attrs.get(BLOCK_ID_ATTR).and_then(Value::as_str) {
                let bound = finalize_id(id, record_id);
                attrs.insert(BLOCK_ID_ATTR.to_string(), Value::String(bound));
            }
        }
    }

    if let Some(children) = obj.get_mut("innerBlocks").and_then(Value::as_array_mut) {
        for child in children.iter_mut() {
            finalize_block_mut(child, record_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finalize_id_matches_client_rule() {
        assert_eq!(finalize_id("ab12", 55), "ab12_55");
        assert_eq!(finalize_id("ab12_55", 77), "ab12_77");
        assert_eq!(finalize_id(&finalize_id("ab12", 5), 5), "ab12_5");
    }

    #[test]
    fn test_finalize_tree_binds_governed_blocks_recursively() {
        let tree = json!([
            {"type": "craft/heading", "attrs": {"blockId": "ab12"}},
            {
                "type": "craft/container",
                "attrs": {"blockId": "cc33_9"},
                "innerBlocks": [
                    {"type": "craft/paragraph", "attrs": {"blockId": "dd44"}},
                    {"type": "core/quote", "attrs": {"blockId": "ee55"}}
                ]
            }
        ]);
        let bound = finalize_tree(&tree, 42);

        assert_eq!(bound[0]["attrs"]["blockId"], json!("ab12_42"));
        assert_eq!(bound[1]["attrs"]["blockId"], json!("cc33_42"));
        assert_eq!(
            bound[1]["innerBlocks"][0]["attrs"]["blockId"],
            json!("dd44_42")
        );
        // Non-governed blocks keep their identifier untouched
        assert_eq!(
            bound[1]["innerBlocks"][1]["attrs"]["blockId"],
            json!("ee55")
        );
        // Input untouched
        assert_eq!(tree[0]["attrs"]["blockId"], json!("ab12"));
    }

    #[test]
    fn test_repeated_update_does_not_stack() {
        let tree = json!([{"type": "craft/heading", "attrs": {"blockId": "ab12"}}]);
        let once = finalize_tree(&tree, 42);
        let twice = finalize_tree(&once, 42);
        assert_eq!(once, twice);
    }
}
