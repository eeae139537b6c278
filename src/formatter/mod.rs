//! Deterministic tree-to-markup formatter
//!
//! The last stage before handoff to the host: fills in derived rendering
//! markup for every governed block that did not supply its own. Markup
//! is a pure function of the block's type, identifier, and attributes,
//! so formatting the same tree twice yields the same output. Children
//! are formatted first; container markup wraps the composed child
//! markup in order.

use serde_json::{json, Map, Value};

use crate::identity;
use crate::validator::is_governed;

/// Formats a tree, returning a new tree with markup populated.
///
/// Blocks outside the governed namespace pass through untouched apart
/// from child recursion. Pre-supplied markup is kept as-is.
pub fn format(tree: &Value) -> Value {
    match tree.as_array() {
        Some(blocks) => Value::Array(blocks.iter().map(format_block).collect()),
        None => tree.clone(),
    }
}

fn format_block(block: &Value) -> Value {
    let obj = match block.as_object() {
        Some(obj) => obj,
        None => return block.clone(),
    };

    let mut out = obj.clone();

    let child_markup = match obj.get("innerBlocks").and_then(Value::as_array) {
        Some(children) => {
            let formatted: Vec<Value> = children.iter().map(format_block).collect();
            let composed: String = formatted
                .iter()
                .filter_map(|c| c.get("markup").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("");
            out.insert("innerBlocks".to_string(), Value::Array(formatted));
            composed
        }
        None => String::new(),
    };

    let type_name = obj.get("type").and_then(Value::as_str).unwrap_or_default();
    if !is_governed(type_name) {
        return Value::Object(out);
    }

    let attrs = obj
        .get("attrs")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let id = attrs
        .get(identity::BLOCK_ID_ATTR)
        .and_then(Value::as_str)
        .unwrap_or_default();

    let supplied = obj
        .get("markup")
        .and_then(Value::as_str)
        .map(|m| !m.is_empty())
        .unwrap_or(false);
    if !supplied {
        let markup = derive_markup(type_name, id, &attrs, &child_markup);
        out.insert("markup".to_string(), json!(markup));
    }

    // Derived CSS class, keyed by type and identifier
    if !attrs.contains_key("className") {
        if let Some(attrs_out) = out.get_mut("attrs").and_then(Value::as_object_mut) {
            attrs_out.insert("className".to_string(), json!(css_class(type_name, id)));
        }
    }

    Value::Object(out)
}

fn derive_markup(type_name: &str, id: &str, attrs: &Map<String, Value>, children: &str) -> String {
    let class = css_class(type_name, id);
    match type_name {
        "craft/heading" => {
            let level = attrs
                .get("level")
                .and_then(Value::as_i64)
                .unwrap_or(2)
                .clamp(1, 6);
            let title = escape_html(attrs.get("title").and_then(Value::as_str).unwrap_or(""));
            format!("<h{} class=\"{}\">{}</h{}>", level, class, title, level)
        }
        "craft/paragraph" => {
            let content = escape_html(attrs.get("content").and_then(Value::as_str).unwrap_or(""));
            format!("<p class=\"{}\">{}</p>", class, content)
        }
        "craft/image" => {
            let url = escape_html(attrs.get("url").and_then(Value::as_str).unwrap_or(""));
            let alt = escape_html(attrs.get("alt").and_then(Value::as_str).unwrap_or(""));
            format!(
                "<figure class=\"{}\"><img src=\"{}\" alt=\"{}\"/></figure>",
                class, url, alt
            )
        }
        "craft/button" => {
            let url = escape_html(attrs.get("url").and_then(Value::as_str).unwrap_or("#"));
            let label = escape_html(attrs.get("label").and_then(Value::as_str).unwrap_or(""));
            format!(
                "<div class=\"{}\"><a class=\"craft-button-link\" href=\"{}\">{}</a></div>",
                class, url, label
            )
        }
        "craft/container" => format!("<div class=\"{}\">{}</div>", class, children),
        // Unrecognized governed type: empty structural wrapper
        _ => format!("<div class=\"craft-block-{}\"></div>", id),
    }
}

fn css_class(type_name: &str, id: &str) -> String {
    let name = type_name.split_once('/').map(|(_, n)| n).unwrap_or(type_name);
    format!("craft-{}-{}", name, id)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_markup() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {"blockId": "ab12", "title": "Hello", "level": 3}
        }]);
        let out = format(&tree);
        assert_eq!(
            out[0]["markup"],
            json!("<h3 class=\"craft-heading-ab12\">Hello</h3>")
        );
        assert_eq!(out[0]["attrs"]["className"], json!("craft-heading-ab12"));
    }

    #[test]
    fn test_heading_level_defaults_and_clamps() {
        let tree = json!([
            {"type": "craft/heading", "attrs": {"blockId": "aa11", "title": "a"}},
            {"type": "craft/heading", "attrs": {"blockId": "bb22", "title": "b", "level": 9}}
        ]);
        let out = format(&tree);
        assert!(out[0]["markup"].as_str().unwrap().starts_with("<h2"));
        assert!(out[1]["markup"].as_str().unwrap().starts_with("<h6"));
    }

    #[test]
    fn test_title_is_escaped() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {"blockId": "ab12", "title": "a<b> & \"c\""}
        }]);
        let out = format(&tree);
        assert_eq!(
            out[0]["markup"],
            json!("<h2 class=\"craft-heading-ab12\">a&lt;b&gt; &amp; &quot;c&quot;</h2>")
        );
    }

    #[test]
    fn test_supplied_markup_kept() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {"blockId": "ab12", "title": "Hello"},
            "markup": "<h1>custom</h1>"
        }]);
        let out = format(&tree);
        assert_eq!(out[0]["markup"], json!("<h1>custom</h1>"));
    }

    #[test]
    fn test_container_composes_children_in_order() {
        let tree = json!([{
            "type": "craft/container",
            "attrs": {"blockId": "cc33"},
            "innerBlocks": [
                {"type": "craft/heading", "attrs": {"blockId": "aa11", "title": "One"}},
                {"type": "craft/paragraph", "attrs": {"blockId": "bb22", "content": "Two"}}
            ]
        }]);
        let out = format(&tree);
        let markup = out[0]["markup"].as_str().unwrap();
        assert!(markup.starts_with("<div class=\"craft-container-cc33\">"));
        let h = markup.find("craft-heading-aa11").unwrap();
        let p = markup.find("craft-paragraph-bb22").unwrap();
        assert!(h < p);
        // Children themselves also carry their own markup
        assert!(out[0]["innerBlocks"][0]["markup"]
            .as_str()
            .unwrap()
            .contains("One"));
    }

    #[test]
    fn test_unknown_governed_type_empty_wrapper() {
        let tree = json!([{"type": "craft/widget", "attrs": {"blockId": "ab12"}}]);
        let out = format(&tree);
        assert_eq!(
            out[0]["markup"],
            json!("<div class=\"craft-block-ab12\"></div>")
        );
    }

    #[test]
    fn test_non_governed_untouched() {
        let tree = json!([{"type": "core/quote", "attrs": {"content": "x"}}]);
        let out = format(&tree);
        assert!(out[0].get("markup").is_none());
        assert!(out[0]["attrs"].get("className").is_none());
    }

    #[test]
    fn test_pure_and_idempotent() {
        let tree = json!([{
            "type": "craft/heading",
            "attrs": {"blockId": "ab12", "title": "Hello"}
        }]);
        let before = tree.clone();
        let once = format(&tree);
        let twice = format(&once);
        assert_eq!(tree, before);
        assert_eq!(once, twice);
    }
}
