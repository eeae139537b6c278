//! Type-name namespaces, alias table, and fuzzy normalization
//!
//! Accepted namespaces are a closed set: the governed vendor namespace
//! and the host's own core namespace. Malformed or bare type names get
//! a suggestion from a small static alias table plus deterministic
//! normalization of hyphen and case variants.

/// Namespace whose blocks the engine governs (identifier rules apply).
pub const GOVERNED_NAMESPACE: &str = "craft";

/// All accepted namespaces.
pub const ACCEPTED_NAMESPACES: &[&str] = &["craft", "core"];

/// Bare-name aliases mapped to canonical type names.
const ALIASES: &[(&str, &str)] = &[
    ("heading", "craft/heading"),
    ("header", "craft/heading"),
    ("paragraph", "craft/paragraph"),
    ("text", "craft/paragraph"),
    ("image", "craft/image"),
    ("img", "craft/image"),
    ("button", "craft/button"),
    ("cta", "craft/button"),
    ("container", "craft/container"),
    ("section", "craft/container"),
    ("quote", "core/quote"),
];

/// Checks whether a namespace is accepted.
pub fn is_accepted_namespace(namespace: &str) -> bool {
    ACCEPTED_NAMESPACES.contains(&namespace)
}

/// Checks whether a type name belongs to the governed namespace.
pub fn is_governed(type_name: &str) -> bool {
    type_name
        .split_once('/')
        .map(|(ns, _)| ns == GOVERNED_NAMESPACE)
        .unwrap_or(false)
}

/// Suggests a canonical type name for a malformed or bare one.
///
/// Normalization order: lowercase, alias table on the bare name,
/// then hyphenated namespace variants ("craft-heading" -> "craft/heading").
pub fn suggest_type_name(type_name: &str) -> Option<String> {
    let lowered = type_name.trim().to_ascii_lowercase();

    if let Some((namespace, name)) = lowered.split_once('/') {
        // Right shape, maybe just a case problem
        if is_accepted_namespace(namespace) && !name.is_empty() && lowered != type_name {
            return Some(lowered);
        }
        // Unknown namespace: try the bare name through the alias table
        return ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| canonical.to_string());
    }

    if let Some((_, canonical)) = ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return Some(canonical.to_string());
    }

    // Hyphenated namespace variant: "craft-heading" -> "craft/heading"
    if let Some((namespace, name)) = lowered.split_once('-') {
        if is_accepted_namespace(namespace) && !name.is_empty() {
            return Some(format!("{}/{}", namespace, name));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governed_detection() {
        assert!(is_governed("craft/heading"));
        assert!(!is_governed("core/quote"));
        assert!(!is_governed("heading"));
    }

    #[test]
    fn test_bare_alias() {
        assert_eq!(suggest_type_name("heading"), Some("craft/heading".into()));
        assert_eq!(suggest_type_name("img"), Some("craft/image".into()));
        assert_eq!(suggest_type_name("quote"), Some("core/quote".into()));
    }

    #[test]
    fn test_hyphen_namespace_variant() {
        assert_eq!(
            suggest_type_name("craft-heading"),
            Some("craft/heading".into())
        );
        assert_eq!(
            suggest_type_name("core-gallery"),
            Some("core/gallery".into())
        );
    }

    #[test]
    fn test_case_normalization() {
        assert_eq!(
            suggest_type_name("Craft/Heading"),
            Some("craft/heading".into())
        );
    }

    #[test]
    fn test_unknown_namespace_falls_back_to_alias() {
        assert_eq!(
            suggest_type_name("vendor/heading"),
            Some("craft/heading".into())
        );
        assert_eq!(suggest_type_name("vendor/widget"), None);
    }

    #[test]
    fn test_no_suggestion() {
        assert_eq!(suggest_type_name("zzz"), None);
    }
}
