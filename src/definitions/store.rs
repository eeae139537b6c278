//! Definition store: load-once registry of shared attribute fragments
//!
//! Layout: one JSON document per definition at `<definitions_dir>/<name>.json`.
//! A document may contain nested named sub-definitions; the pointer
//! `"colors.gradient"` addresses the `gradient` key inside the `colors`
//! document.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::observability::Logger;

use super::errors::{DefinitionError, DefinitionResult};

/// In-memory registry of shared definitions, immutable after load.
pub struct DefinitionStore {
    definitions: HashMap<String, Value>,
}

impl DefinitionStore {
    /// Creates an empty store (tests and programmatic construction).
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Loads all definition documents from the given directory.
    ///
    /// A malformed file is skipped and logged; only an unreadable
    /// directory fails the load.
    pub fn load(definitions_dir: &Path) -> DefinitionResult<Self> {
        let mut store = Self::empty();

        if !definitions_dir.exists() {
            // No definitions is a valid (if bare) deployment
            return Ok(store);
        }

        let entries = fs::read_dir(definitions_dir).map_err(|e| {
            DefinitionError::io(format!(
                "Failed to read definitions directory '{}': {}",
                definitions_dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                DefinitionError::io(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();

            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    Logger::warn(
                        "definition_skipped",
                        &[
                            ("path", &path.display().to_string()),
                            ("reason", &e.to_string()),
                        ],
                    );
                    continue;
                }
            };

            match serde_json::from_str::<Value>(&content) {
                Ok(value) => {
                    store.definitions.insert(name, value);
                }
                Err(e) => {
                    Logger::warn(
                        "definition_skipped",
                        &[
                            ("path", &path.display().to_string()),
                            ("reason", &e.to_string()),
                        ],
                    );
                }
            }
        }

        Ok(store)
    }

    /// Registers a definition directly (tests and programmatic creation).
    pub fn register(&mut self, name: impl Into<String>, body: Value) {
        self.definitions.insert(name.into(), body);
    }

    /// Looks up a definition by pointer name.
    ///
    /// `"typography"` returns the whole document; `"colors.gradient"`
    /// descends into nested named sub-definitions key by key.
    pub fn lookup(&self, pointer: &str) -> Option<&Value> {
        let mut segments = pointer.split('.');
        let top = segments.next()?;
        let mut current = self.definitions.get(top)?;

        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        Some(current)
    }

    /// Returns all top-level definition names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of loaded definitions.
    pub fn count(&self) -> usize {
        self.definitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_directory() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("typography.json"),
            r#"{"fontSize": {"type": "number"}, "fontFamily": {"type": "string"}}"#,
        )
        .unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let store = DefinitionStore::load(tmp.path()).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.lookup("typography").is_some());
    }

    #[test]
    fn test_malformed_file_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.json"), r#"{"a": 1}"#).unwrap();
        fs::write(tmp.path().join("bad.json"), "{not json").unwrap();

        let store = DefinitionStore::load(tmp.path()).unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.lookup("good").is_some());
        assert!(store.lookup("bad").is_none());
    }

    #[test]
    fn test_missing_directory_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = DefinitionStore::load(&tmp.path().join("nope")).unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_nested_sub_definition_lookup() {
        let mut store = DefinitionStore::empty();
        store.register(
            "colors",
            json!({"gradient": {"type": "object"}, "solid": {"type": "string"}}),
        );

        assert!(store.lookup("colors.gradient").is_some());
        assert!(store.lookup("colors.missing").is_none());
        assert!(store.lookup("missing.gradient").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let mut store = DefinitionStore::empty();
        store.register("typography", json!({}));
        store.register("border", json!({}));
        assert_eq!(store.names(), vec!["border", "typography"]);
    }
}
