//! Staged schema loading with snapshot-swap reload
//!
//! File layout, keyed by type name:
//! - primary:  `<schema_dir>/<namespace>/<name>/<level>.json`
//! - legacy:   `<schema_dir>/<namespace>-<name>-<level>.json`
//!
//! Level semantics:
//! - `full` short-circuits merging and is cached per type name
//! - staged requests shallow-merge top-level keys in request order and
//!   deep-merge the `attributes` map; they are never cached
//! - a missing level file is silently skipped; a malformed file aborts
//!   only that type's load and is logged
//! - an entirely unknown type yields `None`, not an error
//!
//! Reload builds a fresh immutable snapshot and swaps it in a single
//! assignment; in-flight readers keep the snapshot they already hold.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::{Map, Value};

use crate::definitions::{DefinitionStore, RefResolver};
use crate::observability::Logger;

use super::catalog::{Catalog, TypeMeta};
use super::errors::{SchemaError, SchemaResult};
use super::types::{SchemaLevel, TypeSchema};

/// Immutable view of the schema tree: catalog, definitions, and the
/// per-type full-schema cache.
pub struct SchemaSnapshot {
    schema_dir: PathBuf,
    catalog: Catalog,
    definitions: DefinitionStore,
    full_cache: Mutex<HashMap<String, Arc<TypeSchema>>>,
}

/// Store handle owning the current snapshot.
pub struct SchemaStore {
    schema_dir: PathBuf,
    definitions_dir: PathBuf,
    snapshot: RwLock<Arc<SchemaSnapshot>>,
}

impl SchemaStore {
    /// Opens the store, building the initial snapshot.
    pub fn open(schema_dir: &Path, definitions_dir: &Path) -> SchemaResult<Self> {
        let snapshot = build_snapshot(schema_dir, definitions_dir)?;
        Ok(Self {
            schema_dir: schema_dir.to_path_buf(),
            definitions_dir: definitions_dir.to_path_buf(),
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Returns the current snapshot. Callers hold it for the duration of
    /// one request; a concurrent reload does not change what they see.
    pub fn snapshot(&self) -> Arc<SchemaSnapshot> {
        self.snapshot
            .read()
            .expect("snapshot lock poisoned")
            .clone()
    }

    /// Rebuilds the snapshot from disk and swaps it in atomically.
    pub fn reload(&self) -> SchemaResult<()> {
        let fresh = build_snapshot(&self.schema_dir, &self.definitions_dir)?;
        let mut guard = self.snapshot.write().expect("snapshot lock poisoned");
        *guard = Arc::new(fresh);
        Logger::info("schema_reloaded", &[]);
        Ok(())
    }
}

impl SchemaSnapshot {
    /// Returns the browsing catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the shared definition store.
    pub fn definitions(&self) -> &DefinitionStore {
        &self.definitions
    }

    /// Loads the schema for one type at the requested levels.
    ///
    /// Returns `Ok(None)` when the type is entirely unknown; callers
    /// treat this as "schema-based checks unavailable", never fatal.
    pub fn block_schema(
        &self,
        type_name: &str,
        levels: &[SchemaLevel],
        resolve_refs: bool,
    ) -> SchemaResult<Option<Arc<TypeSchema>>> {
        if !self.catalog.contains(type_name) {
            return Ok(None);
        }

        if levels.contains(&SchemaLevel::Full) {
            return self.full_schema(type_name, resolve_refs).map(Some);
        }

        let mut merged = Map::new();
        for level in levels {
            if let Some(layer) = self.read_level(type_name, *level)? {
                merge_level(&mut merged, layer);
            }
            // Missing level file: merge proceeds with whatever exists
        }

        self.finish_schema(type_name, merged, resolve_refs)
            .map(|schema| Some(Arc::new(schema)))
    }

    /// Loads the complete schema, serving the per-type cache when the
    /// resolved form is requested.
    fn full_schema(&self, type_name: &str, resolve_refs: bool) -> SchemaResult<Arc<TypeSchema>> {
        if resolve_refs {
            let cache = self.full_cache.lock().expect("full cache lock poisoned");
            if let Some(schema) = cache.get(type_name) {
                return Ok(schema.clone());
            }
        }

        let merged = match self.read_level(type_name, SchemaLevel::Full)? {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(SchemaError::malformed(
                    type_name,
                    self.level_path(type_name, SchemaLevel::Full).0.display().to_string(),
                    format!("expected an object, got {}", json_brief(&other)),
                ))
            }
            // No dedicated full file: the complete schema is the merge of
            // every partial level that exists
            None => {
                let mut merged = Map::new();
                for level in [SchemaLevel::Meta, SchemaLevel::Core, SchemaLevel::Styling] {
                    if let Some(layer) = self.read_level(type_name, level)? {
                        merge_level(&mut merged, layer);
                    }
                }
                merged
            }
        };

        let schema = Arc::new(self.finish_schema(type_name, merged, resolve_refs)?);

        if resolve_refs {
            let mut cache = self.full_cache.lock().expect("full cache lock poisoned");
            cache.insert(type_name.to_string(), schema.clone());
        }

        Ok(schema)
    }

    /// Resolves references (when requested) and deserializes the merged map.
    fn finish_schema(
        &self,
        type_name: &str,
        mut merged: Map<String, Value>,
        resolve_refs: bool,
    ) -> SchemaResult<TypeSchema> {
        merged
            .entry("name".to_string())
            .or_insert_with(|| Value::String(type_name.to_string()));

        let value = if resolve_refs {
            RefResolver::new(&self.definitions).resolve(&Value::Object(merged), 0)
        } else {
            Value::Object(merged)
        };

        serde_json::from_value(value).map_err(|e| {
            SchemaError::malformed(type_name, "<merged>", format!("schema shape invalid: {}", e))
        })
    }

    /// Reads one level file, trying the primary layout then the legacy
    /// flat layout. Missing in both is `Ok(None)`.
    fn read_level(&self, type_name: &str, level: SchemaLevel) -> SchemaResult<Option<Value>> {
        let (primary, legacy) = self.level_path(type_name, level);

        let path = if primary.exists() {
            primary
        } else if legacy.exists() {
            legacy
        } else {
            return Ok(None);
        };

        let content = fs::read_to_string(&path).map_err(|e| {
            let err = SchemaError::malformed(type_name, path.display().to_string(), e.to_string());
            Logger::log_stderr(
                crate::observability::Severity::Error,
                "schema_file_unreadable",
                &[("path", &path.display().to_string()), ("type", type_name)],
            );
            err
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            Logger::log_stderr(
                crate::observability::Severity::Error,
                "schema_file_malformed",
                &[("path", &path.display().to_string()), ("type", type_name)],
            );
            SchemaError::malformed(type_name, path.display().to_string(), e.to_string())
        })?;

        Ok(Some(value))
    }

    /// Returns (primary, legacy) candidate paths for a level file.
    fn level_path(&self, type_name: &str, level: SchemaLevel) -> (PathBuf, PathBuf) {
        let (namespace, name) = match type_name.split_once('/') {
            Some((ns, n)) => (ns, n),
            None => ("", type_name),
        };

        let primary = self
            .schema_dir
            .join(namespace)
            .join(name)
            .join(format!("{}.json", level.as_str()));
        let legacy = self
            .schema_dir
            .join(format!("{}-{}-{}.json", namespace, name, level.as_str()));

        (primary, legacy)
    }
}

/// Builds a snapshot: definitions plus the catalog scanned from meta files.
fn build_snapshot(schema_dir: &Path, definitions_dir: &Path) -> SchemaResult<SchemaSnapshot> {
    let definitions =
        DefinitionStore::load(definitions_dir).map_err(|e| SchemaError::io(e.to_string()))?;

    let mut entries = Vec::new();

    if schema_dir.exists() {
        scan_primary_layout(schema_dir, &mut entries)?;
        scan_legacy_layout(schema_dir, &mut entries)?;
    } else {
        Logger::warn(
            "schema_dir_missing",
            &[("path", &schema_dir.display().to_string())],
        );
    }

    Ok(SchemaSnapshot {
        schema_dir: schema_dir.to_path_buf(),
        catalog: Catalog::from_entries(entries),
        definitions,
        full_cache: Mutex::new(HashMap::new()),
    })
}

/// Scans `<schema_dir>/<namespace>/<name>/meta.json`.
fn scan_primary_layout(schema_dir: &Path, entries: &mut Vec<TypeMeta>) -> SchemaResult<()> {
    for ns_entry in read_dir(schema_dir)? {
        let ns_path = ns_entry.path();
        if !ns_path.is_dir() {
            continue;
        }
        let namespace = match ns_path.file_name().and_then(|n| n.to_str()) {
            Some(ns) => ns.to_string(),
            None => continue,
        };

        for type_entry in read_dir(&ns_path)? {
            let type_path = type_entry.path();
            if !type_path.is_dir() {
                continue;
            }
            let name = match type_path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };

            let type_name = format!("{}/{}", namespace, name);
            let meta_path = type_path.join("meta.json");
            if meta_path.exists() {
                if let Some(meta) = load_meta(&meta_path, &type_name) {
                    entries.push(meta);
                }
            }
        }
    }
    Ok(())
}

/// Scans legacy flat files `<schema_dir>/<namespace>-<name>-meta.json`.
///
/// Namespaces carry no hyphens, so the first hyphen splits namespace
/// from name; the name itself may contain further hyphens.
fn scan_legacy_layout(schema_dir: &Path, entries: &mut Vec<TypeMeta>) -> SchemaResult<()> {
    for entry in read_dir(schema_dir)? {
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |e| e != "json") {
            continue;
        }

        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(s) => s,
            None => continue,
        };
        let prefix = match stem.strip_suffix("-meta") {
            Some(p) => p,
            None => continue,
        };
        let (namespace, name) = match prefix.split_once('-') {
            Some((ns, n)) if !ns.is_empty() && !n.is_empty() => (ns, n),
            _ => continue,
        };

        let type_name = format!("{}/{}", namespace, name);
        if let Some(meta) = load_meta(&path, &type_name) {
            entries.push(meta);
        }
    }
    Ok(())
}

/// Loads one meta file; a malformed file drops only that type.
fn load_meta(path: &Path, type_name: &str) -> Option<TypeMeta> {
    let content = fs::read_to_string(path).ok()?;

    let mut value: Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            Logger::warn(
                "type_meta_skipped",
                &[
                    ("path", &path.display().to_string()),
                    ("reason", &e.to_string()),
                    ("type", type_name),
                ],
            );
            return None;
        }
    };

    if let Some(map) = value.as_object_mut() {
        map.entry("name".to_string())
            .or_insert_with(|| Value::String(type_name.to_string()));
    }

    match serde_json::from_value(value) {
        Ok(meta) => Some(meta),
        Err(e) => {
            Logger::warn(
                "type_meta_skipped",
                &[
                    ("path", &path.display().to_string()),
                    ("reason", &e.to_string()),
                    ("type", type_name),
                ],
            );
            None
        }
    }
}

fn read_dir(path: &Path) -> SchemaResult<Vec<fs::DirEntry>> {
    let entries = fs::read_dir(path)
        .map_err(|e| SchemaError::io(format!("Failed to read '{}': {}", path.display(), e)))?;
    entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SchemaError::io(format!("Failed to read '{}': {}", path.display(), e)))
}

/// Shallow-merges one level into the accumulator: later levels win on
/// top-level key collisions, except `attributes`, whose entries are
/// merged individually so a later level never wholesale-replaces the map.
fn merge_level(merged: &mut Map<String, Value>, layer: Value) {
    let layer = match layer {
        Value::Object(map) => map,
        _ => return,
    };

    for (key, value) in layer {
        if key == "attributes" {
            let target = merged
                .entry("attributes")
                .or_insert_with(|| Value::Object(Map::new()));
            if let (Some(target_map), Value::Object(incoming)) = (target.as_object_mut(), value) {
                for (attr, body) in incoming {
                    target_map.insert(attr, body);
                }
            }
        } else {
            merged.insert(key, value);
        }
    }
}

fn json_brief(value: &Value) -> &'static str {
    super::types::json_kind_name(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(path: &Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn fixture() -> (TempDir, SchemaStore) {
        let tmp = TempDir::new().unwrap();
        let schemas = tmp.path().join("schemas");
        let defs = tmp.path().join("definitions");
        fs::create_dir_all(&defs).unwrap();

        write(
            &schemas.join("craft/heading/meta.json"),
            &json!({
                "title": "Heading",
                "category": "text",
                "complexity": "basic",
                "useCases": ["landing-page"]
            }),
        );
        write(
            &schemas.join("craft/heading/core.json"),
            &json!({
                "attributes": {
                    "title": {"type": "string", "required": true},
                    "level": {"type": "integer", "minimum": 1, "maximum": 6}
                }
            }),
        );
        write(
            &schemas.join("craft/heading/styling.json"),
            &json!({
                "attributes": {
                    "align": {"type": "string", "enum": ["left", "center", "right"]},
                    "typography": {"$ref": "typography"}
                }
            }),
        );
        // Legacy flat layout type
        write(
            &schemas.join("core-quote-meta.json"),
            &json!({"title": "Quote", "category": "text"}),
        );
        fs::write(
            defs.join("typography.json"),
            r#"{"type": "object", "description": "shared typography shape"}"#,
        )
        .unwrap();

        let store = SchemaStore::open(&schemas, &defs).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_catalog_built_from_meta_only() {
        let (_tmp, store) = fixture();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.catalog().len(), 2);
        assert!(snapshot.catalog().contains("craft/heading"));
        assert!(snapshot.catalog().contains("core/quote"));
    }

    #[test]
    fn test_unknown_type_is_none() {
        let (_tmp, store) = fixture();
        let snapshot = store.snapshot();
        let schema = snapshot
            .block_schema("craft/missing", &[SchemaLevel::Core], true)
            .unwrap();
        assert!(schema.is_none());
    }

    #[test]
    fn test_staged_merge_is_superset() {
        let (_tmp, store) = fixture();
        let snapshot = store.snapshot();

        let core = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Core], true)
            .unwrap()
            .unwrap();
        let both = snapshot
            .block_schema(
                "craft/heading",
                &[SchemaLevel::Core, SchemaLevel::Styling],
                true,
            )
            .unwrap()
            .unwrap();

        for attr in core.attributes.keys() {
            assert!(both.attributes.contains_key(attr), "lost attribute {}", attr);
        }
        assert!(both.attributes.len() > core.attributes.len());
    }

    #[test]
    fn test_missing_level_silently_skipped() {
        let (_tmp, store) = fixture();
        let snapshot = store.snapshot();

        // craft/heading has no full.json and no styling-only gaps; core/quote
        // has only meta - requesting core+styling yields an empty attribute map
        let schema = snapshot
            .block_schema("core/quote", &[SchemaLevel::Core, SchemaLevel::Styling], true)
            .unwrap()
            .unwrap();
        assert!(schema.attributes.is_empty());
    }

    #[test]
    fn test_full_merges_all_levels_when_no_full_file() {
        let (_tmp, store) = fixture();
        let snapshot = store.snapshot();

        let full = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Full], true)
            .unwrap()
            .unwrap();
        assert_eq!(full.title.as_deref(), Some("Heading"));
        assert!(full.attributes.contains_key("title"));
        assert!(full.attributes.contains_key("align"));
    }

    #[test]
    fn test_full_result_cached_staged_not() {
        let (tmp, store) = fixture();
        let snapshot = store.snapshot();

        let before = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Full], true)
            .unwrap()
            .unwrap();

        // Change the file on disk after the full load
        write(
            &tmp.path().join("schemas/craft/heading/core.json"),
            &json!({"attributes": {"title": {"type": "string"}, "subtitle": {"type": "string"}}}),
        );

        let cached = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Full], true)
            .unwrap()
            .unwrap();
        assert_eq!(before.attributes.len(), cached.attributes.len());

        // Staged loads re-read the file and see the new attribute
        let staged = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Core], true)
            .unwrap()
            .unwrap();
        assert!(staged.attributes.contains_key("subtitle"));
    }

    #[test]
    fn test_refs_resolved_unless_disabled() {
        let (_tmp, store) = fixture();
        let snapshot = store.snapshot();

        let resolved = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Styling], true)
            .unwrap()
            .unwrap();
        let typography = resolved.attributes.get("typography").unwrap();
        assert_eq!(
            typography.description.as_deref(),
            Some("shared typography shape")
        );

        let raw = snapshot
            .block_schema("craft/heading", &[SchemaLevel::Styling], false)
            .unwrap()
            .unwrap();
        assert!(raw.attributes.get("typography").unwrap().description.is_none());
    }

    #[test]
    fn test_malformed_level_aborts_only_that_type() {
        let (tmp, store) = fixture();
        fs::write(tmp.path().join("schemas/craft/heading/core.json"), "{bad").unwrap();
        let snapshot = store.snapshot();

        let result = snapshot.block_schema("craft/heading", &[SchemaLevel::Core], true);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code().code(),
            "SMITH_SCHEMA_MALFORMED"
        );

        // Other types still load
        assert!(snapshot
            .block_schema("core/quote", &[SchemaLevel::Meta], true)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_reload_snapshot_isolation() {
        let (tmp, store) = fixture();
        let old = store.snapshot();
        assert_eq!(old.catalog().len(), 2);

        write(
            &tmp.path().join("schemas/craft/button/meta.json"),
            &json!({"title": "Button", "category": "interactive"}),
        );
        store.reload().unwrap();

        // The handle taken before reload still serves the old catalog
        assert_eq!(old.catalog().len(), 2);
        assert_eq!(store.snapshot().catalog().len(), 3);
    }

    #[test]
    fn test_malformed_meta_skips_type() {
        let tmp = TempDir::new().unwrap();
        let schemas = tmp.path().join("schemas");
        write(&schemas.join("craft/ok/meta.json"), &json!({"title": "Ok"}));
        fs::create_dir_all(schemas.join("craft/broken")).unwrap();
        fs::write(schemas.join("craft/broken/meta.json"), "{bad").unwrap();

        let store = SchemaStore::open(&schemas, &tmp.path().join("defs")).unwrap();
        let snapshot = store.snapshot();
        assert!(snapshot.catalog().contains("craft/ok"));
        assert!(!snapshot.catalog().contains("craft/broken"));
    }
}
