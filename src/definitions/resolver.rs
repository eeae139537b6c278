//! Symbolic reference resolution
//!
//! Walks an arbitrary JSON value replacing `"$ref"` pointer objects with
//! the referenced definition body. Resolution is bounded and cycle-safe:
//! past the depth limit the original pointer is returned unresolved and
//! the event is logged. Degraded output is preferred to hard failure.

use serde_json::Value;

use crate::observability::Logger;

use super::store::DefinitionStore;

/// Key marking a symbolic pointer object.
pub const REF_KEY: &str = "$ref";

/// Maximum pointer-substitution depth before resolution degrades.
pub const MAX_REF_DEPTH: u32 = 10;

/// Pure resolver over an immutable definition store.
pub struct RefResolver<'a> {
    store: &'a DefinitionStore,
}

impl<'a> RefResolver<'a> {
    /// Creates a resolver backed by the given store.
    pub fn new(store: &'a DefinitionStore) -> Self {
        Self { store }
    }

    /// Resolves all pointers reachable from `value`.
    ///
    /// Depth counts pointer substitutions, not plain object nesting, so
    /// a pointer cycle terminates at `MAX_REF_DEPTH` with the offending
    /// pointer left in place.
    pub fn resolve(&self, value: &Value, depth: u32) -> Value {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(pointer)) = map.get(REF_KEY) {
                    if depth >= MAX_REF_DEPTH {
                        Logger::warn(
                            "ref_depth_exceeded",
                            &[("depth", &depth.to_string()), ("ref", pointer)],
                        );
                        return value.clone();
                    }

                    return match self.store.lookup(pointer) {
                        Some(body) => self.resolve(&body.clone(), depth + 1),
                        None => {
                            Logger::warn("ref_unresolved", &[("ref", pointer)]);
                            value.clone()
                        }
                    };
                }

                let resolved = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.resolve(v, depth)))
                    .collect();
                Value::Object(resolved)
            }
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.resolve(v, depth)).collect())
            }
            scalar => scalar.clone(),
        }
    }
}
