//! Block type schemas: catalog, staged loading, reference resolution
//!
//! Schemas live in a file tree keyed by type name and are loaded
//! progressively by level (`meta`, `core`, `styling`, `full`). The
//! catalog is a browsing index built from `meta` files alone; full
//! schemas are loaded and cached on demand.

mod catalog;
mod errors;
mod loader;
mod types;

pub use catalog::{Catalog, CatalogSummary, CategorySummary, TypeMeta};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{SchemaSnapshot, SchemaStore};
pub use types::{
    json_kind_name, AttributeKind, AttributeSchema, Complexity, EditingMeta, SchemaLevel,
    TypeSchema,
};
