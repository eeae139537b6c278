//! Shared definition store and symbolic reference resolution
//!
//! Definitions are named, reusable attribute-shape fragments (typography,
//! border, color descriptors) loaded once at startup and referenced from
//! type schemas via `"$ref"` pointers.

mod errors;
mod resolver;
mod store;

pub use errors::{DefinitionError, DefinitionErrorCode, DefinitionResult};
pub use resolver::{RefResolver, MAX_REF_DEPTH, REF_KEY};
pub use store::DefinitionStore;
