//! Host platform collaborator
//!
//! The engine itself never persists anything; documents live in an
//! external CMS reached over REST. `HostApi` is the seam the tool layer
//! depends on, `HttpHostClient` the production implementation, and
//! `binding` the host-side stage that stamps record-bound identifiers
//! onto a stored tree.

pub mod backoff;
pub mod binding;
mod client;
mod errors;
mod types;

pub use client::{HostApi, HttpHostClient};
pub use errors::{HostError, HostResult};
pub use types::{DocumentMetadata, HostDocument, SearchHit};
