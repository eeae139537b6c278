//! Observability for blocksmith
//!
//! Structured JSON logging only. The engine performs no metrics or
//! tracing of its own; any request-lifecycle timing belongs to the
//! external collaborator driving it.

mod logger;

pub use logger::{Logger, Severity};
