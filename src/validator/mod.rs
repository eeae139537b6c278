//! Block tree validation and auto-fix
//!
//! The validator checks a content tree structurally (required fields,
//! identifier format, child shape) and, when type schemas are available,
//! against each type's declared attributes. Every finding carries a
//! stable dotted/indexed field path and machine-actionable fix guidance.
//! The validator never mutates its input; the auto-fix engine applies a
//! bounded set of safe rewrites on a copy.

mod aliases;
mod autofix;
mod report;
mod rules;

pub use aliases::{is_accepted_namespace, is_governed, suggest_type_name, GOVERNED_NAMESPACE};
pub use autofix::{auto_fix, ChangeLogEntry, FixOutcome};
pub use report::{
    ErrorKind, FixSuggestion, ValidationError, ValidationReport, ValidationWarning, WarningKind,
};
pub use rules::{validate, validate_with_schemas, SchemasByType};
