//! Validation report types
//!
//! A report collects every finding instead of short-circuiting on the
//! first one: errors block submission, warnings are soft guidance. Each
//! finding is addressed by a field path of the form
//! `blocks[i].attrs.<name>` or `blocks[i].innerBlocks[j]...` so an
//! autonomous caller can repair its own input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // Structural
    /// Tree entry is not a block object
    BlockNotObject,
    /// Type name absent
    MissingType,
    /// Type name does not match `<namespace>/<name>`
    MalformedTypeName,
    /// Attributes map absent or not an object
    AttrsNotObject,
    /// Children present but not an array
    ChildrenNotArray,
    // Identity
    /// Governed block without an identifier
    MissingIdentifier,
    /// Identifier does not match the base or suffixed pattern
    MalformedIdentifier,
    // Schema
    /// Declared required attribute absent
    MissingRequired,
    /// Value kind differs from the declared kind
    TypeMismatch,
    /// Value outside the declared enum
    EnumViolation,
    /// String value fails the declared pattern
    PatternViolation,
}

/// Warning classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Numeric value outside declared bounds (soft recommendation)
    NumericOutOfRange,
    /// String length outside declared bounds (soft recommendation)
    LengthOutOfRange,
    /// Attribute not declared by the schema
    UnknownAttribute,
    /// The same identifier appears on more than one block
    DuplicateIdentifiers,
}

/// Machine-actionable repair guidance attached to every error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixSuggestion {
    /// What to do, phrased for an autonomous caller
    pub action: String,
    /// The field path the action applies to
    pub path: String,
    /// Corrected value, where one can be derived deterministically
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<Value>,
}

/// One validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub kind: ErrorKind,
    pub message: String,
    pub fix: FixSuggestion,
}

/// One validation warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub kind: WarningKind,
    pub message: String,
}

/// Collected findings for one tree. Never holds the tree itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Returns whether the tree may be submitted.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error.
    pub fn error(
        &mut self,
        path: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
        fix: FixSuggestion,
    ) {
        self.errors.push(ValidationError {
            path: path.into(),
            kind,
            message: message.into(),
            fix,
        });
    }

    /// Adds a warning.
    pub fn warn(&mut self, path: impl Into<String>, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            kind,
            message: message.into(),
        });
    }

    /// Returns whether any error of the given kind was recorded.
    pub fn has_error(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

impl FixSuggestion {
    /// Guidance with a deterministic corrected value.
    pub fn replace(path: impl Into<String>, action: impl Into<String>, replacement: Value) -> Self {
        Self {
            action: action.into(),
            path: path.into(),
            replacement: Some(replacement),
        }
    }

    /// Guidance without a corrected value (content the caller must supply).
    pub fn manual(path: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            path: path.into(),
            replacement: None,
        }
    }
}
