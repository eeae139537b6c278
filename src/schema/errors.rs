//! Schema subsystem error types
//!
//! Error codes:
//! - SMITH_UNKNOWN_TYPE (REJECT): browsing miss on an explicit lookup
//! - SMITH_UNKNOWN_LEVEL (REJECT): level name outside meta/core/styling/full
//! - SMITH_SCHEMA_MALFORMED (REJECT): one type's files are unparseable;
//!   aborts only that type's load
//! - SMITH_SCHEMA_IO (FATAL): schema tree unreadable at startup

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected; engine keeps running
    Reject,
    /// Engine cannot serve schemas at all
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Block type not found (explicit lookup paths only)
    UnknownType,
    /// Requested level name is not a known level
    UnknownLevel,
    /// A type's schema file is unreadable or unparseable
    SchemaMalformed,
    /// Schema tree unreadable at startup
    SchemaIo,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownType => "SMITH_UNKNOWN_TYPE",
            SchemaErrorCode::UnknownLevel => "SMITH_UNKNOWN_LEVEL",
            SchemaErrorCode::SchemaMalformed => "SMITH_SCHEMA_MALFORMED",
            SchemaErrorCode::SchemaIo => "SMITH_SCHEMA_IO",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::SchemaIo => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    type_name: Option<String>,
}

impl SchemaError {
    /// Create an unknown type error
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::UnknownType,
            message: format!("Block type '{}' not found", name),
            type_name: Some(name),
        }
    }

    /// Create an unknown level error
    pub fn unknown_level(level: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::UnknownLevel,
            message: format!(
                "Unknown schema level '{}' (expected meta, core, styling or full)",
                level.into()
            ),
            type_name: None,
        }
    }

    /// Create a malformed schema error for one type
    pub fn malformed(
        type_name: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        let name = type_name.into();
        Self {
            code: SchemaErrorCode::SchemaMalformed,
            message: format!(
                "Malformed schema for '{}' at '{}': {}",
                name,
                path.into(),
                reason.into()
            ),
            type_name: Some(name),
        }
    }

    /// Create a schema tree I/O error (FATAL)
    pub fn io(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaIo,
            message: reason.into(),
            type_name: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the block type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
