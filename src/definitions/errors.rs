//! Definition store error types
//!
//! Error codes:
//! - SMITH_DEFINITIONS_IO (load-time directory failure)
//! - SMITH_DEFINITION_NOT_FOUND (explicit browsing miss)
//!
//! Malformed individual definition files are skipped and logged rather
//! than failing the whole load; unresolved pointers degrade at resolve
//! time rather than erroring.

use std::fmt;

/// Definition-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionErrorCode {
    /// Definitions directory could not be read
    DefinitionsIo,
    /// Named definition does not exist (browsing paths only)
    DefinitionNotFound,
}

impl DefinitionErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DefinitionErrorCode::DefinitionsIo => "SMITH_DEFINITIONS_IO",
            DefinitionErrorCode::DefinitionNotFound => "SMITH_DEFINITION_NOT_FOUND",
        }
    }
}

impl fmt::Display for DefinitionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Definition error with context
#[derive(Debug)]
pub struct DefinitionError {
    code: DefinitionErrorCode,
    message: String,
}

impl DefinitionError {
    /// Create an I/O error for the definitions directory
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            code: DefinitionErrorCode::DefinitionsIo,
            message: message.into(),
        }
    }

    /// Create a not-found error for a named definition
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            code: DefinitionErrorCode::DefinitionNotFound,
            message: format!("Definition '{}' not found", name.into()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DefinitionErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for DefinitionError {}

/// Result type for definition operations
pub type DefinitionResult<T> = Result<T, DefinitionError>;
