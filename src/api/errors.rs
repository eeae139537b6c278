//! Tool API error types
//!
//! API errors are pass-through: they preserve the original error codes
//! from the subsystems (Schema, Definitions, Host) so an agent sees one
//! stable code space.

use std::fmt;

use serde_json::Value;

use crate::definitions::DefinitionError;
use crate::host::HostError;
use crate::schema::SchemaError;
use crate::validator::ValidationReport;

pub type ApiResult<T> = Result<T, ApiError>;

/// Tool-facing error with preserved subsystem code.
#[derive(Debug)]
pub struct ApiError {
    code: String,
    message: String,
    /// Structured payload for errors that carry one (validation reports)
    details: Option<Value>,
}

impl ApiError {
    /// Malformed request envelope.
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self {
            code: "SMITH_INVALID_REQUEST".to_string(),
            message: reason.into(),
            details: None,
        }
    }

    /// Unrecognized operation name.
    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self {
            code: "SMITH_UNKNOWN_OPERATION".to_string(),
            message: format!("Unknown operation: {}", op.into()),
            details: None,
        }
    }

    /// Category browsed that no catalog entry names.
    pub fn unknown_category(category: impl Into<String>) -> Self {
        Self {
            code: "SMITH_UNKNOWN_CATEGORY".to_string(),
            message: format!("Unknown category: {}", category.into()),
            details: None,
        }
    }

    /// Edit operation targeted an identifier absent from the tree.
    pub fn block_not_found(block_id: impl Into<String>) -> Self {
        Self {
            code: "SMITH_BLOCK_NOT_FOUND".to_string(),
            message: format!("No block with identifier '{}'", block_id.into()),
            details: None,
        }
    }

    /// Content operation requested without host settings configured.
    pub fn host_unconfigured() -> Self {
        Self {
            code: "SMITH_HOST_UNCONFIGURED".to_string(),
            message: "Operation requires host settings in the configuration".to_string(),
            details: None,
        }
    }

    /// Mutation refused because validation found errors. Carries the
    /// full report so the caller can repair and resubmit.
    pub fn validation_rejected(report: &ValidationReport) -> Self {
        Self {
            code: "SMITH_VALIDATION_REJECTED".to_string(),
            message: format!(
                "Tree rejected: {} error(s), {} warning(s)",
                report.errors.len(),
                report.warnings.len()
            ),
            details: serde_json::to_value(report).ok(),
        }
    }

    pub fn from_schema_error(err: SchemaError) -> Self {
        Self {
            code: err.code().code().to_string(),
            message: err.message().to_string(),
            details: None,
        }
    }

    pub fn from_definition_error(err: DefinitionError) -> Self {
        Self {
            code: err.code().code().to_string(),
            message: err.message().to_string(),
            details: None,
        }
    }

    pub fn from_host_error(err: HostError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::from_schema_error(err)
    }
}

impl From<DefinitionError> for ApiError {
    fn from(err: DefinitionError) -> Self {
        ApiError::from_definition_error(err)
    }
}

impl From<HostError> for ApiError {
    fn from(err: HostError) -> Self {
        ApiError::from_host_error(err)
    }
}
