//! Tool API request types
//!
//! JSON request parsing for all supported operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{Complexity, SchemaLevel};

use super::errors::{ApiError, ApiResult};

/// Schema browse request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRequest {
    pub type_name: String,
    pub levels: Vec<SchemaLevel>,
    pub resolve_refs: bool,
}

/// Create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub blocks: Value,
    pub title: Option<String>,
    pub slug: Option<String>,
}

/// One targeted edit operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum EditOperation {
    /// Merge attributes into the block with the given identifier
    Modify {
        #[serde(rename = "blockId")]
        block_id: String,
        attrs: Value,
    },
    /// Insert a block at a root position (appended when out of range)
    Insert { position: usize, block: Value },
    /// Remove the block with the given identifier
    Remove {
        #[serde(rename = "blockId")]
        block_id: String,
    },
}

/// Edit request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    pub id: u64,
    pub operations: Vec<EditOperation>,
}

/// Search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub type_filter: Option<String>,
    pub limit: usize,
}

/// Unified request envelope
#[derive(Debug, Clone)]
pub enum Request {
    Catalog,
    Categories {
        category: Option<String>,
        complexity: Option<Complexity>,
    },
    UseCases,
    Schema(SchemaRequest),
    Definitions { name: Option<String> },
    Validate { blocks: Value },
    Fix { blocks: Value },
    Create(CreateRequest),
    Analyze { id: u64 },
    Edit(EditRequest),
    Search(SearchRequest),
    Reload,
}

/// Raw request for parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRequest {
    op: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    complexity: Option<String>,
    #[serde(rename = "type", default)]
    type_name: Option<String>,
    #[serde(default)]
    levels: Option<Vec<String>>,
    #[serde(rename = "resolveRefs", default)]
    resolve_refs: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    blocks: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    operations: Option<Vec<EditOperation>>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

impl Request {
    /// Parse a request from a JSON string
    pub fn parse(json: &str) -> ApiResult<Self> {
        let raw: RawRequest = serde_json::from_str(json)
            .map_err(|e| ApiError::invalid_request(format!("Invalid JSON: {}", e)))?;

        match raw.op.as_str() {
            "catalog" => Ok(Request::Catalog),
            "categories" => {
                let complexity = match raw.complexity {
                    Some(name) => Some(Complexity::parse(&name).ok_or_else(|| {
                        ApiError::invalid_request(format!("Unknown complexity tier: {}", name))
                    })?),
                    None => None,
                };
                Ok(Request::Categories {
                    category: raw.category,
                    complexity,
                })
            }
            "use_cases" => Ok(Request::UseCases),
            "schema" => {
                let type_name = raw
                    .type_name
                    .ok_or_else(|| ApiError::invalid_request("Missing type"))?;
                let levels = match raw.levels {
                    Some(names) if !names.is_empty() => names
                        .iter()
                        .map(|n| {
                            SchemaLevel::parse(n).map_err(ApiError::from_schema_error)
                        })
                        .collect::<ApiResult<Vec<_>>>()?,
                    _ => vec![SchemaLevel::Full],
                };
                Ok(Request::Schema(SchemaRequest {
                    type_name,
                    levels,
                    resolve_refs: raw.resolve_refs.unwrap_or(true),
                }))
            }
            "definitions" => Ok(Request::Definitions { name: raw.name }),
            "validate" => {
                let blocks = raw
                    .blocks
                    .ok_or_else(|| ApiError::invalid_request("Missing blocks"))?;
                Ok(Request::Validate { blocks })
            }
            "fix" => {
                let blocks = raw
                    .blocks
                    .ok_or_else(|| ApiError::invalid_request("Missing blocks"))?;
                Ok(Request::Fix { blocks })
            }
            "create" => {
                let blocks = raw
                    .blocks
                    .ok_or_else(|| ApiError::invalid_request("Missing blocks"))?;
                Ok(Request::Create(CreateRequest {
                    blocks,
                    title: raw.title,
                    slug: raw.slug,
                }))
            }
            "analyze" => {
                let id = raw
                    .id
                    .ok_or_else(|| ApiError::invalid_request("Missing id"))?;
                Ok(Request::Analyze { id })
            }
            "edit" => {
                let id = raw
                    .id
                    .ok_or_else(|| ApiError::invalid_request("Missing id"))?;
                let operations = raw
                    .operations
                    .ok_or_else(|| ApiError::invalid_request("Missing operations"))?;
                if operations.is_empty() {
                    return Err(ApiError::invalid_request("Empty operations list"));
                }
                Ok(Request::Edit(EditRequest { id, operations }))
            }
            "search" => {
                let query = raw
                    .query
                    .ok_or_else(|| ApiError::invalid_request("Missing query"))?;
                Ok(Request::Search(SearchRequest {
                    query,
                    type_filter: raw.type_name,
                    limit: raw.limit.unwrap_or(10),
                }))
            }
            "reload" => Ok(Request::Reload),
            op => Err(ApiError::unknown_operation(op)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defaults() {
        let request = Request::parse(r#"{"op": "schema", "type": "craft/heading"}"#).unwrap();
        match request {
            Request::Schema(r) => {
                assert_eq!(r.levels, vec![SchemaLevel::Full]);
                assert!(r.resolve_refs);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_schema_levels_parsed() {
        let request = Request::parse(
            r#"{"op": "schema", "type": "craft/heading", "levels": ["core", "styling"], "resolveRefs": false}"#,
        )
        .unwrap();
        match request {
            Request::Schema(r) => {
                assert_eq!(r.levels, vec![SchemaLevel::Core, SchemaLevel::Styling]);
                assert!(!r.resolve_refs);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = Request::parse(
            r#"{"op": "schema", "type": "craft/heading", "levels": ["everything"]}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), "SMITH_UNKNOWN_LEVEL");
    }

    #[test]
    fn test_complexity_tier_parsed() {
        let request =
            Request::parse(r#"{"op": "categories", "complexity": "intermediate"}"#).unwrap();
        match request {
            Request::Categories { complexity, .. } => {
                assert_eq!(complexity, Some(Complexity::Intermediate));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_complexity_tier_rejected() {
        let err =
            Request::parse(r#"{"op": "categories", "complexity": "wizard"}"#).unwrap_err();
        assert_eq!(err.code(), "SMITH_INVALID_REQUEST");
    }

    #[test]
    fn test_unknown_operation() {
        let err = Request::parse(r#"{"op": "drop_table"}"#).unwrap_err();
        assert_eq!(err.code(), "SMITH_UNKNOWN_OPERATION");
    }

    #[test]
    fn test_edit_operations_tagged() {
        let request = Request::parse(
            r#"{
                "op": "edit",
                "id": 42,
                "operations": [
                    {"op": "modify", "blockId": "ab12_42", "attrs": {"title": "New"}},
                    {"op": "insert", "position": 0, "block": {"type": "craft/heading", "attrs": {}}},
                    {"op": "remove", "blockId": "ff00_42"}
                ]
            }"#,
        )
        .unwrap();
        match request {
            Request::Edit(r) => {
                assert_eq!(r.id, 42);
                assert_eq!(r.operations.len(), 3);
                assert!(matches!(r.operations[0], EditOperation::Modify { .. }));
                assert!(matches!(r.operations[2], EditOperation::Remove { .. }));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_empty_edit_rejected() {
        let err =
            Request::parse(r#"{"op": "edit", "id": 1, "operations": []}"#).unwrap_err();
        assert_eq!(err.code(), "SMITH_INVALID_REQUEST");
    }

    #[test]
    fn test_validate_requires_blocks() {
        let err = Request::parse(r#"{"op": "validate"}"#).unwrap_err();
        assert_eq!(err.code(), "SMITH_INVALID_REQUEST");
    }
}
