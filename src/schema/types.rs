//! Block type schema definitions
//!
//! A `TypeSchema` declares the attribute shapes and editing metadata for
//! one block type. Schemas are loaded progressively in levels:
//! - meta: identity and discovery fields only
//! - core: content-bearing attributes
//! - styling: presentation attributes
//! - full: everything

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};

/// Named subset of a type schema supporting progressive loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaLevel {
    /// Identity and discovery fields only
    Meta,
    /// Content-bearing attributes
    Core,
    /// Presentation attributes
    Styling,
    /// Complete schema; short-circuits level merging
    Full,
}

impl SchemaLevel {
    /// Returns the level name used in file names and requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaLevel::Meta => "meta",
            SchemaLevel::Core => "core",
            SchemaLevel::Styling => "styling",
            SchemaLevel::Full => "full",
        }
    }

    /// Parses a level name from a request.
    pub fn parse(name: &str) -> SchemaResult<Self> {
        match name {
            "meta" => Ok(SchemaLevel::Meta),
            "core" => Ok(SchemaLevel::Core),
            "styling" => Ok(SchemaLevel::Styling),
            "full" => Ok(SchemaLevel::Full),
            other => Err(SchemaError::unknown_level(other)),
        }
    }
}

/// Declared kind of an attribute value.
///
/// A tagged union over the schema-declared kinds: generic type-of checks
/// misclassify arrays as objects, so arrays and objects are distinct
/// variants and checked explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Shape defined by a shared definition fragment
    Reference,
}

impl AttributeKind {
    /// Returns the kind name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Number => "number",
            AttributeKind::Integer => "integer",
            AttributeKind::Boolean => "boolean",
            AttributeKind::Array => "array",
            AttributeKind::Object => "object",
            AttributeKind::Reference => "reference",
        }
    }

    /// Checks whether a JSON value matches this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            AttributeKind::String => value.is_string(),
            AttributeKind::Number => value.is_number(),
            AttributeKind::Integer => value.is_i64() || value.is_u64(),
            AttributeKind::Boolean => value.is_boolean(),
            AttributeKind::Array => value.is_array(),
            // A resolved reference body is an object
            AttributeKind::Object | AttributeKind::Reference => value.is_object(),
        }
    }
}

/// Returns the JSON kind name of a value for error messages.
pub fn json_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared shape of one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Declared kind; absent when the level file leaves it open
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AttributeKind>,

    /// Whether the attribute must be present
    #[serde(default)]
    pub required: bool,

    /// Closed set of allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    /// Regex pattern for string values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Numeric lower bound (soft recommendation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    /// Numeric upper bound (soft recommendation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Minimum string length (soft recommendation)
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    /// Maximum string length (soft recommendation)
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Default value applied by the host editor, informational here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Human description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AttributeSchema {
    /// Create a required attribute of the given kind (test helper shape).
    pub fn required(kind: AttributeKind) -> Self {
        Self {
            required: true,
            ..Self::optional(kind)
        }
    }

    /// Create an optional attribute of the given kind.
    pub fn optional(kind: AttributeKind) -> Self {
        Self {
            kind: Some(kind),
            required: false,
            enum_values: None,
            pattern: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            default: None,
            description: None,
        }
    }
}

/// Complexity tier used for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

impl Complexity {
    /// Returns the tier name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Basic => "basic",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }

    /// Parses a tier name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(Complexity::Basic),
            "intermediate" => Some(Complexity::Intermediate),
            "advanced" => Some(Complexity::Advanced),
            _ => None,
        }
    }
}

/// Editing metadata: which attributes an agent may change freely and
/// which are dangerous to touch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingMeta {
    /// Attributes safe to change
    #[serde(default)]
    pub safe: Vec<String>,
    /// Attributes whose change can break layout or identity
    #[serde(default)]
    pub dangerous: Vec<String>,
}

/// Complete (or partially merged) schema for one block type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    /// Namespaced type name, e.g. "craft/heading"
    pub name: String,

    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Catalog category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Complexity tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,

    /// Use-case groups this type belongs to
    #[serde(rename = "useCases", default, skip_serializing_if = "Vec::is_empty")]
    pub use_cases: Vec<String>,

    /// Declared attributes
    #[serde(default)]
    pub attributes: HashMap<String, AttributeSchema>,

    /// Editing metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing: Option<EditingMeta>,
}
