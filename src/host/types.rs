//! Wire types for the host REST collaborator

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata accompanying a create or update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Publication status; creation always submits "draft"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A document as the host returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDocument {
    pub id: u64,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// The block tree, in the same shape the engine validates
    #[serde(rename = "blocks", default)]
    pub tree: Value,

    #[serde(rename = "previewUrl", default)]
    pub preview_url: Option<String>,

    #[serde(rename = "editUrl", default)]
    pub edit_url: Option<String>,

    #[serde(rename = "revisionId", default)]
    pub revision_id: Option<u64>,
}

/// One result row from a document search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(rename = "editUrl", default)]
    pub edit_url: Option<String>,
}
