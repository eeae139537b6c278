//! Tool request handler
//!
//! Orchestrates the schema store, validator, formatter, and host client
//! behind the JSON envelope. Content mutations are gated: the tree is
//! validated against full schemas first, and a report with errors stops
//! the request before the host is ever contacted.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::formatter;
use crate::host::{DocumentMetadata, HostApi, HostDocument};
use crate::identity::BLOCK_ID_ATTR;
use crate::observability::Logger;
use crate::schema::{Complexity, SchemaLevel, SchemaStore};
use crate::validator::{self, SchemasByType, ValidationReport};

use super::errors::{ApiError, ApiResult};
use super::request::{CreateRequest, EditOperation, EditRequest, Request, SchemaRequest, SearchRequest};
use super::response::Response;

/// Handler owning the shared snapshot store and the optional host seam.
pub struct ToolHandler {
    store: Arc<SchemaStore>,
    host: Option<Arc<dyn HostApi>>,
}

impl ToolHandler {
    pub fn new(store: Arc<SchemaStore>, host: Option<Arc<dyn HostApi>>) -> Self {
        Self { store, host }
    }

    /// Handle a raw JSON request string.
    pub async fn handle(&self, json_request: &str) -> Response {
        let request = match Request::parse(json_request) {
            Ok(r) => r,
            Err(e) => return Response::error(&e),
        };

        let result = match request {
            Request::Catalog => self.handle_catalog(),
            Request::Categories {
                category,
                complexity,
            } => self.handle_categories(category, complexity),
            Request::UseCases => self.handle_use_cases(),
            Request::Schema(r) => self.handle_schema(r),
            Request::Definitions { name } => self.handle_definitions(name),
            Request::Validate { blocks } => self.handle_validate(&blocks),
            Request::Fix { blocks } => self.handle_fix(&blocks),
            Request::Create(r) => self.handle_create(r).await,
            Request::Analyze { id } => self.handle_analyze(id).await,
            Request::Edit(r) => self.handle_edit(r).await,
            Request::Search(r) => self.handle_search(r).await,
            Request::Reload => self.handle_reload(),
        };

        match result {
            Ok(data) => Response::success(data),
            Err(e) => Response::error(&e),
        }
    }

    fn handle_catalog(&self) -> ApiResult<Value> {
        let snapshot = self.store.snapshot();
        let summary = snapshot.catalog().summary();
        Ok(serde_json::to_value(summary)
            .map_err(|e| ApiError::invalid_request(e.to_string()))?)
    }

    fn handle_categories(
        &self,
        category: Option<String>,
        complexity: Option<Complexity>,
    ) -> ApiResult<Value> {
        let snapshot = self.store.snapshot();
        match (category, complexity) {
            (Some(category), tier) => {
                let mut types = snapshot.catalog().by_category(&category);
                if types.is_empty() {
                    return Err(ApiError::unknown_category(category));
                }
                if let Some(tier) = tier {
                    types.retain(|e| e.complexity == Some(tier));
                }
                Ok(json!({
                    "category": category,
                    "complexity": tier.map(|t| t.as_str()),
                    "types": types.into_iter().cloned().collect::<Vec<_>>(),
                }))
            }
            // Tier names are a closed set, so an empty result is a
            // legitimate empty list, not an unknown-filter error
            (None, Some(tier)) => {
                let types = snapshot.catalog().by_complexity(tier);
                Ok(json!({
                    "complexity": tier.as_str(),
                    "types": types.into_iter().cloned().collect::<Vec<_>>(),
                }))
            }
            (None, None) => Ok(json!({
                "categories": snapshot.catalog().summary().categories,
            })),
        }
    }

    fn handle_use_cases(&self) -> ApiResult<Value> {
        let snapshot = self.store.snapshot();
        let groups: Vec<Value> = snapshot
            .catalog()
            .use_case_groups()
            .into_iter()
            .map(|(use_case, types)| json!({"useCase": use_case, "types": types}))
            .collect();
        Ok(json!({"useCases": groups}))
    }

    fn handle_schema(&self, request: SchemaRequest) -> ApiResult<Value> {
        let snapshot = self.store.snapshot();
        let schema = snapshot
            .block_schema(&request.type_name, &request.levels, request.resolve_refs)
            .map_err(ApiError::from_schema_error)?
            .ok_or_else(|| {
                ApiError::from_schema_error(crate::schema::SchemaError::unknown_type(
                    &request.type_name,
                ))
            })?;
        Ok(serde_json::to_value(schema.as_ref())
            .map_err(|e| ApiError::invalid_request(e.to_string()))?)
    }

    fn handle_definitions(&self, name: Option<String>) -> ApiResult<Value> {
        let snapshot = self.store.snapshot();
        let definitions = snapshot.definitions();
        match name {
            Some(name) => {
                let body = definitions.lookup(&name).ok_or_else(|| {
                    ApiError::from_definition_error(
                        crate::definitions::DefinitionError::not_found(&name),
                    )
                })?;
                Ok(json!({"name": name, "definition": body}))
            }
            None => Ok(json!({
                "count": definitions.count(),
                "names": definitions.names(),
            })),
        }
    }

    fn handle_validate(&self, blocks: &Value) -> ApiResult<Value> {
        let report = self.validate_tree(blocks);
        Ok(json!({
            "valid": report.is_valid(),
            "errors": report.errors,
            "warnings": report.warnings,
        }))
    }

    fn handle_fix(&self, blocks: &Value) -> ApiResult<Value> {
        let outcome = validator::auto_fix(blocks);
        let report = self.validate_tree(&outcome.fixed);
        Ok(json!({
            "fixed": outcome.fixed,
            "changeLog": outcome.change_log,
            "valid": report.is_valid(),
            "errors": report.errors,
            "warnings": report.warnings,
        }))
    }

    async fn handle_create(&self, request: CreateRequest) -> ApiResult<Value> {
        let report = self.validate_tree(&request.blocks);
        if !report.is_valid() {
            return Err(ApiError::validation_rejected(&report));
        }

        let host = self.require_host()?;
        let formatted = formatter::format(&request.blocks);
        let metadata = DocumentMetadata {
            title: request.title,
            slug: request.slug,
            status: None,
        };
        let created = host.create_document(&formatted, &metadata).await?;
        Logger::info(
            "document_created",
            &[("id", &created.id.to_string())],
        );
        Ok(document_summary(&created, Some(&report)))
    }

    async fn handle_analyze(&self, id: u64) -> ApiResult<Value> {
        let host = self.require_host()?;
        let document = host.get_document(id).await?;
        let report = self.validate_tree(&document.tree);
        Ok(json!({
            "id": document.id,
            "title": document.title,
            "status": document.status,
            "blockCount": count_blocks(&document.tree),
            "blocks": document.tree,
            "valid": report.is_valid(),
            "errors": report.errors,
            "warnings": report.warnings,
        }))
    }

    async fn handle_edit(&self, request: EditRequest) -> ApiResult<Value> {
        let host = self.require_host()?;
        let document = host.get_document(request.id).await?;

        let mut tree = document.tree.clone();
        for operation in &request.operations {
            apply_operation(&mut tree, operation)?;
        }

        let report = self.validate_tree(&tree);
        if !report.is_valid() {
            return Err(ApiError::validation_rejected(&report));
        }

        let formatted = formatter::format(&tree);
        let metadata = DocumentMetadata {
            title: document.title.clone(),
            slug: None,
            status: document.status.clone(),
        };
        let updated = host
            .update_document(request.id, &formatted, &metadata)
            .await?;
        Logger::info(
            "document_updated",
            &[
                ("id", &updated.id.to_string()),
                ("operations", &request.operations.len().to_string()),
            ],
        );
        Ok(document_summary(&updated, Some(&report)))
    }

    async fn handle_search(&self, request: SearchRequest) -> ApiResult<Value> {
        let host = self.require_host()?;
        let hits = host
            .search_documents(&request.query, request.type_filter.as_deref(), request.limit)
            .await?;
        Ok(json!({"count": hits.len(), "results": hits}))
    }

    fn handle_reload(&self) -> ApiResult<Value> {
        self.store.reload().map_err(ApiError::from_schema_error)?;
        let snapshot = self.store.snapshot();
        Ok(json!({"reloaded": true, "knownTypes": snapshot.catalog().len()}))
    }

    fn require_host(&self) -> ApiResult<&Arc<dyn HostApi>> {
        self.host.as_ref().ok_or_else(ApiError::host_unconfigured)
    }

    /// Validates a tree against the full schemas of every known type it
    /// uses. A type the catalog does not know degrades to structural
    /// checks; a schema that fails to load is skipped and logged.
    fn validate_tree(&self, blocks: &Value) -> ValidationReport {
        let snapshot = self.store.snapshot();
        let mut type_names = BTreeSet::new();
        collect_type_names(blocks, &mut type_names);

        let mut schemas = SchemasByType::new();
        for type_name in type_names {
            match snapshot.block_schema(&type_name, &[SchemaLevel::Full], true) {
                Ok(Some(schema)) => {
                    schemas.insert(type_name, schema);
                }
                Ok(None) => {}
                Err(e) => {
                    Logger::warn(
                        "schema_load_failed",
                        &[("type", &type_name), ("error", &e.to_string())],
                    );
                }
            }
        }

        validator::validate_with_schemas(blocks, &schemas)
    }
}

fn collect_type_names(tree: &Value, names: &mut BTreeSet<String>) {
    let blocks = match tree.as_array() {
        Some(blocks) => blocks,
        None => return,
    };
    for block in blocks {
        if let Some(name) = block.get("type").and_then(Value::as_str) {
            names.insert(name.to_string());
        }
        if let Some(children) = block.get("innerBlocks") {
            collect_type_names(children, names);
        }
    }
}

fn count_blocks(tree: &Value) -> usize {
    match tree.as_array() {
        Some(blocks) => blocks
            .iter()
            .map(|b| 1 + b.get("innerBlocks").map(count_blocks).unwrap_or(0))
            .sum(),
        None => 0,
    }
}

fn document_summary(document: &HostDocument, report: Option<&ValidationReport>) -> Value {
    let mut summary = json!({
        "id": document.id,
        "title": document.title,
        "status": document.status,
        "previewUrl": document.preview_url,
        "editUrl": document.edit_url,
        "revisionId": document.revision_id,
    });
    if let (Some(report), Some(map)) = (report, summary.as_object_mut()) {
        map.insert("warnings".to_string(), json!(report.warnings));
    }
    summary
}

/// Applies one targeted edit operation to the tree in place.
fn apply_operation(tree: &mut Value, operation: &EditOperation) -> ApiResult<()> {
    match operation {
        EditOperation::Modify { block_id, attrs } => {
            let incoming = attrs
                .as_object()
                .ok_or_else(|| ApiError::invalid_request("modify attrs must be an object"))?;
            let block = find_block_mut(tree, block_id)
                .ok_or_else(|| ApiError::block_not_found(block_id))?;
            let target = block
                .as_object_mut()
                .and_then(|b| b.get_mut("attrs"))
                .and_then(Value::as_object_mut)
                .ok_or_else(|| ApiError::block_not_found(block_id))?;
            for (key, value) in incoming {
                target.insert(key.clone(), value.clone());
            }
            Ok(())
        }
        EditOperation::Insert { position, block } => {
            let blocks = tree
                .as_array_mut()
                .ok_or_else(|| ApiError::invalid_request("document tree is not a block array"))?;
            let index = (*position).min(blocks.len());
            blocks.insert(index, block.clone());
            Ok(())
        }
        EditOperation::Remove { block_id } => {
            if !remove_block(tree, block_id) {
                return Err(ApiError::block_not_found(block_id));
            }
            Ok(())
        }
    }
}

/// Finds a block anywhere in the tree by its identifier attribute.
fn find_block_mut<'a>(tree: &'a mut Value, block_id: &str) -> Option<&'a mut Value> {
    let blocks = tree.as_array_mut()?;
    for block in blocks.iter_mut() {
        if block_matches(block, block_id) {
            return Some(block);
        }
        if let Some(children) = block.get_mut("innerBlocks") {
            if let Some(found) = find_block_mut(children, block_id) {
                return Some(found);
            }
        }
    }
    None
}

fn block_matches(block: &Value, block_id: &str) -> bool {
    block
        .get("attrs")
        .and_then(|a| a.get(BLOCK_ID_ATTR))
        .and_then(Value::as_str)
        == Some(block_id)
}

/// Removes a block by identifier at any depth; returns whether one was
/// removed.
fn remove_block(tree: &mut Value, block_id: &str) -> bool {
    let blocks = match tree.as_array_mut() {
        Some(blocks) => blocks,
        None => return false,
    };

    if let Some(index) = blocks.iter().position(|b| block_matches(b, block_id)) {
        blocks.remove(index);
        return true;
    }

    for block in blocks.iter_mut() {
        if let Some(children) = block.get_mut("innerBlocks") {
            if remove_block(children, block_id) {
                return true;
            }
        }
    }
    false
}
