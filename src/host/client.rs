//! HTTP client for the host REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::HostConfig;
use crate::observability::Logger;

use super::backoff::RetryPolicy;
use super::binding;
use super::errors::{HostError, HostResult};
use super::types::{DocumentMetadata, HostDocument, SearchHit};

/// The document operations the tool layer depends on.
///
/// A trait seam so handler tests run against an in-memory host.
#[async_trait]
pub trait HostApi: Send + Sync {
    async fn get_document(&self, id: u64) -> HostResult<HostDocument>;

    /// Creates a document. Always submitted as a draft; publication is a
    /// human decision taken on the host.
    async fn create_document(
        &self,
        tree: &Value,
        metadata: &DocumentMetadata,
    ) -> HostResult<HostDocument>;

    /// Updates a document. Always asks the host to retain the prior
    /// revision.
    async fn update_document(
        &self,
        id: u64,
        tree: &Value,
        metadata: &DocumentMetadata,
    ) -> HostResult<HostDocument>;

    async fn search_documents(
        &self,
        query: &str,
        type_filter: Option<&str>,
        limit: usize,
    ) -> HostResult<Vec<SearchHit>>;
}

/// Production client speaking JSON over HTTP with bearer auth and
/// bounded exponential-backoff retries.
pub struct HttpHostClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
    retry: RetryPolicy,
}

impl HttpHostClient {
    pub fn new(config: &HostConfig) -> HostResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            retry: RetryPolicy::new(
                config.max_retries,
                Duration::from_millis(config.backoff_base_ms),
            ),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request, retrying transient failures per the policy.
    async fn send<T, F>(&self, label: &str, build: F) -> HostResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            let result = self.send_once(build()).await;
            match result {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retry.max_retries && self.retry.retryable(&err) => {
                    attempt += 1;
                    let delay = self.retry.delay(attempt);
                    Logger::warn(
                        "host_retry",
                        &[
                            ("attempt", &attempt.to_string()),
                            ("delay_ms", &delay.as_millis().to_string()),
                            ("error", &err.to_string()),
                            ("operation", label),
                        ],
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, request: RequestBuilder) -> HostResult<T> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            let id = extract_document_id(&body).unwrap_or(0);
            return Err(HostError::NotFound(id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HostError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| HostError::Decode(e.to_string()))
    }
}

fn extract_document_id(body: &str) -> Option<u64> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed.get("id").and_then(Value::as_u64)
}

#[async_trait]
impl HostApi for HttpHostClient {
    async fn get_document(&self, id: u64) -> HostResult<HostDocument> {
        let url = self.url(&format!("/documents/{}", id));
        self.send("get_document", || self.http.get(&url))
            .await
            .map_err(|err| match err {
                HostError::NotFound(_) => HostError::NotFound(id),
                other => other,
            })
    }

    async fn create_document(
        &self,
        tree: &Value,
        metadata: &DocumentMetadata,
    ) -> HostResult<HostDocument> {
        let url = self.url("/documents");
        let payload = json!({
            "blocks": tree,
            "title": metadata.title,
            "slug": metadata.slug,
            "status": "draft",
        });
        let created: HostDocument = self
            .send("create_document", || self.http.post(&url).json(&payload))
            .await?;

        // Bind identifiers to the freshly assigned record and push the
        // bound tree back, same as the host does on its own storage path.
        let bound = binding::finalize_tree(tree, created.id);
        if bound != *tree {
            return self.update_document(created.id, &bound, metadata).await;
        }
        Ok(created)
    }

    async fn update_document(
        &self,
        id: u64,
        tree: &Value,
        metadata: &DocumentMetadata,
    ) -> HostResult<HostDocument> {
        let url = self.url(&format!("/documents/{}", id));
        let bound = binding::finalize_tree(tree, id);
        let payload = json!({
            "blocks": bound,
            "title": metadata.title,
            "slug": metadata.slug,
            "status": metadata.status,
            "retainRevision": true,
        });
        self.send("update_document", || self.http.put(&url).json(&payload))
            .await
            .map_err(|err| match err {
                HostError::NotFound(_) => HostError::NotFound(id),
                other => other,
            })
    }

    async fn search_documents(
        &self,
        query: &str,
        type_filter: Option<&str>,
        limit: usize,
    ) -> HostResult<Vec<SearchHit>> {
        let url = self.url("/documents/search");
        let mut params = vec![
            ("query".to_string(), query.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        if let Some(type_name) = type_filter {
            params.push(("type".to_string(), type_name.to_string()));
        }
        self.send("search_documents", || self.http.get(&url).query(&params))
            .await
    }
}
