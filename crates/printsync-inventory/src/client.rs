// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inventory API client.
//
// `InventoryApi` is the seam the resolver and sync engine talk to.
// `HttpInventory` implements it over a Snipe-IT style REST API:
//
//   GET   /<resource>?limit=<n>&search=<text>   -> {"total": n, "rows": [...]}
//   POST  /<resource>                           -> {"status", "messages", "payload": {"id"}}
//   PATCH /hardware/<id>                        -> {"status", "messages", "payload"}
//
// Every request carries a bearer token and JSON Accept/Content-Type headers.
// Failures are logged with method, URL and response body, then returned as
// typed errors. Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use printsync_core::error::{PrintsyncError, Result};

use crate::models::{MutationResponse, Resource, Row, SearchPage};

/// Whole-request timeout for inventory calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Search, create and update against the asset inventory.
#[async_trait]
pub trait InventoryApi: Send + Sync + 'static {
    /// One page of rows, filtered by the server's free-text search.
    async fn search(
        &self,
        resource: Resource,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Row>>;

    /// Create an entity and return its id.
    async fn create(&self, resource: Resource, body: &Value) -> Result<u64>;

    /// Partially update an entity.
    async fn update(&self, resource: Resource, id: u64, body: &Value) -> Result<()>;
}

/// `InventoryApi` over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpInventory {
    client: Client,
    base_url: String,
}

impl HttpInventory {
    /// Build a client for `base_url` (e.g. `http://snipeit.local/api/v1`).
    pub fn new(base_url: &str, token: &str, accept_invalid_certs: bool) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| PrintsyncError::Config("API token contains invalid characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if accept_invalid_certs {
            warn!("TLS certificate verification disabled for the inventory API");
        }

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PrintsyncError::Config(format!("cannot build HTTP client: {e}")))?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        info!(base_url = %base_url, "inventory client ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute one request and decode the JSON body. An empty body decodes
    /// to `Value::Null`.
    #[instrument(skip(self, method, body, query), fields(method = %method))]
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!(%method, url = %url, "inventory request");

        let mut builder = self.client.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(%method, url = %url, error = %e, "inventory request failed");
            PrintsyncError::InventoryTransport {
                method: method.to_string(),
                url: url.clone(),
                detail: e.to_string(),
            }
        })?;

        let status = response.status();
        debug!(%method, url = %url, status = status.as_u16(), "inventory response");
        let text = response.text().await.map_err(|e| PrintsyncError::InventoryTransport {
            method: method.to_string(),
            url: url.clone(),
            detail: format!("reading body: {e}"),
        })?;

        if !status.is_success() {
            error!(%method, url = %url, status = status.as_u16(), body = %text, "inventory request failed");
            return Err(PrintsyncError::InventoryStatus {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            error!(%method, url = %url, body = %text, "inventory response is not JSON");
            PrintsyncError::InventoryDecode(format!("{method} {url}: {e}"))
        })
    }

    /// Send a mutation and require `status: "success"`.
    async fn mutate(&self, method: Method, endpoint: &str, body: &Value) -> Result<MutationResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let value = self.request(method.clone(), endpoint, Some(body), &[]).await?;
        let response: MutationResponse = serde_json::from_value(value.clone()).map_err(|e| {
            PrintsyncError::InventoryDecode(format!("{method} {url}: {e}: {value}"))
        })?;
        if !response.is_success() {
            let messages = response.message_text();
            error!(%method, url = %url, body = %value, "inventory rejected request");
            return Err(PrintsyncError::InventoryRejected {
                method: method.to_string(),
                url,
                messages,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl InventoryApi for HttpInventory {
    async fn search(
        &self,
        resource: Resource,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Row>> {
        let mut query = vec![("limit", limit.to_string())];
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        let value = self.request(Method::GET, resource.path(), None, &query).await?;

        // Some failures (bad token on older servers) come back as 200 with
        // an error status instead of rows.
        if value.get("rows").is_none() {
            if let Ok(response) = serde_json::from_value::<MutationResponse>(value.clone()) {
                if !response.is_success() {
                    return Err(PrintsyncError::InventoryRejected {
                        method: Method::GET.to_string(),
                        url: format!("{}/{}", self.base_url, resource.path()),
                        messages: response.message_text(),
                    });
                }
            }
        }

        let page: SearchPage = serde_json::from_value(value).map_err(|e| {
            PrintsyncError::InventoryDecode(format!("{} search: {e}", resource.kind()))
        })?;
        if let Some(total) = page.total {
            if total > page.rows.len() as u64 {
                warn!(
                    resource = %resource,
                    total,
                    returned = page.rows.len(),
                    "search result truncated to one page"
                );
            }
        }
        Ok(page.rows)
    }

    async fn create(&self, resource: Resource, body: &Value) -> Result<u64> {
        let response = self.mutate(Method::POST, resource.path(), body).await?;
        let id = response.created_id().ok_or_else(|| {
            PrintsyncError::InventoryDecode(format!("{} create returned no payload.id", resource.kind()))
        })?;
        info!(resource = %resource, id, "created");
        Ok(id)
    }

    async fn update(&self, resource: Resource, id: u64, body: &Value) -> Result<()> {
        let endpoint = format!("{}/{id}", resource.path());
        self.mutate(Method::PATCH, &endpoint, body).await?;
        info!(resource = %resource, id, "updated");
        Ok(())
    }
}
