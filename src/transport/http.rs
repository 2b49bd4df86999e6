// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! reqwest-backed transport for the Dialpad contacts API.
//!
//! Built once at program start and passed by reference; the bearer
//! credential is baked into the client's default headers.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, instrument};

use super::traits::{ApiResponse, Transport};
use crate::config::SyncConfig;
use crate::contact::{CreatePayload, ReplacePayload, Scope};
use crate::error::SyncError;

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
}

impl HttpTransport {
    /// Fails with [`SyncError::Config`] when no credential is configured.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let api_key = config.require_api_key()?;

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| SyncError::Config(format!("API key is not a valid header value: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(SyncError::network)?;

        Ok(Self::with_client(client, config.api_base.clone()))
    }

    /// Use a preconfigured client (headers and timeouts are the caller's).
    #[must_use]
    pub fn with_client(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn contacts_url(&self) -> String {
        format!("{}/contacts", self.api_base)
    }

    async fn into_api_response(response: Response) -> Result<ApiResponse, SyncError> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(SyncError::network)?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(&bytes) {
                Ok(body) => body,
                // error pages from proxies are often HTML; keep the text for diagnostics
                Err(_) if !(200..300).contains(&status) => {
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                }
                Err(e) => return Err(SyncError::decode(e)),
            }
        };
        debug!(status, "directory response");
        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self))]
    async fn list_page(
        &self,
        scope: Scope<'_>,
        cursor: &str,
        limit: usize,
    ) -> Result<ApiResponse, SyncError> {
        let mut query = vec![("limit", limit.to_string()), ("cursor", cursor.to_string())];
        if let Some(owner_id) = scope.owner_id() {
            query.push(("owner_id", owner_id.to_string()));
        }
        let response = self
            .client
            .get(self.contacts_url())
            .query(&query)
            .send()
            .await
            .map_err(SyncError::network)?;
        Self::into_api_response(response).await
    }

    #[instrument(level = "debug", skip(self, payload))]
    async fn create(&self, payload: &CreatePayload) -> Result<ApiResponse, SyncError> {
        let response = self
            .client
            .post(self.contacts_url())
            .json(payload)
            .send()
            .await
            .map_err(SyncError::network)?;
        Self::into_api_response(response).await
    }

    #[instrument(level = "debug", skip(self, payload), fields(uid = payload.external_id()))]
    async fn replace(&self, payload: &ReplacePayload) -> Result<ApiResponse, SyncError> {
        let response = self
            .client
            .put(self.contacts_url())
            .json(payload)
            .send()
            .await
            .map_err(SyncError::network)?;
        Self::into_api_response(response).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete(&self, server_id: &str) -> Result<ApiResponse, SyncError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.contacts_url(), server_id))
            .send()
            .await
            .map_err(SyncError::network)?;
        Self::into_api_response(response).await
    }
}
