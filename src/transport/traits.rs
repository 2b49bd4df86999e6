// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde_json::Value;

use crate::contact::{Contact, CreatePayload, ReplacePayload, Scope};
use crate::error::SyncError;

/// A decoded response from the directory API.
///
/// Transports hand back every status as data; deciding whether it is usable,
/// retryable or fatal is the rate limiter's job.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// A `400 {message, errors}` error body in the service's convention.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            400,
            serde_json::json!({ "message": message.into(), "errors": [] }),
        )
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.body.get("message").and_then(Value::as_str).unwrap_or("")
    }

    #[must_use]
    pub fn errors(&self) -> &Value {
        self.body.get("errors").unwrap_or(&Value::Null)
    }

    /// 400 whose message mentions "rate" (any case).
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status == 400 && self.message().to_lowercase().contains("rate")
    }

    /// Surface a non-success response as an error.
    #[must_use]
    pub fn into_http_error(self) -> SyncError {
        let message = match self.message() {
            "" => format!("request failed with status {}", self.status),
            m => m.to_string(),
        };
        SyncError::Http {
            status: self.status,
            message,
            body: self.body,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Contact>,
    pub cursor: String,
}

impl Page {
    /// Decode `{items: [...], cursor}`; missing keys mean an empty final page.
    pub fn from_body(body: Value) -> Result<Self, SyncError> {
        let Value::Object(mut map) = body else {
            return Err(SyncError::decode("list response is not an object"));
        };
        let items = match map.remove("items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(Contact::from_value)
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(SyncError::decode(format!("items is not a list: {}", other)))
            }
        };
        let cursor = map
            .get("cursor")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Ok(Self { items, cursor })
    }
}

/// The four primitive operations against the remote contact resource.
///
/// Each issues exactly one request. Implementations must not pace or retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET /contacts?limit&cursor[&owner_id]`
    async fn list_page(
        &self,
        scope: Scope<'_>,
        cursor: &str,
        limit: usize,
    ) -> Result<ApiResponse, SyncError>;

    /// `POST /contacts`
    async fn create(&self, payload: &CreatePayload) -> Result<ApiResponse, SyncError>;

    /// `PUT /contacts`
    async fn replace(&self, payload: &ReplacePayload) -> Result<ApiResponse, SyncError>;

    /// `DELETE /contacts/{id}`
    async fn delete(&self, server_id: &str) -> Result<ApiResponse, SyncError>;
}
