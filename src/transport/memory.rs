// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process stand-in for the directory service.
//!
//! Honours the same contract as the live API: cursor pagination that
//! respects `limit`, server-assigned ids, `PUT` upserting by `uid` within an
//! owner, and `400 {message}` error bodies. Faults can be scripted per key
//! (the `uid` for writes, the server id for deletes) and every call is
//! recorded for assertions.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::traits::{ApiResponse, Transport};
use crate::contact::{Contact, CreatePayload, ReplacePayload, Scope, OWNER_SCOPE, SERVER_ID};
use crate::error::SyncError;

/// A request as seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    ListPage {
        owner_id: Option<String>,
        cursor: String,
        limit: usize,
    },
    Create { uid: Option<String> },
    Replace { uid: String },
    Delete { id: String },
}

#[derive(Default)]
struct DirectoryState {
    contacts: BTreeMap<u64, Contact>,
    next_id: u64,
    /// key -> remaining rate-limit responses
    rate_limits: HashMap<String, usize>,
    /// key -> permanent failure response
    failures: HashMap<String, ApiResponse>,
    /// remaining rate-limit responses for list calls
    list_rate_limits: usize,
    calls: Vec<RecordedCall>,
}

impl DirectoryState {
    fn scripted_fault(&mut self, key: Option<&str>) -> Option<ApiResponse> {
        let key = key?;
        if let Some(response) = self.failures.get(key) {
            return Some(response.clone());
        }
        match self.rate_limits.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Some(rate_limited())
            }
            _ => None,
        }
    }

    fn in_scope<'a>(&'a self, owner_id: Option<&'a str>) -> impl Iterator<Item = &'a Contact> + 'a {
        self.contacts
            .values()
            .filter(move |c| c.owner_scope() == owner_id)
    }

    fn insert(&mut self, mut contact: Contact) -> Contact {
        self.next_id += 1;
        let id = self.next_id;
        contact.set(SERVER_ID, id);
        self.contacts.insert(id, contact.clone());
        contact
    }
}

fn rate_limited() -> ApiResponse {
    ApiResponse::bad_request("Rate limit exceeded, please slow down")
}

pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
    terminal_cursor: bool,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DirectoryState::default()),
            terminal_cursor: false,
        }
    }

    /// Keep returning a non-empty cursor on the last page, so callers must
    /// stop on the short page alone.
    #[must_use]
    pub fn with_terminal_cursor(mut self) -> Self {
        self.terminal_cursor = true;
        self
    }

    /// Insert records directly, assigning server ids. Returns the stored copies.
    pub fn seed(&self, contacts: impl IntoIterator<Item = Contact>) -> Vec<Contact> {
        let mut state = self.state.lock();
        contacts
            .into_iter()
            .map(|mut c| {
                c.remove(SERVER_ID);
                state.insert(c)
            })
            .collect()
    }

    /// Answer the next `times` writes for `key` with a rate-limit response.
    pub fn rate_limit(&self, key: &str, times: usize) {
        self.state.lock().rate_limits.insert(key.to_string(), times);
    }

    /// Answer the next `times` list calls with a rate-limit response.
    pub fn rate_limit_pages(&self, times: usize) {
        self.state.lock().list_rate_limits = times;
    }

    /// Always fail calls for `key` with `status`.
    pub fn fail(&self, key: &str, status: u16, message: &str) {
        self.state.lock().failures.insert(
            key.to_string(),
            ApiResponse::new(status, json!({ "message": message, "errors": [] })),
        );
    }

    /// Current records in a scope, in server order.
    #[must_use]
    pub fn inventory(&self, scope: Scope<'_>) -> Vec<Contact> {
        self.state.lock().in_scope(scope.owner_id()).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().contacts.is_empty()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&RecordedCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_cursor(cursor: &str) -> Option<usize> {
    if cursor.is_empty() {
        return Some(0);
    }
    cursor.strip_prefix("offset:")?.parse().ok()
}

#[async_trait]
impl Transport for InMemoryDirectory {
    async fn list_page(
        &self,
        scope: Scope<'_>,
        cursor: &str,
        limit: usize,
    ) -> Result<ApiResponse, SyncError> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::ListPage {
            owner_id: scope.owner_id().map(str::to_string),
            cursor: cursor.to_string(),
            limit,
        });
        if state.list_rate_limits > 0 {
            state.list_rate_limits -= 1;
            return Ok(rate_limited());
        }
        let Some(offset) = parse_cursor(cursor) else {
            return Ok(ApiResponse::bad_request(format!("invalid cursor: {}", cursor)));
        };

        let matching: Vec<Value> = state
            .in_scope(scope.owner_id())
            .skip(offset)
            .take(limit)
            .map(|c| c.clone().into_value())
            .collect();
        let end = offset + matching.len();
        let remaining = state.in_scope(scope.owner_id()).count() > end;
        let next = if remaining || self.terminal_cursor {
            format!("offset:{}", end)
        } else {
            String::new()
        };
        Ok(ApiResponse::ok(json!({ "items": matching, "cursor": next })))
    }

    async fn create(&self, payload: &CreatePayload) -> Result<ApiResponse, SyncError> {
        let contact = payload.as_contact();
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Create {
            uid: contact.external_id().map(str::to_string),
        });
        if let Some(fault) = state.scripted_fault(contact.external_id()) {
            return Ok(fault);
        }
        let stored = state.insert(contact.clone());
        Ok(ApiResponse::ok(stored.into_value()))
    }

    async fn replace(&self, payload: &ReplacePayload) -> Result<ApiResponse, SyncError> {
        let contact = payload.as_contact();
        let uid = payload.external_id();
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Replace { uid: uid.to_string() });
        if let Some(fault) = state.scripted_fault(Some(uid)) {
            return Ok(fault);
        }

        let owner = contact.owner_scope();
        let existing = state
            .contacts
            .iter()
            .find(|(_, c)| c.external_id() == Some(uid) && c.owner_scope() == owner)
            .map(|(id, _)| *id);
        let stored = match existing {
            Some(id) => {
                let mut updated = contact.clone();
                updated.set(SERVER_ID, id);
                state.contacts.insert(id, updated.clone());
                updated
            }
            None => state.insert(contact.clone()),
        };
        Ok(ApiResponse::ok(stored.into_value()))
    }

    async fn delete(&self, server_id: &str) -> Result<ApiResponse, SyncError> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall::Delete { id: server_id.to_string() });
        if let Some(fault) = state.scripted_fault(Some(server_id)) {
            return Ok(fault);
        }
        let removed = server_id
            .parse::<u64>()
            .ok()
            .and_then(|id| state.contacts.remove(&id));
        match removed {
            Some(_) => Ok(ApiResponse::new(204, Value::Null)),
            None => Ok(ApiResponse::new(
                404,
                json!({ "message": format!("contact {} not found", server_id) }),
            )),
        }
    }
}
