// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Contact record data structure.
//!
//! A [`Contact`] is an open JSON object. The engine only looks at three keys
//! (`uid`, `id`, `owner_id`); every other field is carried through untouched.
//!
//! Outbound bodies are never the caller's record itself. [`CreatePayload`]
//! and [`ReplacePayload`] are fresh copies with the scope merged in, and a
//! `ReplacePayload` can only be built from a record that passes the replace
//! preconditions.
//!
//! # Example
//!
//! ```
//! use contact_sync::{Contact, ReplacePayload, Scope};
//! use serde_json::json;
//!
//! let contact = Contact::from_value(json!({
//!     "uid": "1650000000",
//!     "first_name": "Ada",
//!     "phones": ["+14155550100"],
//! })).unwrap();
//!
//! let payload = ReplacePayload::new(&contact, Scope::account("42")).unwrap();
//! assert_eq!(payload.as_contact().owner_scope(), Some("42"));
//! assert_eq!(contact.owner_scope(), None); // caller's record untouched
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SyncError;

/// Producer-assigned stable identifier.
pub const EXTERNAL_ID: &str = "uid";
/// Server-assigned identifier.
pub const SERVER_ID: &str = "id";
/// Optional sub-owner of the directory.
pub const OWNER_SCOPE: &str = "owner_id";

/// A directory partition a bulk operation is restricted to.
///
/// `Scope::COMPANY` is the whole directory; `Scope::account(id)` is a single
/// sub-owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scope<'a>(Option<&'a str>);

impl<'a> Scope<'a> {
    pub const COMPANY: Scope<'static> = Scope(None);

    #[must_use]
    pub fn account(owner_id: &'a str) -> Self {
        Self(Some(owner_id))
    }

    /// An empty id means directory-wide, matching how the CLI passes `--account ""`.
    #[must_use]
    pub fn from_option(owner_id: Option<&'a str>) -> Self {
        Self(owner_id.filter(|id| !id.is_empty()))
    }

    #[must_use]
    pub fn owner_id(&self) -> Option<&'a str> {
        self.0
    }

    /// Key used by the engine's lookup table.
    #[must_use]
    pub fn key(&self) -> &'a str {
        self.0.unwrap_or("company")
    }
}

impl fmt::Display for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "account {}", id),
            None => write!(f, "company account"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contact {
    fields: Map<String, Value>,
}

impl Contact {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a decoded JSON value; anything but an object is rejected.
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(SyncError::decode(format!(
                "expected a contact object, got {}",
                other
            ))),
        }
    }

    /// The fixed record the single-record test helpers start from.
    #[must_use]
    pub fn test_template() -> Self {
        Self::new()
            .with("phones", vec!["+18005551212"])
            .with("first_name", "Test")
            .with("last_name", "Contact")
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    #[must_use]
    pub fn external_id(&self) -> Option<&str> {
        self.fields.get(EXTERNAL_ID).and_then(Value::as_str)
    }

    /// Server ids arrive as JSON numbers from the live API, so both
    /// numbers and strings are accepted.
    #[must_use]
    pub fn server_id(&self) -> Option<String> {
        match self.fields.get(SERVER_ID)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn owner_scope(&self) -> Option<&str> {
        self.fields.get(OWNER_SCOPE).and_then(Value::as_str)
    }

    /// A string field, or `""` when absent.
    #[must_use]
    pub fn text(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// A list-of-strings field; non-string entries are ignored.
    #[must_use]
    pub fn text_list(&self, key: &str) -> Vec<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Replace preconditions: must carry `uid`, must not carry `id`.
    pub fn check_replaceable(&self) -> Result<(), SyncError> {
        if self.external_id().is_none() {
            return Err(SyncError::Validation(format!(
                "can't update a contact with no uid: {}",
                self
            )));
        }
        if self.contains(SERVER_ID) {
            return Err(SyncError::Validation(format!(
                "source contacts should not have an id field: {}",
                self
            )));
        }
        Ok(())
    }

    pub fn require_server_id(&self) -> Result<String, SyncError> {
        self.server_id().ok_or_else(|| {
            SyncError::Validation(format!("can't delete a contact with no id: {}", self))
        })
    }

    /// Copy of this record with `owner_id` merged in when the scope names one.
    #[must_use]
    pub fn outbound(&self, scope: Scope<'_>) -> Contact {
        let mut copy = self.clone();
        if let Some(owner_id) = scope.owner_id() {
            copy.set(OWNER_SCOPE, owner_id);
        }
        copy
    }

    /// Body for `PUT /contacts`; see [`ReplacePayload::new`].
    pub fn replace_payload(&self, scope: Scope<'_>) -> Result<ReplacePayload, SyncError> {
        ReplacePayload::new(self, scope)
    }

    #[must_use]
    pub fn create_payload(&self, scope: Scope<'_>) -> CreatePayload {
        CreatePayload::new(self, scope)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.fields) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self.fields),
        }
    }
}

/// Body of a `POST /contacts`. Never carries a server id or a `uid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CreatePayload(Contact);

impl CreatePayload {
    #[must_use]
    pub fn new(contact: &Contact, scope: Scope<'_>) -> Self {
        let mut body = contact.outbound(scope);
        body.remove(SERVER_ID);
        body.remove(EXTERNAL_ID);
        Self(body)
    }

    #[must_use]
    pub fn as_contact(&self) -> &Contact {
        &self.0
    }
}

/// Body of a `PUT /contacts`, matched server-side by `uid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReplacePayload(Contact);

impl ReplacePayload {
    pub fn new(contact: &Contact, scope: Scope<'_>) -> Result<Self, SyncError> {
        contact.check_replaceable()?;
        Ok(Self(contact.outbound(scope)))
    }

    #[must_use]
    pub fn as_contact(&self) -> &Contact {
        &self.0
    }

    #[must_use]
    pub fn external_id(&self) -> &str {
        // checked in `new`
        self.0.external_id().unwrap_or_default()
    }
}
