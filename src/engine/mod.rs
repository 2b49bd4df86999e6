// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bulk synchronization against the remote directory.
//!
//! The [`SyncEngine`] composes a [`Transport`] with a fresh [`RateLimiter`]
//! per bulk operation. Requests go out strictly one at a time.
//!
//! # Failure policy
//!
//! Single-record primitives (`replace_one`, `create_one`, `delete_one`) fail
//! fast. Bulk loops isolate remote rejections: the record is reported in
//! [`BatchReport::skipped`] and the loop moves on. Caller misuse (a record
//! that fails the replace preconditions) and network failures abort the
//! whole call.
//!
//! # Example
//!
//! ```
//! use contact_sync::{Contact, InMemoryDirectory, Scope, SyncConfig, SyncEngine};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let directory = InMemoryDirectory::new();
//! let engine = SyncEngine::new(&directory, SyncConfig::default());
//!
//! let records = vec![Contact::new().with("uid", "1650000000").with("first_name", "Ada")];
//! let report = engine.replace_all(&records, Scope::COMPANY).await.unwrap();
//! assert_eq!(report.succeeded, 1);
//!
//! let fetched = engine.fetch_all(Scope::COMPANY).await.unwrap();
//! assert_eq!(fetched.len(), 1);
//! # });
//! ```

pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub use types::{BatchReport, BulkOperation, SkippedRecord};

use crate::config::{RateConfig, SyncConfig};
use crate::contact::{Contact, CreatePayload, ReplacePayload, Scope, EXTERNAL_ID, SERVER_ID};
use crate::error::SyncError;
use crate::metrics;
use crate::resilience::clock::{Clock, TokioClock};
use crate::resilience::rate_limiter::RateLimiter;
use crate::resilience::retry::call_with_single_retry;
use crate::transport::{ApiResponse, Page, Transport};

/// Pagination state: keep fetching from a cursor, or stop.
enum FetchState {
    Fetching(String),
    Done,
}

/// A prepared outbound request for one record.
enum Request {
    Create(CreatePayload),
    Replace(ReplacePayload),
    Delete(String),
}

pub struct SyncEngine<'t, T: Transport + ?Sized> {
    transport: &'t T,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    /// Directories fetched this run, keyed by scope key
    table: Mutex<HashMap<String, Vec<Contact>>>,
}

impl<'t, T: Transport + ?Sized> SyncEngine<'t, T> {
    pub fn new(transport: &'t T, config: SyncConfig) -> Self {
        Self::with_clock(transport, config, Arc::new(TokioClock::new()))
    }

    pub fn with_clock(transport: &'t T, config: SyncConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            config,
            clock,
            table: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// A fresh limiter; each bulk operation owns exactly one.
    pub fn limiter(&self, rate: &RateConfig) -> Result<RateLimiter, SyncError> {
        RateLimiter::new(rate, self.clock.clone())
    }

    /// Every record currently in `scope`, in server order.
    ///
    /// A rate-limited page is retried once without advancing the cursor.
    /// Any other failure aborts the fetch; a partial directory is never
    /// returned.
    #[instrument(level = "info", skip(self, scope), fields(scope = %scope))]
    pub async fn fetch_all(&self, scope: Scope<'_>) -> Result<Vec<Contact>, SyncError> {
        let mut limiter = self.limiter(&self.config.fetch_rate)?;
        let limit = self.config.page_limit;
        info!("Fetching batches of {} contacts from {}...", limit, scope);

        let mut result = Vec::new();
        let mut state = FetchState::Fetching(String::new());
        while let FetchState::Fetching(cursor) = state {
            let response = call_with_single_retry("list", &mut limiter, || {
                self.transport.list_page(scope, &cursor, limit)
            })
            .await?;
            let page = Page::from_body(response.body)?;
            let count = page.items.len();
            metrics::record_page(count);
            info!(
                "Fetched {} {}...",
                if cursor.is_empty() { "first" } else { "next" },
                count
            );
            result.extend(page.items);

            state = if count < limit || page.cursor.is_empty() {
                FetchState::Done
            } else {
                FetchState::Fetching(page.cursor)
            };
        }

        info!("Fetched {} contact(s) from {}.", result.len(), scope);
        Ok(result)
    }

    /// Upsert every record by `uid`, in input order.
    ///
    /// All records are checked against the replace preconditions before the
    /// first request; one bad record fails the call with
    /// [`SyncError::Validation`] and nothing is sent.
    #[instrument(level = "info", skip(self, records, scope), fields(scope = %scope, total = records.len()))]
    pub async fn replace_all(
        &self,
        records: &[Contact],
        scope: Scope<'_>,
    ) -> Result<BatchReport, SyncError> {
        let requests = records
            .iter()
            .map(|r| r.replace_payload(scope).map(Request::Replace))
            .collect::<Result<Vec<_>, _>>()?;
        let mut limiter = self.limiter(&self.config.batch_rate)?;
        self.run_batch(
            BulkOperation::Replace,
            scope,
            records,
            requests.into_iter().map(Ok).collect(),
            &mut limiter,
        )
        .await
    }

    /// Create every record as new, in input order. Server ids and `uid`s are
    /// stripped.
    #[instrument(level = "info", skip(self, records, scope), fields(scope = %scope, total = records.len()))]
    pub async fn create_all(
        &self,
        records: &[Contact],
        scope: Scope<'_>,
    ) -> Result<BatchReport, SyncError> {
        let requests = records
            .iter()
            .map(|r| Ok(Request::Create(r.create_payload(scope))))
            .collect();
        let mut limiter = self.limiter(&self.config.batch_rate)?;
        self.run_batch(BulkOperation::Create, scope, records, requests, &mut limiter)
            .await
    }

    /// Delete everything currently in `scope`.
    ///
    /// The targets come from a live fetch, never from a caller-held list.
    /// A fetched record with no server id is skipped.
    #[instrument(level = "info", skip(self, scope), fields(scope = %scope))]
    pub async fn delete_all(&self, scope: Scope<'_>) -> Result<BatchReport, SyncError> {
        let contacts = self.fetch_all(scope).await?;
        let requests = contacts
            .iter()
            .map(|c| c.require_server_id().map(Request::Delete))
            .collect();
        let mut limiter = self.limiter(&self.config.batch_rate)?;
        self.run_batch(BulkOperation::Delete, scope, &contacts, requests, &mut limiter)
            .await
    }

    /// Fetch `scope` into the in-memory lookup table, replacing any earlier copy.
    pub async fn fetch_into_table(&self, scope: Scope<'_>) -> Result<usize, SyncError> {
        let contacts = self.fetch_all(scope).await?;
        let count = contacts.len();
        self.table.lock().insert(scope.key().to_string(), contacts);
        Ok(count)
    }

    /// The lookup-table copy of `scope` (empty if never fetched).
    #[must_use]
    pub fn table(&self, scope: Scope<'_>) -> Vec<Contact> {
        self.table.lock().get(scope.key()).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn table_snapshot(&self) -> HashMap<String, Vec<Contact>> {
        self.table.lock().clone()
    }

    pub async fn replace_one(
        &self,
        limiter: &mut RateLimiter,
        record: &Contact,
        scope: Scope<'_>,
    ) -> Result<Contact, SyncError> {
        let request = Request::Replace(record.replace_payload(scope)?);
        let response = self.send(limiter, &request).await?;
        Contact::from_value(response.body)
    }

    pub async fn create_one(
        &self,
        limiter: &mut RateLimiter,
        record: &Contact,
        scope: Scope<'_>,
    ) -> Result<Contact, SyncError> {
        let request = Request::Create(record.create_payload(scope));
        let response = self.send(limiter, &request).await?;
        Contact::from_value(response.body)
    }

    /// Delete by the record's server id; fails with
    /// [`SyncError::Validation`] when it has none.
    pub async fn delete_one(
        &self,
        limiter: &mut RateLimiter,
        record: &Contact,
    ) -> Result<(), SyncError> {
        let id = record.require_server_id()?;
        self.delete_by_id(limiter, &id).await
    }

    pub async fn delete_by_id(
        &self,
        limiter: &mut RateLimiter,
        server_id: &str,
    ) -> Result<(), SyncError> {
        self.send(limiter, &Request::Delete(server_id.to_string()))
            .await
            .map(drop)
    }

    /// Upsert a uniquely tagged copy of `template` (default
    /// [`Contact::test_template`]) so test traffic can be found and removed.
    ///
    /// Returns the record sent and the server's reply.
    pub async fn test_insert_contact(
        &self,
        template: Option<&Contact>,
    ) -> Result<(Contact, Contact), SyncError> {
        let mut sent = template.cloned().unwrap_or_else(Contact::test_template);
        sent.remove(SERVER_ID);
        let uid = Uuid::new_v4().to_string();
        sent.set("emails", vec![self.synthetic_email(&uid)]);
        sent.set(EXTERNAL_ID, uid);

        let mut limiter = self.limiter(&self.config.batch_rate)?;
        let result = self.replace_one(&mut limiter, &sent, Scope::COMPANY).await?;
        Ok((sent, result))
    }

    /// Re-send a source record with a fresh synthetic email. A record with
    /// no `uid` gets one.
    pub async fn test_update_contact(
        &self,
        record: &Contact,
    ) -> Result<(Contact, Contact), SyncError> {
        if record.contains(SERVER_ID) {
            return Err(SyncError::Validation(format!(
                "not a source contact record with uid intact: {}",
                record
            )));
        }
        let mut sent = record.clone();
        let token = Uuid::new_v4().to_string();
        sent.set("emails", vec![self.synthetic_email(&token)]);
        if sent.external_id().is_none() {
            sent.set(EXTERNAL_ID, token);
        }

        let mut limiter = self.limiter(&self.config.batch_rate)?;
        let result = self.replace_one(&mut limiter, &sent, Scope::COMPANY).await?;
        Ok((sent, result))
    }

    fn synthetic_email(&self, token: &str) -> String {
        format!("{}@{}", token, self.config.test_email_domain)
    }

    async fn send(
        &self,
        limiter: &mut RateLimiter,
        request: &Request,
    ) -> Result<ApiResponse, SyncError> {
        match request {
            Request::Create(payload) => {
                call_with_single_retry("create", limiter, || self.transport.create(payload)).await
            }
            Request::Replace(payload) => {
                call_with_single_retry("replace", limiter, || self.transport.replace(payload))
                    .await
            }
            Request::Delete(id) => {
                call_with_single_retry("delete", limiter, || self.transport.delete(id)).await
            }
        }
    }

    /// The per-record loop shared by every bulk operation. An `Err` request
    /// is a record that could not be prepared; it is skipped unsent.
    async fn run_batch(
        &self,
        operation: BulkOperation,
        scope: Scope<'_>,
        records: &[Contact],
        requests: Vec<Result<Request, SyncError>>,
        limiter: &mut RateLimiter,
    ) -> Result<BatchReport, SyncError> {
        let total = records.len();
        let mut report = BatchReport::new(operation, scope.to_string());
        info!("{} {} contact(s) in {}...", operation.progressive(), total, scope);

        for (index, (record, request)) in records.iter().zip(requests).enumerate() {
            report.attempted += 1;
            let outcome = match request {
                Ok(request) => match self.send(limiter, &request).await {
                    Ok(_) => Ok(()),
                    Err(err) if err.is_isolatable() => Err(err),
                    Err(err) => return Err(err),
                },
                Err(err) => Err(err),
            };

            match outcome {
                Ok(()) => {
                    report.succeeded += 1;
                    metrics::record_record(operation.as_str(), "applied");
                    if report.succeeded < total
                        && report.succeeded % self.config.progress_every == 0
                    {
                        info!("{} {}/{}...", operation.past_tense(), report.succeeded, total);
                    }
                }
                Err(err) => {
                    metrics::record_record(operation.as_str(), "skipped");
                    warn!(index, error = %err, "Skipping contact due to errors: {}", record);
                    report.skipped.push(SkippedRecord {
                        index,
                        record: record.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            "{} {} contact(s) in {}.",
            operation.past_tense(),
            report.succeeded,
            scope
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::clock::ManualClock;
    use crate::transport::{InMemoryDirectory, RecordedCall};
    use serde_json::json;
    use std::time::Duration;

    fn engine<'t>(
        directory: &'t InMemoryDirectory,
        config: SyncConfig,
    ) -> (SyncEngine<'t, InMemoryDirectory>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (SyncEngine::with_clock(directory, config, clock.clone()), clock)
    }

    fn named(uid: &str) -> Contact {
        Contact::new().with("uid", uid).with("first_name", uid)
    }

    #[tokio::test]
    async fn test_fetch_all_empty_directory_is_one_call() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        let fetched = engine.fetch_all(Scope::COMPANY).await.unwrap();
        assert!(fetched.is_empty());
        assert_eq!(directory.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_follows_cursor() {
        let directory = InMemoryDirectory::new();
        directory.seed((0..5).map(|i| named(&i.to_string())));
        let config = SyncConfig { page_limit: 2, ..SyncConfig::default() };
        let (engine, _clock) = engine(&directory, config);

        let fetched = engine.fetch_all(Scope::COMPANY).await.unwrap();
        let uids: Vec<_> = fetched.iter().map(|c| c.text("uid").to_string()).collect();
        assert_eq!(uids, vec!["0", "1", "2", "3", "4"]);
        assert_eq!(directory.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_stops_on_short_page_despite_cursor() {
        let directory = InMemoryDirectory::new().with_terminal_cursor();
        directory.seed((0..3).map(|i| named(&i.to_string())));
        let config = SyncConfig { page_limit: 2, ..SyncConfig::default() };
        let (engine, _clock) = engine(&directory, config);

        let fetched = engine.fetch_all(Scope::COMPANY).await.unwrap();
        assert_eq!(fetched.len(), 3);
        assert_eq!(directory.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limited_page_is_refetched_from_same_cursor() {
        let directory = InMemoryDirectory::new();
        directory.seed([named("a")]);
        directory.rate_limit_pages(1);
        let (engine, clock) = engine(&directory, SyncConfig::default());

        let fetched = engine.fetch_all(Scope::COMPANY).await.unwrap();
        assert_eq!(fetched.len(), 1);

        let cursors: Vec<_> = directory
            .calls()
            .into_iter()
            .map(|c| match c {
                RecordedCall::ListPage { cursor, .. } => cursor,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(cursors, vec!["".to_string(), "".to_string()]);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_fetch_aborts_on_fatal_page() {
        let directory = InMemoryDirectory::new();
        directory.rate_limit_pages(2);
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        let err = engine.fetch_all(Scope::COMPANY).await.unwrap_err();
        assert!(matches!(err, SyncError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_scope_is_sent_as_owner_id() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        engine.fetch_all(Scope::account("77")).await.unwrap();
        assert_eq!(
            directory.calls()[0],
            RecordedCall::ListPage {
                owner_id: Some("77".into()),
                cursor: String::new(),
                limit: 1000,
            }
        );
    }

    #[tokio::test]
    async fn test_replace_all_validates_before_sending() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());
        let records = vec![named("a"), named("b").with("id", 3)];

        let err = engine.replace_all(&records, Scope::COMPANY).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_replace_all_isolates_remote_failures() {
        let directory = InMemoryDirectory::new();
        directory.fail("b", 400, "invalid phone number");
        let (engine, _clock) = engine(&directory, SyncConfig::default());
        let records = vec![named("a"), named("b"), named("c")];

        let report = engine.replace_all(&records, Scope::COMPANY).await.unwrap();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(report.skipped[0].record, named("b"));
        assert_eq!(directory.inventory(Scope::COMPANY).len(), 2);
    }

    #[tokio::test]
    async fn test_batch_calls_are_paced_per_minute() {
        let directory = InMemoryDirectory::new();
        let (engine, clock) = engine(&directory, SyncConfig::default());
        let records = vec![named("a"), named("b"), named("c")];

        engine.replace_all(&records, Scope::COMPANY).await.unwrap();
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(600); 2]);
    }

    #[tokio::test]
    async fn test_create_all_strips_server_ids() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());
        let records = vec![named("a").with("id", 500)];

        let report = engine.create_all(&records, Scope::account("9")).await.unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(directory.calls(), vec![RecordedCall::Create { uid: None }]);
        let stored = directory.inventory(Scope::account("9"));
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].server_id().as_deref(), Some("1"));
        assert_eq!(stored[0].external_id(), None);
        assert_eq!(records[0].external_id(), Some("a"));
    }

    #[tokio::test]
    async fn test_delete_all_skips_records_without_id() {
        struct NoIds(InMemoryDirectory);

        #[async_trait::async_trait]
        impl Transport for NoIds {
            async fn list_page(
                &self,
                _scope: Scope<'_>,
                _cursor: &str,
                _limit: usize,
            ) -> Result<ApiResponse, SyncError> {
                Ok(ApiResponse::ok(json!({"items": [{"uid": "x"}], "cursor": ""})))
            }
            async fn create(&self, p: &CreatePayload) -> Result<ApiResponse, SyncError> {
                self.0.create(p).await
            }
            async fn replace(&self, p: &ReplacePayload) -> Result<ApiResponse, SyncError> {
                self.0.replace(p).await
            }
            async fn delete(&self, id: &str) -> Result<ApiResponse, SyncError> {
                self.0.delete(id).await
            }
        }

        let transport = NoIds(InMemoryDirectory::new());
        let engine = SyncEngine::with_clock(
            &transport,
            SyncConfig::default(),
            Arc::new(ManualClock::new()),
        );

        let report = engine.delete_all(Scope::COMPANY).await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.succeeded, 0);
        assert!(report.skipped[0].reason.contains("no id"));
        assert!(transport.0.calls().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_aborts_batch() {
        struct Unreachable;

        #[async_trait::async_trait]
        impl Transport for Unreachable {
            async fn list_page(
                &self,
                _scope: Scope<'_>,
                _cursor: &str,
                _limit: usize,
            ) -> Result<ApiResponse, SyncError> {
                Err(SyncError::Network("connection refused".into()))
            }
            async fn create(&self, _p: &CreatePayload) -> Result<ApiResponse, SyncError> {
                Err(SyncError::Network("connection refused".into()))
            }
            async fn replace(&self, _p: &ReplacePayload) -> Result<ApiResponse, SyncError> {
                Err(SyncError::Network("connection refused".into()))
            }
            async fn delete(&self, _id: &str) -> Result<ApiResponse, SyncError> {
                Err(SyncError::Network("connection refused".into()))
            }
        }

        let engine = SyncEngine::with_clock(
            &Unreachable,
            SyncConfig::default(),
            Arc::new(ManualClock::new()),
        );
        let err = engine
            .replace_all(&[named("a"), named("b")], Scope::COMPANY)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_lookup_table_keyed_by_scope() {
        let directory = InMemoryDirectory::new();
        directory.seed([named("a"), named("b").with("owner_id", "5")]);
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        assert_eq!(engine.fetch_into_table(Scope::COMPANY).await.unwrap(), 1);
        assert_eq!(engine.fetch_into_table(Scope::account("5")).await.unwrap(), 1);

        let snapshot = engine.table_snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(engine.table(Scope::account("5"))[0].text("uid"), "b");
        assert!(engine.table(Scope::account("6")).is_empty());
    }

    #[tokio::test]
    async fn test_insert_helper_tags_record() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        let (sent, result) = engine.test_insert_contact(None).await.unwrap();
        let uid = sent.external_id().unwrap().to_string();
        assert_eq!(sent.text_list("emails"), vec![format!("{}@test.com", uid)]);
        assert_eq!(sent.text("first_name"), "Test");
        assert!(!sent.contains("id"));
        assert_eq!(result.external_id(), Some(uid.as_str()));
        assert!(result.server_id().is_some());
    }

    #[tokio::test]
    async fn test_update_helper_keeps_uid() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        let (first, _) = engine.test_insert_contact(None).await.unwrap();
        let (second, _) = engine.test_update_contact(&first).await.unwrap();

        assert_eq!(second.external_id(), first.external_id());
        assert_ne!(second.text_list("emails"), first.text_list("emails"));
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn test_both_helpers_share_email_domain() {
        let directory = InMemoryDirectory::new();
        let config = SyncConfig {
            test_email_domain: "example.org".into(),
            ..SyncConfig::default()
        };
        let (engine, _clock) = engine(&directory, config);

        let (inserted, _) = engine.test_insert_contact(None).await.unwrap();
        let (updated, _) = engine.test_update_contact(&inserted).await.unwrap();

        for sent in [&inserted, &updated] {
            let emails = sent.text_list("emails");
            assert_eq!(emails.len(), 1);
            assert!(emails[0].ends_with("@example.org"), "{}", emails[0]);
        }
    }

    #[tokio::test]
    async fn test_update_helper_rejects_server_records() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());

        let err = engine
            .test_update_contact(&named("a").with("id", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_one_requires_id() {
        let directory = InMemoryDirectory::new();
        let (engine, _clock) = engine(&directory, SyncConfig::default());
        let mut limiter = engine.limiter(&RateConfig::batch()).unwrap();

        let err = engine.delete_one(&mut limiter, &named("a")).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_single_record_primitive_fails_fast() {
        let directory = InMemoryDirectory::new();
        directory.fail("a", 500, "internal error");
        let (engine, _clock) = engine(&directory, SyncConfig::default());
        let mut limiter = engine.limiter(&RateConfig::batch()).unwrap();

        let err = engine
            .replace_one(&mut limiter, &named("a"), Scope::COMPANY)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Http { status: 500, .. }));
    }
}
