// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Contact Sync
//!
//! Rate-limited bulk synchronization of contact records with a remote
//! directory API that paginates by cursor and throttles callers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Record Producer                        │
//! │  • CSV rows -> validated Contacts (phones, emails, uid)    │
//! │  • Export back to CSV                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Sync Engine                          │
//! │  • fetch_all: cursor pagination until a short page         │
//! │  • replace_all / create_all / delete_all, one at a time    │
//! │  • Per-record failure isolation into a BatchReport         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                (every call: pace, send, assess)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Rate Limiter + Single Retry                 │
//! │  • Minimum spacing between call starts                     │
//! │  • Fixed back-off and one retry on a rate-limit signal     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Transport                           │
//! │  • HttpTransport: bearer-authenticated reqwest client      │
//! │  • InMemoryDirectory: scriptable stub for tests/dry runs   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contact_sync::{HttpTransport, Scope, SyncConfig, SyncEngine};
//! use contact_sync::producer::import_contacts;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SyncConfig::from_env()?;
//!     let transport = HttpTransport::new(&config)?;
//!     let engine = SyncEngine::new(&transport, config);
//!
//!     let contacts = import_contacts("contacts.csv")?;
//!     let report = engine.replace_all(&contacts, Scope::COMPANY).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: The [`SyncEngine`] and its bulk operations
//! - [`resilience`]: Clock, rate limiter and single-retry composition
//! - [`transport`]: The [`Transport`] trait and its implementations
//! - [`producer`]: Spreadsheet import/export and field validation
//! - [`cli`]: The `contact-sync` command line

pub mod cli;
pub mod config;
pub mod contact;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod producer;
pub mod resilience;
pub mod transport;

pub use config::{RateConfig, SyncConfig};
pub use contact::{Contact, CreatePayload, ReplacePayload, Scope};
pub use engine::{BatchReport, BulkOperation, SkippedRecord, SyncEngine};
pub use error::SyncError;
pub use metrics::LatencyTimer;
pub use resilience::clock::{Clock, ManualClock, TokioClock};
pub use resilience::rate_limiter::{CallOutcome, RateLimiter};
pub use resilience::retry::call_with_single_retry;
pub use transport::{ApiResponse, HttpTransport, InMemoryDirectory, Page, RecordedCall, Transport};
