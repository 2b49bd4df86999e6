// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Transports for the remote contact resource.
//!
//! - [`HttpTransport`]: the live REST API over reqwest
//! - [`InMemoryDirectory`]: an in-process directory for tests and dry runs

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpTransport;
pub use memory::{InMemoryDirectory, RecordedCall};
pub use traits::{ApiResponse, Page, Transport};
