// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy for the sync engine and its collaborators.
//!
//! Bulk operations isolate per-record failures that come from the remote
//! service ([`SyncError::is_isolatable`]); everything else fails the call.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// A record handed to replace/delete is missing (or carries) an identifier field.
    #[error("invalid record: {0}")]
    Validation(String),

    /// The server kept signalling rate exhaustion after the single retry.
    #[error("rate limited after retry: {message}")]
    RateLimited { message: String },

    /// Any other non-success response from the directory API.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("missing column on line {line}: {column}")]
    MissingColumn { line: usize, column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SyncError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    /// Whether a bulk loop may skip the offending record and keep going.
    ///
    /// Remote rejections are isolated. Caller misuse and a broken
    /// connection are not: the next record would fail the same way.
    #[must_use]
    pub fn is_isolatable(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::RateLimited { .. } | Self::Decode(_)
        )
    }

    /// Short label for metrics and log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RateLimited { .. } => "rate_limited",
            Self::Http { .. } => "http",
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
            Self::Parse { .. } => "parse",
            Self::MissingColumn { .. } => "missing_column",
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
        }
    }
}
