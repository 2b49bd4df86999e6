// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the sync engine.
//!
//! # Example
//!
//! ```
//! use contact_sync::{RateConfig, SyncConfig};
//! use std::time::Duration;
//!
//! // Defaults mirror the directory service's published quota
//! let config = SyncConfig::default();
//! assert_eq!(config.page_limit, 1000);
//! assert_eq!(config.batch_rate.per_minute, 100.0);
//!
//! // Spacing takes the stricter of the two limits
//! let rate = RateConfig { per_second: 15.0, per_minute: 100.0, back_off_secs: 30 };
//! assert_eq!(rate.spacing(), Duration::from_millis(600));
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::SyncError;

/// Environment variable holding the bearer credential.
pub const API_KEY_ENV: &str = "DIALPAD_API_KEY";

pub const DEFAULT_API_BASE: &str = "https://dialpad.com/api/v2";

/// Call pacing for one limiter.
///
/// Use the presets for the two traffic shapes:
/// - [`RateConfig::fetch()`] - paginated listing, per-second quota only
/// - [`RateConfig::batch()`] - per-record writes, per-minute quota
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateConfig {
    /// Max calls per second (must be > 0)
    #[serde(default = "default_per_second")]
    pub per_second: f64,
    /// Max calls per minute (0 = unlimited)
    #[serde(default)]
    pub per_minute: f64,
    /// Sleep applied when the server reports rate exhaustion
    #[serde(default = "default_back_off_secs")]
    pub back_off_secs: u64,
}

fn spacing_for(window_secs: f64, calls: f64) -> Duration {
    Duration::from_nanos((window_secs * 1e9 / calls).round() as u64)
}

fn default_per_second() -> f64 { 15.0 }
fn default_back_off_secs() -> u64 { 30 }

impl Default for RateConfig {
    fn default() -> Self {
        Self::fetch()
    }
}

impl RateConfig {
    /// Listing pages: 15 calls per second.
    #[must_use]
    pub fn fetch() -> Self {
        Self {
            per_second: default_per_second(),
            per_minute: 0.0,
            back_off_secs: default_back_off_secs(),
        }
    }

    /// Per-record create/replace/delete: 100 calls per minute.
    #[must_use]
    pub fn batch() -> Self {
        Self {
            per_minute: 100.0,
            ..Self::fetch()
        }
    }

    /// Minimum spacing between call starts: `max(1/per_second, 60/per_minute)`.
    #[must_use]
    pub fn spacing(&self) -> Duration {
        let per_second = spacing_for(1.0, self.per_second);
        if self.per_minute > 0.0 {
            per_second.max(spacing_for(60.0, self.per_minute))
        } else {
            per_second
        }
    }

    #[must_use]
    pub fn back_off(&self) -> Duration {
        Duration::from_secs(self.back_off_secs)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if !(self.per_second.is_finite() && self.per_second > 0.0) {
            return Err(SyncError::Config(format!(
                "per_second must be a positive number, got {}",
                self.per_second
            )));
        }
        if !(self.per_minute.is_finite() && self.per_minute >= 0.0) {
            return Err(SyncError::Config(format!(
                "per_minute must be zero or positive, got {}",
                self.per_minute
            )));
        }
        Ok(())
    }
}

/// Configuration for the sync engine and its HTTP transport.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Bearer credential (normally from `DIALPAD_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Per-request timeout for the HTTP transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Items requested per list page
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Emit a progress line every N successes
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    #[serde(default = "RateConfig::fetch")]
    pub fetch_rate: RateConfig,

    #[serde(default = "RateConfig::batch")]
    pub batch_rate: RateConfig,

    /// Domain for the synthetic addresses written by both
    /// `test_insert_contact` and `test_update_contact`
    #[serde(default = "default_test_email_domain")]
    pub test_email_domain: String,
}

fn default_api_base() -> String { DEFAULT_API_BASE.to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_page_limit() -> usize { 1000 }
fn default_progress_every() -> usize { 100 }
fn default_test_email_domain() -> String { "test.com".to_string() }

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            page_limit: default_page_limit(),
            progress_every: default_progress_every(),
            fetch_rate: RateConfig::fetch(),
            batch_rate: RateConfig::batch(),
            test_email_domain: default_test_email_domain(),
        }
    }
}

impl SyncConfig {
    /// Build from the process environment.
    ///
    /// Reads `DIALPAD_API_KEY` plus the `CONTACT_SYNC_*` overrides listed in
    /// [`SyncConfig::from_lookup`].
    pub fn from_env() -> Result<Self, SyncError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Recognised keys:
    /// `DIALPAD_API_KEY`, `CONTACT_SYNC_API_BASE`, `CONTACT_SYNC_TIMEOUT_SECS`,
    /// `CONTACT_SYNC_FETCH_PER_SECOND`, `CONTACT_SYNC_BATCH_PER_MINUTE`,
    /// `CONTACT_SYNC_BACK_OFF_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            api_key: lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()),
            ..Self::default()
        };
        if let Some(base) = lookup("CONTACT_SYNC_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var(&lookup, "CONTACT_SYNC_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(rate) = parse_var(&lookup, "CONTACT_SYNC_FETCH_PER_SECOND")? {
            config.fetch_rate.per_second = rate;
        }
        if let Some(rate) = parse_var(&lookup, "CONTACT_SYNC_BATCH_PER_MINUTE")? {
            config.batch_rate.per_minute = rate;
        }
        if let Some(secs) = parse_var(&lookup, "CONTACT_SYNC_BACK_OFF_SECS")? {
            config.fetch_rate.back_off_secs = secs;
            config.batch_rate.back_off_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        self.fetch_rate.validate()?;
        self.batch_rate.validate()?;
        if self.page_limit == 0 {
            return Err(SyncError::Config("page_limit must be at least 1".into()));
        }
        if self.progress_every == 0 {
            return Err(SyncError::Config("progress_every must be at least 1".into()));
        }
        Ok(())
    }

    /// The credential, or a config error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str, SyncError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| SyncError::Config(format!("set the {} environment variable", API_KEY_ENV)))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, SyncError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SyncError::Config(format!("{}={:?}: {}", key, raw, e))),
    }
}
