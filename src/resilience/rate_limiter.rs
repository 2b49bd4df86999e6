// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Call pacing and rate-limit back-off.
//!
//! A [`RateLimiter`] keeps a minimum spacing between call starts and, when
//! the server says the quota is exhausted, sleeps a fixed back-off before
//! allowing a single retry.
//!
//! One limiter is created per bulk operation and dropped when it ends, so no
//! operation inherits another's timing history.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use contact_sync::{ApiResponse, CallOutcome, ManualClock, RateConfig, RateLimiter};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let clock = Arc::new(ManualClock::new());
//! let mut limiter = RateLimiter::new(&RateConfig::batch(), clock.clone()).unwrap();
//!
//! limiter.prepare_call().await; // first call never waits
//! limiter.prepare_call().await; // second waits out the 600ms spacing
//! assert_eq!(clock.sleeps(), vec![Duration::from_millis(600)]);
//!
//! let busy = ApiResponse::bad_request("rate limit exceeded");
//! assert!(matches!(limiter.assess(busy).await, CallOutcome::RetryOnce));
//! # });
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::clock::Clock;
use crate::config::RateConfig;
use crate::error::SyncError;
use crate::metrics;
use crate::transport::ApiResponse;

/// How a call site should proceed after a response.
#[derive(Debug)]
pub enum CallOutcome {
    /// Usable as-is.
    Proceed(ApiResponse),
    /// Rate limited; the back-off has already been slept. Reissue once.
    RetryOnce,
    /// Any other failure.
    Fatal(SyncError),
}

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    last_call: Option<Duration>,
    delay: Duration,
    back_off: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateConfig, clock: Arc<dyn Clock>) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            clock,
            last_call: None,
            delay: config.spacing(),
            back_off: config.back_off(),
        })
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    #[must_use]
    pub fn back_off(&self) -> Duration {
        self.back_off
    }

    /// Wait until `delay` has elapsed since the previous call start, then
    /// stamp this one. Must run immediately before every request, retries
    /// included.
    pub async fn prepare_call(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = self.clock.now().saturating_sub(last);
            if elapsed < self.delay {
                let wait = self.delay - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "pacing next call");
                self.clock.sleep(wait).await;
            }
        }
        self.last_call = Some(self.clock.now());
    }

    /// Classify a response, sleeping the back-off when the server asks for it.
    pub async fn assess(&self, response: ApiResponse) -> CallOutcome {
        match classify(response) {
            Signal::Usable(response) => CallOutcome::Proceed(response),
            Signal::RateLimited(message) => {
                warn!(
                    "{}: backing off {} seconds",
                    message,
                    self.back_off.as_secs_f64()
                );
                metrics::record_backoff(self.back_off);
                self.clock.sleep(self.back_off).await;
                CallOutcome::RetryOnce
            }
            Signal::Failed(err) => CallOutcome::Fatal(err),
        }
    }

    /// Assessment for the one permitted retry: a second rate-limit signal is
    /// fatal and does not back off again.
    pub fn assess_final(&self, response: ApiResponse) -> Result<ApiResponse, SyncError> {
        match classify(response) {
            Signal::Usable(response) => Ok(response),
            Signal::RateLimited(message) => Err(SyncError::RateLimited { message }),
            Signal::Failed(err) => Err(err),
        }
    }

    /// `Ok(true)` when the request must be reissued (after back-off),
    /// `Ok(false)` when the response is usable, `Err` for anything else.
    pub async fn retry_call(&self, response: &ApiResponse) -> Result<bool, SyncError> {
        match self.assess(response.clone()).await {
            CallOutcome::Proceed(_) => Ok(false),
            CallOutcome::RetryOnce => Ok(true),
            CallOutcome::Fatal(err) => Err(err),
        }
    }
}

enum Signal {
    Usable(ApiResponse),
    RateLimited(String),
    Failed(SyncError),
}

fn classify(response: ApiResponse) -> Signal {
    if response.is_success() {
        return Signal::Usable(response);
    }
    if response.is_rate_limited() {
        return Signal::RateLimited(response.message().to_string());
    }
    if response.status == 400 {
        warn!("Bad request: {}", response.message());
        warn!("Detailed errors: {}", response.errors());
    }
    Signal::Failed(response.into_http_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::clock::ManualClock;
    use serde_json::json;

    fn limiter(per_second: f64, per_minute: f64) -> (RateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = RateConfig { per_second, per_minute, back_off_secs: 30 };
        (RateLimiter::new(&config, clock.clone()).unwrap(), clock)
    }

    #[tokio::test]
    async fn test_first_call_does_not_wait() {
        let (mut limiter, clock) = limiter(1.0, 0.0);
        limiter.prepare_call().await;
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_back_to_back_calls_are_spaced() {
        let (mut limiter, clock) = limiter(4.0, 0.0);
        limiter.prepare_call().await;
        limiter.prepare_call().await;
        limiter.prepare_call().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(250); 2]);
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_only_remaining_spacing_is_slept() {
        let (mut limiter, clock) = limiter(1.0, 0.0);
        limiter.prepare_call().await;
        clock.advance(Duration::from_millis(700));
        limiter.prepare_call().await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(300)]);
    }

    #[tokio::test]
    async fn test_no_wait_after_slow_request() {
        let (mut limiter, clock) = limiter(2.0, 0.0);
        limiter.prepare_call().await;
        clock.advance(Duration::from_secs(3));
        limiter.prepare_call().await;

        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_per_minute_dominates() {
        let (limiter, _clock) = limiter(15.0, 100.0);
        assert_eq!(limiter.delay(), Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_zero_per_second_rejected() {
        let clock = Arc::new(ManualClock::new());
        let config = RateConfig { per_second: 0.0, per_minute: 0.0, back_off_secs: 1 };
        assert!(RateLimiter::new(&config, clock).is_err());
    }

    #[tokio::test]
    async fn test_retry_call_on_rate_message_backs_off() {
        let (limiter, clock) = limiter(15.0, 0.0);
        let retry = limiter
            .retry_call(&ApiResponse::bad_request("Rate limit exceeded"))
            .await
            .unwrap();

        assert!(retry);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(30)]);
    }

    #[tokio::test]
    async fn test_retry_call_success_is_false() {
        let (limiter, clock) = limiter(15.0, 0.0);
        let retry = limiter
            .retry_call(&ApiResponse::ok(json!({"id": 1})))
            .await
            .unwrap();

        assert!(!retry);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_retry_call_other_bad_request_is_error() {
        let (limiter, clock) = limiter(15.0, 0.0);
        let err = limiter
            .retry_call(&ApiResponse::bad_request("invalid phone number"))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Http { status: 400, .. }));
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_retry_call_server_error_is_error_even_if_it_mentions_rate() {
        let (limiter, _clock) = limiter(15.0, 0.0);
        let response = ApiResponse::new(500, json!({"message": "rate"}));
        let err = limiter.retry_call(&response).await.unwrap_err();
        assert!(matches!(err, SyncError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_final_assessment_does_not_back_off_again() {
        let (limiter, clock) = limiter(15.0, 0.0);
        let outcome = limiter.assess_final(ApiResponse::bad_request("rate limit"));

        assert!(matches!(outcome, Err(SyncError::RateLimited { .. })));
        assert!(clock.sleeps().is_empty());
    }
}
