// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Time source used by the rate limiter.
//!
//! Production code paces calls on tokio's timer ([`TokioClock`]). Tests
//! drive a [`ManualClock`], which never really sleeps: each sleep advances
//! virtual time and is recorded so assertions can inspect the pacing.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time since the clock's origin.
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock for tests.
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without recording a sleep (simulates request latency).
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Every sleep requested so far, in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    #[must_use]
    pub fn total_slept(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
        *self.now.lock() += duration;
    }
}
