// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Single-retry call composition.
//!
//! Every outbound request goes through [`call_with_single_retry`]: pace,
//! send, assess. A rate-limit signal buys exactly one more attempt, which is
//! paced again; whatever that second attempt returns is final.

use std::future::Future;

use tracing::info;

use super::rate_limiter::{CallOutcome, RateLimiter};
use crate::error::SyncError;
use crate::metrics::{self, LatencyTimer};
use crate::transport::ApiResponse;

pub async fn call_with_single_retry<F, Fut>(
    operation_name: &'static str,
    limiter: &mut RateLimiter,
    mut operation: F,
) -> Result<ApiResponse, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ApiResponse, SyncError>>,
{
    let response = attempt(operation_name, limiter, &mut operation).await?;
    match limiter.assess(response).await {
        CallOutcome::Proceed(response) => return Ok(response),
        CallOutcome::Fatal(err) => return Err(err),
        CallOutcome::RetryOnce => {}
    }

    metrics::record_retry(operation_name);
    let response = attempt(operation_name, limiter, &mut operation).await?;
    let response = limiter.assess_final(response)?;
    info!("Operation '{}' succeeded after 1 retry", operation_name);
    Ok(response)
}

async fn attempt<F, Fut>(
    operation_name: &'static str,
    limiter: &mut RateLimiter,
    operation: &mut F,
) -> Result<ApiResponse, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ApiResponse, SyncError>>,
{
    limiter.prepare_call().await;
    let timer = LatencyTimer::new(operation_name);
    let result = operation().await;
    drop(timer);
    match &result {
        Ok(response) => metrics::record_request(operation_name, response.status),
        Err(err) => metrics::record_error(operation_name, err.kind()),
    }
    result
}
