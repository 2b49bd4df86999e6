// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Pacing, back-off and the single-retry call wrapper.

pub mod clock;
pub mod rate_limiter;
pub mod retry;
