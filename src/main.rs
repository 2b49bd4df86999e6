// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! contact-sync
//!
//! Validates a contacts spreadsheet and optionally uploads it to the
//! directory. The credential comes from `DIALPAD_API_KEY`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use contact_sync::cli::{self, Cli};
use contact_sync::SyncConfig;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("contact_sync=info")),
        )
        .init();

    let args = Cli::parse();
    let config = SyncConfig::from_env().context("Failed to load configuration")?;

    if let Some(report) = cli::run(&args, config).await? {
        for skipped in &report.skipped {
            warn!("Not uploaded: {} ({})", skipped.record, skipped.reason);
        }
    }
    Ok(())
}
