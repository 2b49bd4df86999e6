// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Command-line surface of the `contact-sync` binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::config::SyncConfig;
use crate::contact::Scope;
use crate::engine::{BatchReport, SyncEngine};
use crate::error::SyncError;
use crate::producer::{export_contacts, import_contacts};
use crate::resilience::clock::ManualClock;
use crate::transport::{HttpTransport, InMemoryDirectory};

#[derive(Debug, Parser)]
#[command(name = "contact-sync")]
#[command(version, about = "Validate spreadsheet contacts and upload them to a Dialpad directory")]
pub struct Cli {
    /// Upsert every imported contact into the directory
    #[arg(long)]
    pub upload: bool,

    /// Write the validated rows to `<name>.export<.ext>` next to the input
    #[arg(long)]
    pub export: bool,

    /// Account to upload into (empty: the company directory)
    #[arg(long, default_value = "")]
    pub account: String,

    /// Run the upload against an in-memory directory instead of the API
    #[arg(long)]
    pub dry_run: bool,

    /// CSV file of contacts
    #[arg(value_parser = existing_file)]
    pub path: PathBuf,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else if path.exists() {
        Err(format!("{} is not a file", value))
    } else {
        Err(format!("{} does not exist", value))
    }
}

/// `dir/contacts.csv` -> `dir/contacts.export.csv`
#[must_use]
pub fn export_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(".export");
    if let Some(extension) = path.extension() {
        name.push(".");
        name.push(extension);
    }
    path.with_file_name(name)
}

/// Import, optionally export, optionally upload.
///
/// Returns the upload report when an upload ran. A live upload without a
/// credential fails before the spreadsheet is read.
pub async fn run(cli: &Cli, config: SyncConfig) -> Result<Option<BatchReport>, SyncError> {
    if cli.upload && !cli.dry_run {
        config.require_api_key()?;
    }

    let contacts = import_contacts(&cli.path)?;
    if cli.export {
        export_contacts(&contacts, export_path(&cli.path))?;
    }
    if !cli.upload {
        return Ok(None);
    }

    let scope = Scope::from_option(Some(cli.account.as_str()));
    let report = if cli.dry_run {
        let directory = InMemoryDirectory::new();
        let clock = Arc::new(ManualClock::new());
        let engine = SyncEngine::with_clock(&directory, config, clock.clone());
        let report = engine.replace_all(&contacts, scope).await?;
        info!(
            "Dry run: {} contact(s) stored, pacing would have taken {:.1}s",
            directory.len(),
            clock.total_slept().as_secs_f64()
        );
        report
    } else {
        let transport = HttpTransport::new(&config)?;
        SyncEngine::new(&transport, config)
            .replace_all(&contacts, scope)
            .await?
    };

    info!("{}", report);
    Ok(Some(report))
}
