// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! CSV import and export of contact rows.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{info, warn};

use super::validate::{parse_emails, parse_name, parse_phones, parse_uid, FieldError};
use crate::contact::{Contact, EXTERNAL_ID};
use crate::error::SyncError;

pub const CREATION_DATE: &str = "Creation Date";
pub const FIRST_NAME: &str = "First_Name";
pub const LAST_NAME: &str = "Last_Name";
pub const PHONES: &str = "Phones";
pub const EMAIL: &str = "Email";

/// Header row written by [`export_contacts`].
pub const EXPORT_HEADER: [&str; 5] = ["UID", "first_name", "last_name", "phones", "emails"];

/// Positions of the required columns in the header row.
struct Columns {
    creation_date: usize,
    first_name: usize,
    last_name: usize,
    phones: usize,
    email: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, SyncError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let find = |column: &str| {
            names
                .iter()
                .position(|name| *name == column)
                .ok_or_else(|| SyncError::MissingColumn {
                    line: 1,
                    column: column.to_string(),
                })
        };
        Ok(Self {
            creation_date: find(CREATION_DATE)?,
            first_name: find(FIRST_NAME)?,
            last_name: find(LAST_NAME)?,
            phones: find(PHONES)?,
            email: find(EMAIL)?,
        })
    }
}

/// Read contacts from a CSV file with a header row.
pub fn import_contacts(path: impl AsRef<Path>) -> Result<Vec<Contact>, SyncError> {
    let path = path.as_ref();
    let contacts = read_contacts(File::open(path)?)?;
    info!("Read {} contact(s) from file: {}", contacts.len(), path.display());
    Ok(contacts)
}

/// Read contacts from any CSV source.
///
/// Line 1 is the header. A row with an unusable creation date or first name
/// is logged and skipped; invalid phones and emails are dropped from their
/// row with a warning. A missing column fails the whole read.
pub fn read_contacts<R: Read>(source: R) -> Result<Vec<Contact>, SyncError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(source);
    let columns = Columns::locate(reader.headers()?)?;

    let mut contacts = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let line = offset + 2;
        let record = record?;
        match parse_row(&columns, &record, line) {
            Ok(contact) => contacts.push(contact),
            Err(SyncError::Parse { line, reason }) => {
                warn!("Skipping row {}: {}", line, reason);
            }
            Err(other) => return Err(other),
        }
    }
    Ok(contacts)
}

fn parse_row(columns: &Columns, record: &StringRecord, line: usize) -> Result<Contact, SyncError> {
    let cell = |index: usize, column: &str| {
        record.get(index).ok_or_else(|| SyncError::MissingColumn {
            line,
            column: column.to_string(),
        })
    };
    let row_error = |e: FieldError| SyncError::Parse {
        line,
        reason: e.to_string(),
    };

    let uid = parse_uid(cell(columns.creation_date, CREATION_DATE)?).map_err(row_error)?;
    let first_name = parse_name(cell(columns.first_name, FIRST_NAME)?, None).map_err(row_error)?;
    let last_name =
        parse_name(cell(columns.last_name, LAST_NAME)?, Some(first_name.as_str())).map_err(row_error)?;

    let (phones, errors) = parse_phones(cell(columns.phones, PHONES)?);
    report_dropped(line, "phones", &errors);
    let (emails, errors) = parse_emails(cell(columns.email, EMAIL)?);
    report_dropped(line, "emails", &errors);

    Ok(Contact::new()
        .with(EXTERNAL_ID, uid)
        .with("first_name", first_name)
        .with("last_name", last_name)
        .with("phones", phones)
        .with("emails", emails))
}

fn report_dropped(line: usize, field: &str, errors: &[FieldError]) {
    if errors.is_empty() {
        return;
    }
    warn!("Line {}: Invalid {} ignored:", line, field);
    for error in errors {
        warn!("    {}", error);
    }
}

/// Write contacts to a CSV file. Returns the number of rows written.
pub fn export_contacts(contacts: &[Contact], path: impl AsRef<Path>) -> Result<usize, SyncError> {
    let path = path.as_ref();
    let rows = write_contacts(contacts, File::create(path)?)?;
    info!("Wrote {} row(s) to file: {}", rows, path.display());
    Ok(rows)
}

/// Write contacts as CSV: `UID,first_name,last_name,phones,emails`, with
/// list fields joined by `|`.
pub fn write_contacts<W: Write>(contacts: &[Contact], sink: W) -> Result<usize, SyncError> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    writer.write_record(EXPORT_HEADER)?;
    for contact in contacts {
        let phones = contact.text_list("phones").join("|");
        let emails = contact.text_list("emails").join("|");
        writer.write_record([
            contact.text(EXTERNAL_ID),
            contact.text("first_name"),
            contact.text("last_name"),
            phones.as_str(),
            emails.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(contacts.len())
}
