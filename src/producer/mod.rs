// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Record producer: spreadsheet rows in, validated [`Contact`](crate::Contact)s out.
//!
//! Each imported row becomes
//! `{uid, first_name, last_name, phones, emails}`, where `uid` is the row's
//! creation timestamp in epoch seconds.

pub mod spreadsheet;
pub mod validate;

pub use spreadsheet::{export_contacts, import_contacts, read_contacts, write_contacts, EXPORT_HEADER};
pub use validate::{parse_emails, parse_name, parse_phones, parse_uid, FieldError};
