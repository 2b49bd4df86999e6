// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field validation for spreadsheet rows.
//!
//! Phones are normalized to E.164 (`+` plus digits), North American numbers
//! being the default. Emails get a syntactic check only; deliverability is
//! never tested.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Area codes reserved for personal and text services.
pub const PERSONAL_AREA_CODES: [&str; 15] = [
    "500", "521", "522", "523", "524", "525", "526", "527", "528", "529", "533", "544", "566",
    "577", "588",
];

/// Area codes shared by more than one country.
pub const AMBIGUOUS_AREA_CODES: [&str; 1] = ["664"];

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("+ not at front of phone: {0}")]
    MisplacedPlus(String),

    #[error("Not enough digits: {0}")]
    TooFewDigits(String),

    #[error("Invalid prefix after area code (starts with 0 or 1): {0}")]
    InvalidExchange(String),

    #[error("Personal/Text-service area code: {0}")]
    PersonalAreaCode(String),

    #[error("Area code in more than one country: {0}")]
    AmbiguousAreaCode(String),

    #[error("'{candidate}': {reason}")]
    InvalidEmail {
        candidate: String,
        reason: &'static str,
    },

    #[error("Invalid (empty) name")]
    EmptyName,

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Split a phone cell on `/` or `|` and normalize each entry.
///
/// Returns the accepted numbers and the rejected entries, both in cell order.
pub fn parse_phones(value: &str) -> (Vec<String>, Vec<FieldError>) {
    let mut phones = Vec::new();
    let mut errors = Vec::new();
    for candidate in value.split(['/', '|']) {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        match normalize_phone(candidate) {
            Ok(phone) => phones.push(phone),
            Err(e) => errors.push(e),
        }
    }
    (phones, errors)
}

fn normalize_phone(candidate: &str) -> Result<String, FieldError> {
    let digits: String = candidate
        .chars()
        .filter(|c| *c == '+' || c.is_ascii_digit())
        .collect();

    if digits.starts_with('+') {
        return Ok(digits);
    }
    if digits.contains('+') {
        return Err(FieldError::MisplacedPlus(candidate.to_string()));
    }
    if let Some(rest) = digits.strip_prefix("011") {
        return Ok(format!("+{}", rest));
    }
    if digits.len() < 10 {
        return Err(FieldError::TooFewDigits(candidate.to_string()));
    }
    if digits.len() > 10 {
        return Ok(format!("+{}", digits));
    }

    let area_code = &digits[..3];
    if matches!(&digits[3..4], "0" | "1") {
        Err(FieldError::InvalidExchange(candidate.to_string()))
    } else if PERSONAL_AREA_CODES.contains(&area_code) {
        Err(FieldError::PersonalAreaCode(candidate.to_string()))
    } else if AMBIGUOUS_AREA_CODES.contains(&area_code) {
        Err(FieldError::AmbiguousAreaCode(candidate.to_string()))
    } else {
        Ok(format!("+1{}", digits))
    }
}

/// Split an email cell on `,`, `;`, `|` or `/` and check each entry.
///
/// Blank entries and the literal `none` are ignored silently. Accepted
/// addresses have their domain lowercased.
pub fn parse_emails(value: &str) -> (Vec<String>, Vec<FieldError>) {
    let mut emails = Vec::new();
    let mut errors = Vec::new();
    for candidate in value.split([',', ';', '|', '/']) {
        let candidate = candidate.trim();
        if candidate.is_empty() || candidate.eq_ignore_ascii_case("none") {
            continue;
        }
        match normalize_email(candidate) {
            Ok(email) => emails.push(email),
            Err(e) => errors.push(e),
        }
    }
    (emails, errors)
}

fn normalize_email(candidate: &str) -> Result<String, FieldError> {
    let invalid = |reason: &'static str| FieldError::InvalidEmail {
        candidate: candidate.to_string(),
        reason,
    };

    let (local, domain) = candidate
        .rsplit_once('@')
        .ok_or_else(|| invalid("must have an @-sign"))?;

    if local.is_empty() {
        return Err(invalid("there must be something before the @-sign"));
    }
    if local.contains('@') {
        return Err(invalid("only one @-sign is allowed"));
    }
    if local.len() > 64 {
        return Err(invalid("the part before the @-sign is too long"));
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(invalid("misplaced period before the @-sign"));
    }
    if !local.chars().all(is_local_char) {
        return Err(invalid("invalid character before the @-sign"));
    }

    if domain.is_empty() {
        return Err(invalid("there must be something after the @-sign"));
    }
    if !domain.contains('.') {
        return Err(invalid("the part after the @-sign should have a period"));
    }
    let domain = domain.to_ascii_lowercase();
    let labels_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err(invalid("the part after the @-sign is not a valid domain"));
    }

    Ok(format!("{}@{}", local, domain))
}

fn is_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-=?^_`{}~.".contains(c)
}

/// Trimmed name, or `if_missing` when blank.
pub fn parse_name(value: &str, if_missing: Option<&str>) -> Result<String, FieldError> {
    let candidate = value.trim();
    if !candidate.is_empty() {
        return Ok(candidate.to_string());
    }
    match if_missing {
        Some(fallback) if !fallback.is_empty() => Ok(fallback.to_string()),
        _ => Err(FieldError::EmptyName),
    }
}

/// A creation timestamp rendered as epoch seconds.
///
/// Timestamps without an offset are read as UTC. A bare date means midnight.
pub fn parse_uid(value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    parse_timestamp(value)
        .map(|secs| secs.to_string())
        .ok_or_else(|| FieldError::InvalidTimestamp(value.to_string()))
}

fn parse_timestamp(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
    {
        return Some(dt.and_utc().timestamp());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ====================================================================
    // Phones
    // ====================================================================

    #[test]
    fn test_ten_digit_number_gets_country_code() {
        let (phones, errors) = parse_phones("(415) 555-0100");
        assert_eq!(phones, vec!["+14155550100"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_leading_plus_kept_verbatim() {
        let (phones, _) = parse_phones("+44 20 7946 0958");
        assert_eq!(phones, vec!["+442079460958"]);
    }

    #[test]
    fn test_international_prefix_rewritten() {
        let (phones, _) = parse_phones("011 33 1 23 45 67 89");
        assert_eq!(phones, vec!["+33123456789"]);
    }

    #[test]
    fn test_long_number_gets_plus() {
        let (phones, _) = parse_phones("14155550100");
        assert_eq!(phones, vec!["+14155550100"]);
    }

    #[test]
    fn test_multiple_entries_split() {
        let (phones, errors) = parse_phones("415-555-0100 / 212-555-0199|");
        assert_eq!(phones, vec!["+14155550100", "+12125550199"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_phone_rejections() {
        let (phones, errors) =
            parse_phones("555-0100|415+555-0100|415-155-0100|500-555-0100|664-555-0100");
        assert!(phones.is_empty());
        assert_eq!(
            errors,
            vec![
                FieldError::TooFewDigits("555-0100".into()),
                FieldError::MisplacedPlus("415+555-0100".into()),
                FieldError::InvalidExchange("415-155-0100".into()),
                FieldError::PersonalAreaCode("500-555-0100".into()),
                FieldError::AmbiguousAreaCode("664-555-0100".into()),
            ]
        );
    }

    #[test]
    fn test_blank_phone_cell() {
        let (phones, errors) = parse_phones("   ");
        assert!(phones.is_empty());
        assert!(errors.is_empty());
    }

    // ====================================================================
    // Emails
    // ====================================================================

    #[test]
    fn test_email_domain_lowercased() {
        let (emails, errors) = parse_emails("Ada.Lovelace@Example.COM");
        assert_eq!(emails, vec!["Ada.Lovelace@example.com"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email_separators_and_none() {
        let (emails, errors) = parse_emails("a@x.org, None; b@y.net | /c@z.io");
        assert_eq!(emails, vec!["a@x.org", "b@y.net", "c@z.io"]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_email_rejections() {
        let (emails, errors) = parse_emails("plainaddress,@x.org,a@localhost,a..b@x.org,a@-x.org");
        assert!(emails.is_empty());
        assert_eq!(errors.len(), 5);
        assert!(errors[0].to_string().starts_with("'plainaddress'"));
    }

    // ====================================================================
    // Names and uids
    // ====================================================================

    #[test]
    fn test_name_trimmed_with_fallback() {
        assert_eq!(parse_name("  Ada ", None).unwrap(), "Ada");
        assert_eq!(parse_name("", Some("Ada")).unwrap(), "Ada");
        assert_eq!(parse_name(" ", None).unwrap_err(), FieldError::EmptyName);
    }

    #[test]
    fn test_uid_from_timestamp_formats() {
        assert_eq!(parse_uid("2022-04-15 05:20:00").unwrap(), "1650000000");
        assert_eq!(parse_uid("2022-04-15T05:20:00Z").unwrap(), "1650000000");
        assert_eq!(parse_uid("04/15/2022 05:20:00").unwrap(), "1650000000");
        assert_eq!(parse_uid("04/15/2022 05:20 AM").unwrap(), "1650000000");
        assert_eq!(parse_uid("1970-01-02").unwrap(), "86400");
    }

    #[test]
    fn test_uid_rejects_garbage() {
        assert!(matches!(
            parse_uid(" yesterday "),
            Err(FieldError::InvalidTimestamp(v)) if v == "yesterday"
        ));
    }
}
