//! CSV subscriber-import parsing and validation.
//!
//! The dashboard uploads a CSV with a header row: an `email` column is
//! required, `name` and `source` are optional. Rows that fail
//! validation are reported back with their line number, never silently
//! dropped; duplicate emails within one file are collapsed to the first
//! occurrence.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

/// One raw CSV row as uploaded. Column order does not matter; columns
/// beyond the known three are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// A validated subscriber ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubscriber {
    /// Lower-cased, trimmed, syntax-checked.
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

/// A row that failed validation, reported back to the uploader.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based line number in the uploaded file (the header is line 1).
    pub row: usize,
    pub message: String,
}

/// The outcome of parsing one uploaded file.
#[derive(Debug, Default)]
pub struct ImportParse {
    pub subscribers: Vec<ParsedSubscriber>,
    pub errors: Vec<RowError>,
    /// Rows dropped because an earlier row in the same file had the
    /// same email.
    pub duplicates: usize,
}

/// Normalize an email for storage and comparison.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse and validate an uploaded CSV file.
///
/// Fails outright only when the file has no usable header; individual
/// bad rows land in [`ImportParse::errors`].
pub fn parse_subscriber_csv(data: &[u8]) -> Result<ImportParse, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| CoreError::Validation(format!("Unreadable CSV header: {e}")))?
        .clone();

    if !headers.iter().any(|h| h.eq_ignore_ascii_case("email")) {
        return Err(CoreError::Validation(
            "CSV header must contain an 'email' column".into(),
        ));
    }

    let mut result = ImportParse::default();
    let mut seen = HashSet::new();

    for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
        // Line 1 is the header, so data rows start at line 2.
        let row = index + 2;

        let record = match record {
            Ok(r) => r,
            Err(e) => {
                result.errors.push(RowError {
                    row,
                    message: format!("Malformed row: {e}"),
                });
                continue;
            }
        };

        let email = normalize_email(&record.email);
        if email.is_empty() {
            result.errors.push(RowError {
                row,
                message: "Missing email".into(),
            });
            continue;
        }
        if !email.validate_email() {
            result.errors.push(RowError {
                row,
                message: format!("Invalid email '{email}'"),
            });
            continue;
        }

        if !seen.insert(email.clone()) {
            result.duplicates += 1;
            continue;
        }

        result.subscribers.push(ParsedSubscriber {
            email,
            name: record.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            source: record
                .source
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }

    Ok(result)
}
