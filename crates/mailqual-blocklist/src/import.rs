//! CSV blocklist-log import (§4.B, §6): two row shapes, a status allowlist
//! gating which rows turn into blocklist entries.

use std::collections::BTreeSet;
use std::io::Read;

use crate::error::{BlocklistError, Result};

/// Statuses that, per §6's "configurable allowlist of statuses", trigger
/// addition to the blocklist by default.
pub fn default_allowed_statuses() -> BTreeSet<String> {
    [
        "hard bounce",
        "blocked",
        "complaint",
        "unsubscribed",
        "invalid",
        "spam-report",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[derive(Debug, Clone)]
pub struct ImportPolicy {
    pub allowed_statuses: BTreeSet<String>,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self {
            allowed_statuses: default_allowed_statuses(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportRow {
    pub email: String,
    pub status: String,
}

/// Parse a blocklist log, auto-detecting the two shapes named in §6:
/// a comma-separated log with header `st_text,ts,sub,frm,email,tag,mid,link`
/// (status is `st_text`), or a semicolon-separated log with an `email`
/// column and some status-bearing column.
pub fn parse_import_rows(mut reader: impl Read) -> Result<Vec<ImportRow>> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|source| BlocklistError::Io {
            path: std::path::PathBuf::from("<stream>"),
            source,
        })?;

    let delimiter = if buf.lines().next().is_some_and(|l| l.contains(';')) {
        b';'
    } else {
        b','
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(buf.as_bytes());

    let headers = csv_reader.headers()?.clone();
    let email_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("email"))
        .ok_or_else(|| BlocklistError::MalformedEntry {
            row: 0,
            message: "no 'email' column in header".to_string(),
        })?;
    let status_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("st_text") || h.to_lowercase().contains("status"))
        .ok_or_else(|| BlocklistError::MalformedEntry {
            row: 0,
            message: "no status column in header".to_string(),
        })?;

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row_num = (idx + 1) as u64;
        let email = record.get(email_idx).unwrap_or("").trim().to_string();
        let status = record.get(status_idx).unwrap_or("").trim().to_string();
        if email.is_empty() {
            continue;
        }
        rows.push(ImportRow { email, status });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_shape() {
        let csv = "st_text,ts,sub,frm,email,tag,mid,link\nHard bounce,2024-01-01,s,f,a@gmail.com,t,m,l\n";
        let rows = parse_import_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "a@gmail.com");
        assert_eq!(rows[0].status, "Hard bounce");
    }

    #[test]
    fn parses_semicolon_shape() {
        let csv = "email;status\nb@yahoo.com;Unsubscribed\n";
        let rows = parse_import_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "b@yahoo.com");
        assert_eq!(rows[0].status, "Unsubscribed");
    }

    #[test]
    fn default_policy_allows_hard_bounce() {
        let policy = ImportPolicy::default();
        assert!(policy.allowed_statuses.contains("hard bounce"));
    }

    #[test]
    fn default_policy_allows_hyphenated_spam_report() {
        let policy = ImportPolicy::default();
        assert!(policy.allowed_statuses.contains("spam-report"));
    }
}
