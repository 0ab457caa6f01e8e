//! Metadata sidecars: newline-delimited JSON and a stable-column CSV (§4.H, §6).

use std::path::{Path, PathBuf};

use mailqual_model::{Address, Metadata};
use serde::Serialize;

use crate::error::Result;
use crate::writer::AtomicFileWriter;

#[derive(Serialize)]
struct JsonSidecarRow<'a> {
    address: &'a str,
    #[serde(flatten)]
    metadata: &'a Metadata,
}

/// Write one JSON object per line, address ascending.
pub fn write_json_sidecar(
    dir: &Path,
    filename: &str,
    rows: &[(Address, Metadata)],
) -> Result<PathBuf> {
    let mut sorted: Vec<&(Address, Metadata)> = rows.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut buf = String::new();
    for (address, metadata) in sorted {
        let row = JsonSidecarRow {
            address: address.as_str(),
            metadata,
        };
        buf.push_str(&serde_json::to_string(&row)?);
        buf.push('\n');
    }
    AtomicFileWriter::write_bytes(dir, filename, buf.as_bytes())
}

const CSV_COLUMNS: [&str; 14] = [
    "address",
    "source_url",
    "page_title",
    "company_name",
    "phone",
    "country",
    "city",
    "address_line",
    "meta_description",
    "meta_keywords",
    "category",
    "validation_status",
    "validation_log",
    "validation_date",
];

/// Write the stable-column CSV sidecar, address ascending, RFC 4180
/// quoting via the `csv` crate's default writer.
pub fn write_csv_sidecar(
    dir: &Path,
    filename: &str,
    rows: &[(Address, Metadata)],
) -> Result<PathBuf> {
    let mut sorted: Vec<&(Address, Metadata)> = rows.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for (address, metadata) in sorted {
        writer.write_record([
            address.as_str(),
            metadata.source_url.as_deref().unwrap_or(""),
            metadata.page_title.as_deref().unwrap_or(""),
            metadata.company_name.as_deref().unwrap_or(""),
            metadata.phone.as_deref().unwrap_or(""),
            metadata.country.as_deref().unwrap_or(""),
            metadata.city.as_deref().unwrap_or(""),
            metadata.address_line.as_deref().unwrap_or(""),
            metadata.meta_description.as_deref().unwrap_or(""),
            metadata.meta_keywords.as_deref().unwrap_or(""),
            metadata.category.as_deref().unwrap_or(""),
            metadata.validation_status.as_deref().unwrap_or(""),
            metadata.validation_log.as_deref().unwrap_or(""),
            metadata.validation_date.as_deref().unwrap_or(""),
        ])?;
    }
    let bytes = writer.into_inner().expect("in-memory writer never fails to flush");
    AtomicFileWriter::write_bytes(dir, filename, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sidecar_is_address_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            (Address::parse("b@example.com").unwrap(), Metadata::default()),
            (Address::parse("a@example.com").unwrap(), Metadata::default()),
        ];
        let path = write_json_sidecar(dir.path(), "meta.jsonl", &rows).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].contains("a@example.com"));
        assert!(lines[1].contains("b@example.com"));
    }

    #[test]
    fn csv_sidecar_has_stable_header() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![(Address::parse("a@example.com").unwrap(), Metadata::default())];
        let path = write_csv_sidecar(dir.path(), "meta.csv", &rows).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("address,source_url,page_title"));
    }
}
