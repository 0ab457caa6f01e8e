//! [`MetadataStore`]: the component described in §4.C.
//!
//! Backed by `rusqlite` for durability, fronted by a `dashmap` read cache so
//! repeated `get`/`bulk_get` calls within a run don't round-trip through
//! SQLite for addresses that haven't changed.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mailqual_model::{Address, Metadata};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::error::Result;
use crate::provenance::{ProvenanceEntry, ProvenanceMap, should_overwrite};

/// Identifies the file a `put` call's values were observed in, for the
/// no-op-on-identical-hash-reimport rule and for per-field provenance.
#[derive(Debug, Clone)]
pub struct PutSource {
    pub source_file_id: String,
    pub content_hash: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetadataStats {
    pub total_addresses: usize,
    pub by_country: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub company: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub domain: Option<String>,
}

struct StoredRow {
    metadata: Metadata,
    provenance: ProvenanceMap,
}

pub struct MetadataStore {
    conn: Mutex<Connection>,
    cache: DashMap<String, (Metadata, ProvenanceMap)>,
}

impl MetadataStore {
    pub fn init(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).ok();
        let conn = Connection::open(dir.join("metadata.sqlite3"))?;
        Self::from_conn(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metadata (
                address TEXT PRIMARY KEY,
                metadata_json TEXT NOT NULL,
                provenance_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS imported_files (
                source_file_id TEXT PRIMARY KEY,
                content_hash TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            cache: DashMap::new(),
        })
    }

    /// Merge `metadata` into the stored row for `address`, per §4.C's
    /// field-by-field recency policy. Returns `false` without writing
    /// anything if `source.content_hash` matches what's already on record
    /// for `source.source_file_id` (re-importing an identical file is a
    /// no-op).
    pub fn put(&self, address: &Address, metadata: &Metadata, source: &PutSource) -> Result<bool> {
        let conn = self.conn.lock().expect("metadata store lock poisoned");

        let existing_hash: Option<String> = conn
            .query_row(
                "SELECT content_hash FROM imported_files WHERE source_file_id = ?1",
                params![source.source_file_id],
                |r| r.get(0),
            )
            .optional()?;
        if existing_hash.as_deref() == Some(source.content_hash.as_str()) {
            return Ok(false);
        }
        conn.execute(
            "INSERT OR REPLACE INTO imported_files (source_file_id, content_hash) VALUES (?1, ?2)",
            params![source.source_file_id, source.content_hash],
        )?;

        let key = address.as_str().to_string();
        let mut row = self.load_row(&conn, &key)?.unwrap_or_default();
        merge_metadata(&mut row.metadata, &mut row.provenance, metadata, source);

        let metadata_json = serde_json::to_string(&row.metadata).expect("Metadata serializes");
        let provenance_json =
            serde_json::to_string(&row.provenance).expect("provenance map serializes");
        conn.execute(
            "INSERT OR REPLACE INTO metadata (address, metadata_json, provenance_json) VALUES (?1, ?2, ?3)",
            params![key, metadata_json, provenance_json],
        )?;

        self.cache
            .insert(key, (row.metadata.clone(), row.provenance.clone()));
        Ok(true)
    }

    pub fn get(&self, address: &Address) -> Result<Option<Metadata>> {
        let key = address.as_str().to_string();
        if let Some(entry) = self.cache.get(&key) {
            return Ok(Some(entry.0.clone()));
        }
        let conn = self.conn.lock().expect("metadata store lock poisoned");
        let Some(row) = self.load_row(&conn, &key)? else {
            return Ok(None);
        };
        self.cache
            .insert(key, (row.metadata.clone(), row.provenance.clone()));
        Ok(Some(row.metadata))
    }

    pub fn bulk_get(&self, addresses: &[Address]) -> Result<BTreeMap<Address, Metadata>> {
        let mut out = BTreeMap::new();
        for address in addresses {
            if let Some(metadata) = self.get(address)? {
                out.insert(address.clone(), metadata);
            }
        }
        Ok(out)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("metadata store lock poisoned");
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM metadata", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    pub fn stats(&self) -> Result<MetadataStats> {
        let conn = self.conn.lock().expect("metadata store lock poisoned");
        let mut stmt = conn.prepare("SELECT metadata_json FROM metadata")?;
        let mut stats = MetadataStats::default();
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        for row in rows {
            let json = row?;
            let metadata: Metadata = serde_json::from_str(&json).unwrap_or_default();
            stats.total_addresses += 1;
            if let Some(country) = &metadata.country {
                *stats.by_country.entry(country.clone()).or_insert(0) += 1;
            }
            if let Some(category) = &metadata.category {
                *stats.by_category.entry(category.clone()).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }

    pub fn search_by(&self, filter: &SearchFilter) -> Result<Vec<(Address, Metadata)>> {
        let conn = self.conn.lock().expect("metadata store lock poisoned");
        let mut stmt = conn.prepare("SELECT address, metadata_json FROM metadata")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (address_str, metadata_json) = row?;
            let metadata: Metadata = serde_json::from_str(&metadata_json).unwrap_or_default();
            if !matches_filter(&address_str, &metadata, filter) {
                continue;
            }
            let Ok(address) = Address::parse(&address_str) else {
                continue;
            };
            out.push((address, metadata));
        }
        Ok(out)
    }

    fn load_row(&self, conn: &Connection, key: &str) -> Result<Option<StoredRow>> {
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT metadata_json, provenance_json FROM metadata WHERE address = ?1",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let Some((metadata_json, provenance_json)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredRow {
            metadata: serde_json::from_str(&metadata_json).unwrap_or_default(),
            provenance: serde_json::from_str(&provenance_json).unwrap_or_default(),
        }))
    }
}

impl Default for StoredRow {
    fn default() -> Self {
        Self {
            metadata: Metadata::default(),
            provenance: ProvenanceMap::default(),
        }
    }
}

fn matches_filter(address: &str, metadata: &Metadata, filter: &SearchFilter) -> bool {
    if let Some(company) = &filter.company {
        if metadata.company_name.as_deref() != Some(company.as_str()) {
            return false;
        }
    }
    if let Some(country) = &filter.country {
        if metadata.country.as_deref() != Some(country.as_str()) {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        if metadata.category.as_deref() != Some(category.as_str()) {
            return false;
        }
    }
    if let Some(domain) = &filter.domain {
        if !address.ends_with(domain.as_str()) {
            return false;
        }
    }
    true
}

/// Field-by-field merge per §4.C: a new non-empty value overwrites an old
/// non-empty value only when it is strictly newer; unknown (`extras`)
/// fields merge the same way, keyed by name.
fn merge_metadata(
    existing: &mut Metadata,
    provenance: &mut ProvenanceMap,
    incoming: &Metadata,
    source: &PutSource,
) {
    macro_rules! merge_field {
        ($field:ident, $name:literal) => {
            if let Some(value) = &incoming.$field {
                let entry = ProvenanceEntry {
                    source_file_id: source.source_file_id.clone(),
                    observed_at: source.observed_at,
                };
                if should_overwrite(provenance.get($name), &entry) {
                    existing.$field = Some(value.clone());
                    provenance.insert($name.to_string(), entry);
                }
            }
        };
    }
    merge_field!(source_url, "source_url");
    merge_field!(page_title, "page_title");
    merge_field!(company_name, "company_name");
    merge_field!(phone, "phone");
    merge_field!(country, "country");
    merge_field!(city, "city");
    merge_field!(address_line, "address_line");
    merge_field!(meta_description, "meta_description");
    merge_field!(meta_keywords, "meta_keywords");
    merge_field!(category, "category");
    merge_field!(validation_status, "validation_status");
    merge_field!(validation_log, "validation_log");
    merge_field!(validation_date, "validation_date");

    for (key, value) in &incoming.extras {
        let field_key = format!("extras.{key}");
        let entry = ProvenanceEntry {
            source_file_id: source.source_file_id.clone(),
            observed_at: source.observed_at,
        };
        if should_overwrite(provenance.get(&field_key), &entry) {
            existing.extras.insert(key.clone(), value.clone());
            provenance.insert(field_key, entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, hash: &str, secs: i64) -> PutSource {
        PutSource {
            source_file_id: id.to_string(),
            content_hash: hash.to_string(),
            observed_at: DateTime::from_timestamp(secs, 0).unwrap(),
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = MetadataStore::in_memory().unwrap();
        let address = Address::parse("lee@acme.io").unwrap();
        let mut metadata = Metadata::default();
        metadata.company_name = Some("ACME Ltd".to_string());
        store.put(&address, &metadata, &source("f1", "h1", 1)).unwrap();

        let fetched = store.get(&address).unwrap().unwrap();
        assert_eq!(fetched.company_name.as_deref(), Some("ACME Ltd"));
    }

    #[test]
    fn reimporting_identical_hash_is_noop() {
        let store = MetadataStore::in_memory().unwrap();
        let address = Address::parse("lee@acme.io").unwrap();
        let mut metadata = Metadata::default();
        metadata.company_name = Some("ACME Ltd".to_string());
        let src = source("f1", "h1", 1);
        assert!(store.put(&address, &metadata, &src).unwrap());
        assert!(!store.put(&address, &metadata, &src).unwrap());
    }

    #[test]
    fn newer_write_overwrites_older_field() {
        let store = MetadataStore::in_memory().unwrap();
        let address = Address::parse("lee@acme.io").unwrap();
        let mut older = Metadata::default();
        older.country = Some("Italy".to_string());
        store.put(&address, &older, &source("f1", "h1", 1)).unwrap();

        let mut newer = Metadata::default();
        newer.country = Some("France".to_string());
        store.put(&address, &newer, &source("f2", "h2", 2)).unwrap();

        let fetched = store.get(&address).unwrap().unwrap();
        assert_eq!(fetched.country.as_deref(), Some("France"));
    }

    #[test]
    fn older_write_does_not_overwrite_newer_field() {
        let store = MetadataStore::in_memory().unwrap();
        let address = Address::parse("lee@acme.io").unwrap();
        let mut newer = Metadata::default();
        newer.country = Some("France".to_string());
        store.put(&address, &newer, &source("f2", "h2", 5)).unwrap();

        let mut older = Metadata::default();
        older.country = Some("Italy".to_string());
        store.put(&address, &older, &source("f1", "h1", 1)).unwrap();

        let fetched = store.get(&address).unwrap().unwrap();
        assert_eq!(fetched.country.as_deref(), Some("France"));
    }

    #[test]
    fn cross_format_enrichment_carries_over() {
        let store = MetadataStore::in_memory().unwrap();
        let address = Address::parse("lee@acme.io").unwrap();
        let mut structured = Metadata::default();
        structured.company_name = Some("ACME Ltd".to_string());
        structured.country = Some("Italy".to_string());
        store
            .put(&address, &structured, &source("structured.xml", "h1", 1))
            .unwrap();

        // A later plain-text record with no metadata should not erase what
        // the structured import already established.
        let empty = Metadata::default();
        store
            .put(&address, &empty, &source("plain.txt", "h2", 2))
            .unwrap();

        let fetched = store.get(&address).unwrap().unwrap();
        assert_eq!(fetched.company_name.as_deref(), Some("ACME Ltd"));
        assert_eq!(fetched.country.as_deref(), Some("Italy"));
    }
}
