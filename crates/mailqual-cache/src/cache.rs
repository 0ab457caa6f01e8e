//! [`ProcessingCache`]: the component described in §4.D.
//!
//! Schema per §6: `files(path, hash, size, mtime, summary_json)` and
//! `addresses(address, classification, source_hash, processed_at)`, both
//! indexed on their primary key.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use mailqual_model::{Address, Classification, FileFingerprint};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{CacheError, Result};

/// Address-level dedup scope, selected per run (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeScope {
    /// Only addresses seen earlier in *this* pipeline invocation.
    BatchLocal,
    /// Addresses seen across all prior invocations too.
    Persistent,
}

pub struct ProcessingCache {
    conn: Mutex<Connection>,
    batch_seen: Mutex<BTreeSet<String>>,
}

impl ProcessingCache {
    pub fn init(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).ok();
        Self::from_conn(Connection::open(dir.join("cache.sqlite3"))?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                path TEXT PRIMARY KEY,
                hash TEXT NOT NULL,
                size INTEGER NOT NULL,
                mtime TEXT NOT NULL,
                summary_json TEXT
            );
            CREATE TABLE IF NOT EXISTS addresses (
                address TEXT PRIMARY KEY,
                classification TEXT NOT NULL,
                source_hash TEXT NOT NULL,
                processed_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            batch_seen: Mutex::new(BTreeSet::new()),
        })
    }

    /// True iff a fingerprint with the same `(path, content_hash)` was
    /// previously recorded successful.
    pub fn was_processed(&self, fingerprint: &FileFingerprint) -> Result<bool> {
        let conn = self.conn.lock().expect("cache lock poisoned");
        let (path, hash) = fingerprint.key();
        let stored_hash: Option<String> = conn
            .query_row(
                "SELECT hash FROM files WHERE path = ?1",
                params![path],
                |r| r.get(0),
            )
            .optional()
            .map_err(CacheError::from)?;
        Ok(stored_hash.as_deref() == Some(hash))
    }

    pub fn record_processed(&self, fingerprint: &FileFingerprint, summary: &serde_json::Value) -> Result<()> {
        let conn = self.conn.lock().expect("cache lock poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO files (path, hash, size, mtime, summary_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                fingerprint.path,
                fingerprint.content_hash,
                fingerprint.size as i64,
                fingerprint.mtime.to_rfc3339(),
                summary.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Record that `address` was classified from `source_hash`, for
    /// dedup. Always updates the persistent table and the in-memory
    /// batch-local set, so a single call serves both scopes.
    pub fn record_address(
        &self,
        address: &Address,
        classification: Classification,
        source_hash: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().expect("cache lock poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO addresses (address, classification, source_hash, processed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                address.as_str(),
                classification.to_string(),
                source_hash,
                Utc::now().to_rfc3339(),
            ],
        )?;
        self.batch_seen
            .lock()
            .expect("batch-seen lock poisoned")
            .insert(address.as_str().to_string());
        Ok(())
    }

    /// Union of addresses successfully classified, scoped per §4.D.
    pub fn seen_addresses(&self, scope: DedupeScope) -> Result<BTreeSet<String>> {
        match scope {
            DedupeScope::BatchLocal => {
                Ok(self.batch_seen.lock().expect("batch-seen lock poisoned").clone())
            }
            DedupeScope::Persistent => {
                let conn = self.conn.lock().expect("cache lock poisoned");
                let mut stmt = conn.prepare("SELECT address FROM addresses")?;
                let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
                let mut out = BTreeSet::new();
                for row in rows {
                    out.insert(row?);
                }
                Ok(out)
            }
        }
    }

    pub fn is_seen(&self, address: &str, scope: DedupeScope) -> Result<bool> {
        match scope {
            DedupeScope::BatchLocal => Ok(self
                .batch_seen
                .lock()
                .expect("batch-seen lock poisoned")
                .contains(address)),
            DedupeScope::Persistent => {
                let conn = self.conn.lock().expect("cache lock poisoned");
                let exists: Option<String> = conn
                    .query_row(
                        "SELECT address FROM addresses WHERE address = ?1",
                        params![address],
                        |r| r.get(0),
                    )
                    .optional()?;
                Ok(exists.is_some())
            }
        }
    }

    /// `cache_op { query }` (§6): counts and sizes.
    pub fn query_counts(&self) -> Result<(usize, usize)> {
        let conn = self.conn.lock().expect("cache lock poisoned");
        let files: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0))?;
        let addresses: i64 = conn.query_row("SELECT COUNT(*) FROM addresses", [], |r| r.get(0))?;
        Ok((files as usize, addresses as usize))
    }

    /// `cache_op { invalidate }`: drop all cached state, forcing a rebuild.
    pub fn invalidate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("cache lock poisoned");
        conn.execute_batch("DELETE FROM files; DELETE FROM addresses;")?;
        self.batch_seen.lock().expect("batch-seen lock poisoned").clear();
        Ok(())
    }

    /// `cache_op { vacuum }`: reclaim space after heavy churn.
    pub fn vacuum(&self) -> Result<()> {
        let conn = self.conn.lock().expect("cache lock poisoned");
        conn.execute_batch("VACUUM;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint(path: &str, hash: &str) -> FileFingerprint {
        FileFingerprint {
            path: path.to_string(),
            content_hash: hash.to_string(),
            size: 10,
            mtime: Utc::now(),
            row_count: 1,
            emitted_row_count: 1,
        }
    }

    #[test]
    fn unprocessed_file_is_not_cached() {
        let cache = ProcessingCache::in_memory().unwrap();
        assert!(!cache.was_processed(&fingerprint("a.txt", "h1")).unwrap());
    }

    #[test]
    fn recorded_file_is_skippable_next_run() {
        let cache = ProcessingCache::in_memory().unwrap();
        let fp = fingerprint("a.txt", "h1");
        cache
            .record_processed(&fp, &serde_json::json!({"clean": 1}))
            .unwrap();
        assert!(cache.was_processed(&fp).unwrap());
    }

    #[test]
    fn changed_content_hash_is_not_cached() {
        let cache = ProcessingCache::in_memory().unwrap();
        cache
            .record_processed(&fingerprint("a.txt", "h1"), &serde_json::json!({}))
            .unwrap();
        assert!(!cache.was_processed(&fingerprint("a.txt", "h2")).unwrap());
    }

    #[test]
    fn batch_local_scope_is_isolated_from_persistent_until_recorded() {
        let cache = ProcessingCache::in_memory().unwrap();
        let address = Address::parse("alice@example.com").unwrap();
        cache
            .record_address(&address, Classification::Clean, "h1")
            .unwrap();
        assert!(cache.is_seen("alice@example.com", DedupeScope::BatchLocal).unwrap());
        assert!(cache.is_seen("alice@example.com", DedupeScope::Persistent).unwrap());
    }

    #[test]
    fn invalidate_clears_both_tables() {
        let cache = ProcessingCache::in_memory().unwrap();
        cache
            .record_processed(&fingerprint("a.txt", "h1"), &serde_json::json!({}))
            .unwrap();
        cache.invalidate().unwrap();
        assert!(!cache.was_processed(&fingerprint("a.txt", "h1")).unwrap());
    }
}
