//! `rusqlite`-backed persistence for the blocklist (§6: "Two address-sorted
//! append-logs plus a history ring buffer").

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::snapshot::BlocklistSnapshot;

pub struct BlocklistDb {
    conn: Connection,
}

impl BlocklistDb {
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS blocked_emails (
                email TEXT PRIMARY KEY,
                note TEXT,
                added_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS blocked_domains (
                domain TEXT PRIMARY KEY,
                note TEXT,
                added_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                operation TEXT NOT NULL,
                target TEXT NOT NULL,
                note TEXT,
                before_count INTEGER NOT NULL,
                after_count INTEGER NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE blocked_emails (email TEXT PRIMARY KEY, note TEXT, added_at TEXT NOT NULL);
             CREATE TABLE blocked_domains (domain TEXT PRIMARY KEY, note TEXT, added_at TEXT NOT NULL);
             CREATE TABLE history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL, operation TEXT NOT NULL, target TEXT NOT NULL,
                note TEXT, before_count INTEGER NOT NULL, after_count INTEGER NOT NULL
             );",
        )?;
        Ok(Self { conn })
    }

    pub fn load_snapshot(&self) -> Result<BlocklistSnapshot> {
        let mut emails = std::collections::BTreeSet::new();
        let mut stmt = self.conn.prepare("SELECT email FROM blocked_emails")?;
        for row in stmt.query_map([], |r| r.get::<_, String>(0))? {
            emails.insert(row?);
        }
        let mut domains = std::collections::BTreeSet::new();
        let mut stmt = self.conn.prepare("SELECT domain FROM blocked_domains")?;
        for row in stmt.query_map([], |r| r.get::<_, String>(0))? {
            domains.insert(row?);
        }
        Ok(BlocklistSnapshot { emails, domains })
    }

    pub fn insert_email(&self, email: &str, note: Option<&str>, added_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO blocked_emails (email, note, added_at) VALUES (?1, ?2, ?3)",
            params![email, note, added_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_email(&self, email: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM blocked_emails WHERE email = ?1", params![email])?;
        Ok(())
    }

    pub fn insert_domain(&self, domain: &str, note: Option<&str>, added_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO blocked_domains (domain, note, added_at) VALUES (?1, ?2, ?3)",
            params![domain, note, added_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_domain(&self, domain: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM blocked_domains WHERE domain = ?1", params![domain])?;
        Ok(())
    }

    pub fn append_history(&self, event: &mailqual_model::BlocklistEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO history (timestamp, operation, target, note, before_count, after_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.timestamp.to_rfc3339(),
                format!("{:?}", event.operation),
                event.target,
                event.note,
                event.before_count as i64,
                event.after_count as i64,
            ],
        )?;
        Ok(())
    }
}
