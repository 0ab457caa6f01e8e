//! [`BlocklistService`]: the component described in §4.B.
//!
//! Readers take a lock-free `Arc` clone of the current [`BlocklistSnapshot`]
//! via `arc_swap::ArcSwap`; writers serialize through a `Mutex` and install a
//! freshly built snapshot, matching §5's copy-on-write shared-resource
//! policy.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::Utc;
use mailqual_model::{BlocklistEvent, BlocklistOperation};

use crate::error::{BlocklistError, Result};
use crate::history::{History, inverse};
use crate::import::{ImportPolicy, parse_import_rows};
use crate::snapshot::BlocklistSnapshot;
use crate::store::BlocklistDb;

const DEFAULT_PROBLEMATIC_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BlocklistStats {
    pub email_count: usize,
    pub domain_count: usize,
}

pub struct BlocklistService {
    snapshot: ArcSwap<BlocklistSnapshot>,
    write_lock: Mutex<()>,
    history: Mutex<History>,
    db: BlocklistDb,
    problematic_threshold: usize,
}

impl BlocklistService {
    /// Open (creating if absent) the persistent blocklist store at `dir`.
    pub fn init(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| BlocklistError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let db = BlocklistDb::open(&dir.join("blocklist.sqlite3"))?;
        Self::from_db(db)
    }

    /// In-memory service, for tests and short-lived CLI invocations that
    /// import-then-export without needing durability.
    pub fn in_memory() -> Result<Self> {
        Self::from_db(BlocklistDb::open_in_memory()?)
    }

    fn from_db(db: BlocklistDb) -> Result<Self> {
        let snapshot = db.load_snapshot()?;
        Ok(Self {
            snapshot: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
            history: Mutex::new(History::new()),
            db,
            problematic_threshold: DEFAULT_PROBLEMATIC_THRESHOLD,
        })
    }

    pub fn load(&self) -> Arc<BlocklistSnapshot> {
        self.snapshot.load_full()
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.load().contains_email(email)
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.load().contains_domain(domain)
    }

    pub fn stats(&self) -> BlocklistStats {
        let s = self.load();
        BlocklistStats {
            email_count: s.emails.len(),
            domain_count: s.domains.len(),
        }
    }

    pub fn add_email(&self, email: &str, note: Option<&str>) -> Result<()> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let current = self.load();
        if current.emails.contains(email) {
            return Err(BlocklistError::DuplicateEntry {
                target: email.to_string(),
            });
        }
        let before = current.emails.len();
        let mut next = (*current).clone();
        next.emails.insert(email.to_string());
        let after = next.emails.len();

        self.db.insert_email(email, note, Utc::now())?;
        self.record_event(BlocklistOperation::AddEmail, email, note, before, after)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    pub fn add_domain(&self, domain: &str, note: Option<&str>) -> Result<()> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let current = self.load();
        if current.domains.contains(domain) {
            return Err(BlocklistError::DuplicateEntry {
                target: domain.to_string(),
            });
        }
        let before = current.domains.len();
        let mut next = (*current).clone();
        next.domains.insert(domain.to_string());
        let after = next.domains.len();

        self.db.insert_domain(domain, note, Utc::now())?;
        self.record_event(BlocklistOperation::AddDomain, domain, note, before, after)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    pub fn remove_email(&self, email: &str) -> Result<()> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let current = self.load();
        if !current.emails.contains(email) {
            return Err(BlocklistError::NotFound {
                target: email.to_string(),
            });
        }
        let before = current.emails.len();
        let mut next = (*current).clone();
        next.emails.remove(email);
        let after = next.emails.len();

        self.db.remove_email(email)?;
        self.record_event(BlocklistOperation::RemoveEmail, email, None, before, after)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    pub fn remove_domain(&self, domain: &str) -> Result<()> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let current = self.load();
        if !current.domains.contains(domain) {
            return Err(BlocklistError::NotFound {
                target: domain.to_string(),
            });
        }
        let before = current.domains.len();
        let mut next = (*current).clone();
        next.domains.remove(domain);
        let after = next.domains.len();

        self.db.remove_domain(domain)?;
        self.record_event(BlocklistOperation::RemoveDomain, domain, None, before, after)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    /// Import a CSV blocklist log, adding every row whose status is in
    /// `policy.allowed_statuses`, then re-deriving problematic domains
    /// (§3: domains with ≥K blocked addresses) and promoting them.
    pub fn import_from_log(&self, reader: impl Read, policy: &ImportPolicy) -> Result<BTreeSet<String>> {
        let rows = parse_import_rows(reader)?;
        for row in &rows {
            if policy
                .allowed_statuses
                .contains(&row.status.to_lowercase())
            {
                // Import is idempotent: re-adding an already-blocked
                // address is a no-op, not a hard failure.
                match self.add_email(&row.email, Some(&row.status)) {
                    Ok(()) | Err(BlocklistError::DuplicateEntry { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        let promoted = self
            .load()
            .problematic_domains(self.problematic_threshold);
        for domain in &promoted {
            match self.add_domain(domain, Some("auto-promoted: problematic domain")) {
                Ok(()) | Err(BlocklistError::DuplicateEntry { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(promoted)
    }

    pub fn undo_last(&self) -> Result<BlocklistEvent> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let event = {
            let mut history = self.history.lock().expect("history lock poisoned");
            history.undo_last()?
        };
        self.apply_inverse(&event)?;
        Ok(event)
    }

    pub fn redo_last(&self) -> Result<BlocklistEvent> {
        let _guard = self.write_lock.lock().expect("write lock poisoned");
        let event = {
            let mut history = self.history.lock().expect("history lock poisoned");
            history.redo_last()?
        };
        self.apply_forward(&event)?;
        Ok(event)
    }

    fn apply_inverse(&self, event: &BlocklistEvent) -> Result<()> {
        self.apply_operation(inverse(event.operation), &event.target)
    }

    fn apply_forward(&self, event: &BlocklistEvent) -> Result<()> {
        self.apply_operation(event.operation, &event.target)
    }

    fn apply_operation(&self, operation: BlocklistOperation, target: &str) -> Result<()> {
        let current = self.load();
        let mut next = (*current).clone();
        match operation {
            BlocklistOperation::AddEmail => {
                next.emails.insert(target.to_string());
                self.db.insert_email(target, None, Utc::now())?;
            }
            BlocklistOperation::RemoveEmail => {
                next.emails.remove(target);
                self.db.remove_email(target)?;
            }
            BlocklistOperation::AddDomain => {
                next.domains.insert(target.to_string());
                self.db.insert_domain(target, None, Utc::now())?;
            }
            BlocklistOperation::RemoveDomain => {
                next.domains.remove(target);
                self.db.remove_domain(target)?;
            }
        }
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    fn record_event(
        &self,
        operation: BlocklistOperation,
        target: &str,
        note: Option<&str>,
        before_count: usize,
        after_count: usize,
    ) -> Result<()> {
        let event = BlocklistEvent {
            timestamp: Utc::now(),
            operation,
            target: target.to_string(),
            note: note.map(str::to_string),
            before_count,
            after_count,
        };
        self.db.append_history(&event)?;
        self.history
            .lock()
            .expect("history lock poisoned")
            .push(event);
        Ok(())
    }

    /// Export the current snapshot as newline-delimited `kind,target` rows,
    /// for the `blocklist_op { export }` operation in §6.
    pub fn export(&self) -> String {
        let snapshot = self.load();
        let mut out = String::new();
        for email in &snapshot.emails {
            out.push_str("email,");
            out.push_str(email);
            out.push('\n');
        }
        for domain in &snapshot.domains {
            out.push_str("domain,");
            out.push_str(domain);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_contains() {
        let svc = BlocklistService::in_memory().unwrap();
        svc.add_email("a@gmail.com", None).unwrap();
        assert!(svc.contains_email("a@gmail.com"));
    }

    #[test]
    fn duplicate_add_errors() {
        let svc = BlocklistService::in_memory().unwrap();
        svc.add_domain("gmail.com", None).unwrap();
        assert!(matches!(
            svc.add_domain("gmail.com", None),
            Err(BlocklistError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn domain_block_covers_subdomain() {
        let svc = BlocklistService::in_memory().unwrap();
        svc.add_domain("example.com", None).unwrap();
        assert!(svc.contains_domain("mail.example.com"));
    }

    #[test]
    fn undo_then_redo_restores_state() {
        let svc = BlocklistService::in_memory().unwrap();
        svc.add_email("a@gmail.com", None).unwrap();
        svc.undo_last().unwrap();
        assert!(!svc.contains_email("a@gmail.com"));
        svc.redo_last().unwrap();
        assert!(svc.contains_email("a@gmail.com"));
    }

    #[test]
    fn import_then_domain_promotion() {
        let svc = BlocklistService::in_memory().unwrap();
        let csv = "email;status\n\
            a1@gmail.com;Hard bounce\n\
            a2@gmail.com;Hard bounce\n\
            a3@gmail.com;Hard bounce\n\
            a4@gmail.com;Hard bounce\n\
            a5@gmail.com;Hard bounce\n\
            a6@gmail.com;Hard bounce\n\
            b1@yahoo.com;Unsubscribed\n";
        let policy = ImportPolicy::default();
        let promoted = svc.import_from_log(csv.as_bytes(), &policy).unwrap();
        assert_eq!(svc.stats().email_count, 7);
        assert!(promoted.contains("gmail.com"));
        assert!(svc.contains_domain("gmail.com"));
        assert!(!svc.contains_domain("yahoo.com"));
    }
}
