use std::cell::{Cell, RefCell};
use std::fs;
use std::path::Path;
use std::rc::Rc;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{LexdeskError, Result};

const SNAPSHOT_DB: &str = "lexdesk.db";
const SCHEMA_VERSION: &str = "1";

/// Name of the persisted snapshot record.
pub const SNAPSHOT_NAME: &str = "app-storage";

/// Durable home of the persisted catalog snapshot
pub trait SnapshotStorage {
    /// Read the snapshot body, `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the snapshot body. On error the previous body must survive.
    fn save(&self, body: &str) -> Result<()>;
}

/// SQLite-backed snapshot storage holding one named record
pub struct SqliteSnapshots {
    conn: Connection,
    name: String,
}

impl SqliteSnapshots {
    /// Open or create the snapshot database inside `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SNAPSHOT_DB);
        let conn = Connection::open(path)?;

        let storage = Self {
            conn,
            name: SNAPSHOT_NAME.to_string(),
        };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshots (
                name TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// When the snapshot was last written
    pub fn updated_at(&self) -> Result<Option<String>> {
        let result: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM snapshots WHERE name = ?1",
                [&self.name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }
}

impl SnapshotStorage for SqliteSnapshots {
    fn load(&self) -> Result<Option<String>> {
        let result: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM snapshots WHERE name = ?1",
                [&self.name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    fn save(&self, body: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO snapshots (name, body, updated_at) VALUES (?1, ?2, ?3)",
            params![self.name, body, Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// In-memory snapshot storage. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemorySnapshots {
    body: Rc<RefCell<Option<String>>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(body: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.body.borrow_mut() = Some(body.into());
        storage
    }

    /// Make subsequent saves fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn body(&self) -> Option<String> {
        self.body.borrow().clone()
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl SnapshotStorage for MemorySnapshots {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.body.borrow().clone())
    }

    fn save(&self, body: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(LexdeskError::Storage("write refused".to_string()));
        }
        *self.body.borrow_mut() = Some(body.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_db() {
        let tmp = TempDir::new().unwrap();
        let _storage = SqliteSnapshots::open(tmp.path()).unwrap();
        assert!(tmp.path().join(SNAPSHOT_DB).exists());
    }

    #[test]
    fn test_load_before_save_is_none() {
        let tmp = TempDir::new().unwrap();
        let storage = SqliteSnapshots::open(tmp.path()).unwrap();
        assert_eq!(storage.load().unwrap(), None);
        assert_eq!(storage.updated_at().unwrap(), None);
    }

    #[test]
    fn test_save_replaces_single_record() {
        let tmp = TempDir::new().unwrap();
        let storage = SqliteSnapshots::open(tmp.path()).unwrap();
        storage.save("{\"a\":1}").unwrap();
        storage.save("{\"a\":2}").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(storage.updated_at().unwrap().is_some());

        let reopened = SqliteSnapshots::open(tmp.path()).unwrap();
        assert_eq!(reopened.load().unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn test_memory_failed_write_keeps_previous_body() {
        let storage = MemorySnapshots::with_body("old");
        storage.set_fail_writes(true);
        assert!(storage.save("new").is_err());
        assert_eq!(storage.body().as_deref(), Some("old"));
        assert_eq!(storage.writes(), 0);
    }
}
