//! Key-value persistence ports for scroll restoration.
//!
//! This module provides:
//! - [`KeyValueStore`], the port the scroll cache writes through
//! - [`MemoryStore`], an in-process store with an optional byte quota
//! - [`SqliteStore`], a session-scoped store backed by SQLite
//!
//! The history-entry store lives in [`crate::history`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StorageError;

/// Database version for migrations.
const SCHEMA_VERSION: i32 = 1;

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// =========================================================================
// In-memory store
// =========================================================================

/// In-process store. A quota makes oversized writes fail the way browser
/// storage does; a disabled store fails every call.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values, in bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// A store whose every operation fails with `Unavailable`.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_enabled()?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        self.entries.remove(key);
        Ok(())
    }
}

// =========================================================================
// SQLite store
// =========================================================================

/// A stored app session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub started_at: DateTime<Utc>,
}

/// Session-scoped store backed by SQLite.
///
/// Every `open*` call starts a fresh session; entries written in one session
/// are invisible to the next, matching tab-scoped session storage.
pub struct SqliteStore {
    conn: Connection,
    session_id: i64,
}

impl SqliteStore {
    /// Open or create the database at the default location.
    pub fn open_default() -> Result<Self> {
        let path = default_db_path()?;
        Self::open(&path)
    }

    /// Open or create the database at a specific path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        initialize(&conn)?;
        let session_id = start_session(&conn)?;
        Ok(Self { conn, session_id })
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    /// Switch to an earlier session, e.g. to resume after a reload.
    pub fn resume_session(&mut self, session_id: i64) -> Result<()> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM sessions WHERE id = ?1", params![session_id], |_| Ok(()))
            .optional()?
            .is_some();
        anyhow::ensure!(exists, "no such session: {session_id}");
        self.session_id = session_id;
        Ok(())
    }

    /// The most recent earlier session that stored anything.
    pub fn previous_session(&self) -> Result<Option<Session>> {
        self.conn
            .query_row(
                "SELECT id, started_at FROM sessions s
                 WHERE s.id < ?1
                   AND EXISTS (SELECT 1 FROM entries e WHERE e.session_id = s.id)
                 ORDER BY s.id DESC LIMIT 1",
                params![self.session_id],
                |row| {
                    Ok(Session {
                        id: row.get(0)?,
                        started_at: parse_datetime(row.get::<_, String>(1)?),
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM entries WHERE session_id = ?1 AND key = ?2",
                params![self.session_id, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO entries (session_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![self.session_id, key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "DELETE FROM entries WHERE session_id = ?1 AND key = ?2",
            params![self.session_id, key],
        )?;
        Ok(())
    }
}

fn initialize(conn: &Connection) -> Result<()> {
    let version = schema_version(conn)?;
    if version == 0 {
        create_schema(conn)?;
    } else if version < SCHEMA_VERSION {
        migrate(conn, version)?;
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i32> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !exists {
        return Ok(0);
    }

    let version: Option<String> = conn
        .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| row.get(0))
        .optional()?;
    Ok(version.and_then(|v| v.parse().ok()).unwrap_or(0))
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entries (
            session_id INTEGER NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (session_id, key),
            FOREIGN KEY (session_id) REFERENCES sessions(id)
        );

        INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', '1');
        "#,
    )?;
    Ok(())
}

fn migrate(_conn: &Connection, from_version: i32) -> Result<()> {
    tracing::debug!(from_version, to = SCHEMA_VERSION, "no migration steps registered");
    Ok(())
}

fn start_session(conn: &Connection) -> Result<i64> {
    conn.execute(
        "INSERT INTO sessions (started_at) VALUES (?1)",
        params![Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Default database path under the platform data directory.
fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("no data or home directory available")?;
    Ok(base.join("ristill").join("session.db"))
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
