//! File-backed key-value store over SQLite.
//!
//! A [`Database`] owns one connection to one file and exposes a flat bucket of
//! `String -> bytes` records. Every call is its own SQLite transaction, so a
//! crash mid-write never damages records that were already committed.
//!
//! Only one handle per file may be open inside a process. The registry of open
//! paths is process-global, the same way the connection pool keys its write
//! locks by database path.

use crate::core::error::{ApizzaError, Result};
use crate::core::schemas;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection busy_timeout in seconds.
const BUSY_TIMEOUT_SECS: u64 = 5;

/// SQLite side files that live next to a WAL-mode database.
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

pub fn db_connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS))?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    conn.execute(schemas::BUCKET_SCHEMA, [])?;
    Ok(conn)
}

fn open_paths() -> &'static Mutex<HashSet<PathBuf>> {
    static OPEN: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    OPEN.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Canonical path of a cache file that may not exist yet.
fn registry_key(requested: &Path) -> Result<PathBuf> {
    if requested.exists() {
        return fs::canonicalize(requested).map_err(|e| open_error(requested, e));
    }
    let name = requested
        .file_name()
        .ok_or_else(|| open_error(requested, "path has no file name"))?;
    let parent = match requested.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = fs::canonicalize(parent).map_err(|e| open_error(requested, e))?;
    Ok(dir.join(name))
}

fn open_error(path: &Path, err: impl Display) -> ApizzaError {
    ApizzaError::StorageOpen(format!("{}: {}", path.display(), err))
}

fn write_error(key: &str, err: impl Display) -> ApizzaError {
    ApizzaError::StorageWrite(format!("{}: {}", key, err))
}

/// Handle to an open cache file.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    conn: Option<Connection>,
}

impl Database {
    /// Open the cache at `path`, creating the file and its parent directories
    /// when they do not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let requested = path.as_ref();
        if requested.as_os_str().is_empty() {
            return Err(open_error(requested, "empty path"));
        }
        if let Some(parent) = requested.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| open_error(requested, e))?;
        }
        if requested.is_dir() {
            return Err(open_error(requested, "path is a directory"));
        }

        let path = registry_key(requested)?;
        {
            let mut open = open_paths()
                .lock()
                .map_err(|_| open_error(&path, "open-path registry lock poisoned"))?;
            if !open.insert(path.clone()) {
                return Err(open_error(&path, "already open in this process"));
            }
        }

        let conn = match db_connect(&path) {
            Ok(conn) => conn,
            Err(e) => {
                if let Ok(mut open) = open_paths().lock() {
                    open.remove(&path);
                }
                return Err(open_error(&path, e));
            }
        };

        debug!(path = %path.display(), "opened cache");
        Ok(Self {
            path,
            conn: Some(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(ApizzaError::StoreClosed)
    }

    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        let conn = self.conn()?;
        let value: Option<Vec<u8>> = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        debug!(key, hit = value.is_some(), "cache get");
        value.ok_or_else(|| ApizzaError::NotFound(key.to_string()))
    }

    /// Insert or replace the record stored under `key`.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .map_err(|e| write_error(key, e))?;
        debug!(key, bytes = value.len(), "cache put");
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM records WHERE key = ?1", params![key])
            .map_err(|e| write_error(key, e))?;
        debug!(key, removed, "cache delete");
        if removed == 0 {
            return Err(ApizzaError::NotFound(key.to_string()));
        }
        Ok(())
    }

    /// Every record in the bucket, ordered by key.
    pub fn get_all(&self) -> Result<BTreeMap<String, Vec<u8>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM records ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;
        let mut out = BTreeMap::new();
        for r in rows {
            let (key, value) = r?;
            out.insert(key, value);
        }
        Ok(out)
    }

    /// Remove every record but keep the file and the handle.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM records", [])
            .map_err(|e| write_error("*", e))?;
        debug!(removed, "cache cleared");
        Ok(())
    }

    /// Release the handle. Calling this on a closed handle is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        if let Ok(mut open) = open_paths().lock() {
            open.remove(&self.path);
        }
        conn.close().map_err(|(_, e)| ApizzaError::RusqliteError(e))?;
        debug!(path = %self.path.display(), "closed cache");
        Ok(())
    }

    /// Close the handle and delete the backing file along with its SQLite side
    /// files. Returns the path that was removed.
    pub fn destroy(&mut self) -> Result<PathBuf> {
        self.close()?;
        remove_if_exists(&self.path)?;
        for suffix in SIDECAR_SUFFIXES {
            let mut side = self.path.clone().into_os_string();
            side.push(suffix);
            remove_if_exists(Path::new(&side))?;
        }
        debug!(path = %self.path.display(), "removed cache file");
        Ok(self.path.clone())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to close cache");
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ApizzaError::IoError(e)),
    }
}
