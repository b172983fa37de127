//! Storage accessor for the task table.

pub mod tasks;

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT DEFAULT '',
        status TEXT DEFAULT 'pending',
        priority TEXT DEFAULT 'medium',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        completed_at TIMESTAMP
    )
";

/// Handle to the task database.
///
/// Holds only the file path. Every operation opens its own connection,
/// runs a single statement, and drops the connection on the way out; there
/// is no pooling and no shared in-process state. Concurrent connections
/// are tolerated via WAL mode and a busy timeout.
#[derive(Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open the database at the given path, creating the table if absent.
    ///
    /// Schema creation is idempotent; there is no migration support, so
    /// later column changes are unhandled.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Self {
            path: path.as_ref().to_path_buf(),
        };

        let conn = db.connect()?;
        conn.execute_batch(SCHEMA)?;

        Ok(db)
    }

    /// Open a new connection. Callers get a fresh connection per call and
    /// release it by dropping it.
    pub fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;

        // WAL mode for concurrent access; busy timeout so concurrent
        // writers queue instead of failing immediately.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(conn)
    }
}

/// Current UTC time in the `YYYY-MM-DD HH:MM:SS` format used by the
/// `created_at` column default.
pub fn now_stamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
