//! Fitlog Storage
//!
//! SQLite persistence for every fitlog resource. One connection sits
//! behind a mutex; WAL journaling and foreign keys are switched on when
//! the database is opened.
//!
//! - **schema**: table definitions and first-run seed data
//! - **identity**: users and sign-in lookups
//! - **resistance**: exercises, sessions, sets, routines
//! - **running**: runs and shoes
//! - **nutrition**: meals, food entries, food library, water
//! - **body**: body metrics
//! - **analytics**: per-day summaries
//!
//! # Example
//!
//! ```rust,no_run
//! use fitlog::storage::Store;
//! use fitlog_core::models::NewMeal;
//!
//! let store = Store::open("fitlog.db")?;
//! let meal = store.create_meal(1, NewMeal { name: Some("Lunch".into()), eaten_at: None })?;
//! println!("created meal {}", meal.id);
//! # Ok::<(), fitlog::storage::StorageError>(())
//! ```

mod analytics;
mod body;
pub mod error;
mod identity;
mod nutrition;
mod resistance;
mod running;
mod schema;

pub use error::{StorageError, StorageResult};

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Row counts reported by the health endpoint and the CLI
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StoreStats {
    pub users: i64,
    pub sessions: i64,
    pub runs: i64,
    pub meals: i64,
    pub body_metrics: i64,
}

/// SQLite-backed store for all fitlog records
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (or create) the database at `path`, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        let store = Self::init(conn, Some(path.to_path_buf()))?;
        tracing::info!(path = %path.display(), "Opened database");
        Ok(store)
    }

    /// Private in-memory database, used by tests and dry runs
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::migrate(&conn, Utc::now())?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Row counts across the main tables
    pub fn stats(&self) -> StorageResult<StoreStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> StorageResult<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
        };
        Ok(StoreStats {
            users: count("users")?,
            sessions: count("workout_sessions")?,
            runs: count("runs")?,
            meals: count("meals")?,
            body_metrics: count("body_metrics")?,
        })
    }
}

/// Fail with `NotFound` unless `table` has row `id` owned by `user_id`
pub(crate) fn ensure_owned(
    conn: &Connection,
    table: &'static str,
    kind: &'static str,
    id: i64,
    user_id: i64,
) -> StorageResult<()> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE id = ?1 AND user_id = ?2"),
            params![id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StorageError::not_found(kind, id)),
    }
}

/// Map zero affected rows to `NotFound`
pub(crate) fn expect_changed(changed: usize, kind: &'static str, id: i64) -> StorageResult<()> {
    if changed == 0 {
        Err(StorageError::not_found(kind, id))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seeds_default_user_and_catalog() {
        let store = Store::open_in_memory().unwrap();
        let user = store.get_user(1).unwrap();
        assert_eq!(user.name, "User");
        assert_eq!(user.height_cm, Some(175.0));
        assert_eq!(user.sex.as_deref(), Some("M"));
        assert!(!store.list_exercises().unwrap().is_empty());
    }

    #[test]
    fn test_reopen_does_not_reseed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("fitlog.db");

        {
            let store = Store::open(&path).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
            assert_eq!(store.stats().unwrap().users, 1);
        }

        let store = Store::open(&path).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.meals, 0);
    }
}
