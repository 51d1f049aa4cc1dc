//! Opening the cache database.
//!
//! The schema is tracked with SQLite's `user_version`: a fresh file gets the
//! `cache_entries` schema and version 1, a file from a newer build is refused.

use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;";

const SCHEMA: &str = include_str!("../../migrations/001_cache_entries.sql");
const SCHEMA_VERSION: i64 = 1;

/// Handle to the response stores.
///
/// Clones share one background connection thread, so the worker and the
/// host tools see the same entries.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| -> Result<(), Error> {
            conn.execute_batch(PRAGMAS)?;

            let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
            if version > SCHEMA_VERSION {
                return Err(Error::MigrationFailed(format!(
                    "cache schema v{version} is newer than supported v{SCHEMA_VERSION}"
                )));
            }
            if version < SCHEMA_VERSION {
                tracing::debug!(from = version, to = SCHEMA_VERSION, "creating cache schema");
                conn.execute_batch(SCHEMA)?;
                conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
            }
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        Ok(Self { conn })
    }
}
