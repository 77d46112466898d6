use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use redb::{CommitError, DatabaseError, StorageError, TableError, TransactionError};
use rusqlite::ErrorCode;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::DbPool;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("R2D2 pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Redb database error: {0}")]
    RedbDatabase(#[from] DatabaseError),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Item not found in database: {0}")]
    NotFound(String),
    #[error("Could not find a free slug for '{0}'")]
    SlugExhausted(String),
}

impl DbError {
    /// True when SQLite refused a write because a UNIQUE constraint already holds the value.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DbError::Rusqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

/// Builds the catalogue connection pool. Every connection enforces foreign keys
/// and waits on a busy writer instead of failing immediately.
pub fn open_catalog_pool(path: &Path) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    });
    Pool::builder().build(manager)
}

pub mod submissions_db_operations;
pub mod tags_db_operations;
pub mod users_db_operations;
pub mod view_counts_db_operations;
pub mod works_db_operations;
