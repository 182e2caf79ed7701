//! Error types for the SQLite backend

use rusqlite::ErrorCode;
use seedbench_core::{PlanError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl SqliteError {
    fn is_constraint(&self) -> bool {
        matches!(self, SqliteError::Rusqlite(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation)
    }
}

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Pool(message) => StorageError::Connection(message),
            err if err.is_constraint() => StorageError::Constraint(err.to_string()),
            err => StorageError::backend(err),
        }
    }
}

impl From<SqliteError> for PlanError {
    fn from(err: SqliteError) -> Self { PlanError::Execution(err.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_mapping() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(r#"CREATE TABLE "t"("email" TEXT UNIQUE); INSERT INTO "t" VALUES ('a');"#).unwrap();
        let err = conn.execute(r#"INSERT INTO "t" VALUES ('a')"#, []).unwrap_err();

        let storage: StorageError = SqliteError::from(err).into();
        assert!(storage.is_constraint(), "{storage}");

        let pool: StorageError = SqliteError::Pool("timed out".into()).into();
        assert!(matches!(pool, StorageError::Connection(m) if m == "timed out"));
    }
}
