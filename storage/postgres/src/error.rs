use seedbench_core::{PlanError, StorageError};
use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Error, Debug)]
pub enum PostgresError {
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<bb8::RunError<tokio_postgres::Error>> for PostgresError {
    fn from(err: bb8::RunError<tokio_postgres::Error>) -> Self {
        match err {
            bb8::RunError::User(err) => PostgresError::Postgres(err),
            bb8::RunError::TimedOut => PostgresError::Pool("timed out waiting for a connection".to_owned()),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Pool(message) => StorageError::Connection(message),
            PostgresError::Postgres(pg) if pg.is_closed() => StorageError::Connection(pg.to_string()),
            PostgresError::Postgres(pg) => match error_kind(&pg) {
                ErrorKind::UniqueViolation { constraint } => {
                    StorageError::Constraint(format!("unique constraint {} violated: {}", constraint.unwrap_or_default(), pg))
                }
                _ => StorageError::backend(PostgresError::Postgres(pg)),
            },
            other => StorageError::backend(other),
        }
    }
}

impl From<PostgresError> for PlanError {
    fn from(err: PostgresError) -> Self { PlanError::Execution(err.into()) }
}

// tokio-postgres only exposes the SQLSTATE, so the object name is read back out of the message
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    UniqueViolation { constraint: Option<String> },
    DuplicateRelation { name: String },
    UndefinedTable { table: String },
    UndefinedObject,
    Unknown,
}

pub fn error_kind(err: &tokio_postgres::Error) -> ErrorKind {
    let string = err.to_string().trim().to_owned();
    let first_quoted = || {
        let mut quoted = string.split('"');
        quoted.next()?;
        quoted.next().map(str::to_owned)
    };

    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            ErrorKind::UniqueViolation { constraint: err.as_db_error().and_then(|db| db.constraint()).map(str::to_owned) }
        }
        // relation "idx_users_name" already exists
        Some(code) if *code == SqlState::DUPLICATE_TABLE => ErrorKind::DuplicateRelation { name: first_quoted().unwrap_or_default() },
        // relation "users" does not exist
        Some(code) if *code == SqlState::UNDEFINED_TABLE => ErrorKind::UndefinedTable { table: first_quoted().unwrap_or_default() },
        Some(code) if *code == SqlState::UNDEFINED_OBJECT => ErrorKind::UndefinedObject,
        _ => ErrorKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_errors() {
        let err: StorageError = PostgresError::Pool("timed out waiting for a connection".to_owned()).into();
        assert!(matches!(err, StorageError::Connection(_)));

        let err: StorageError = PostgresError::from(bb8::RunError::<tokio_postgres::Error>::TimedOut).into();
        assert!(matches!(err, StorageError::Connection(_)));
    }

    #[test]
    fn test_json_errors_are_backend_errors() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StorageError = PostgresError::from(json).into();
        assert!(matches!(err, StorageError::Backend(_)));
        assert!(!err.is_constraint());
    }
}
