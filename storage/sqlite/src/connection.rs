//! Connection manager for bb8 pool with rusqlite

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::error::SqliteError;

/// Where the database lives
#[derive(Clone, Debug)]
pub enum SqliteConfig {
    /// File-based database
    File(PathBuf),
    /// In-memory database, private to one connection
    Memory,
}

impl SqliteConfig {
    /// `:memory:` selects an in-memory database, anything else is a file path.
    pub fn parse(location: &str) -> Self {
        match location {
            ":memory:" => SqliteConfig::Memory,
            path => SqliteConfig::File(PathBuf::from(path)),
        }
    }
}

/// Opens tuned rusqlite connections for the engine's bb8 pool.
///
/// File databases get WAL journaling and `synchronous=NORMAL`; every connection gets a large
/// page cache and in-memory temp storage for index builds.
pub struct SqliteConnectionManager {
    config: SqliteConfig,
}

impl SqliteConnectionManager {
    pub fn new(config: SqliteConfig) -> Self { Self { config } }

    pub fn file(path: impl Into<PathBuf>) -> Self { Self::new(SqliteConfig::File(path.into())) }

    pub fn memory() -> Self { Self::new(SqliteConfig::Memory) }

    pub fn config(&self) -> &SqliteConfig { &self.config }

    fn create_connection(&self) -> Result<Connection, SqliteError> {
        let conn = match &self.config {
            SqliteConfig::File(path) => {
                let conn = Connection::open(path)?;
                // one commit per batch
                conn.execute_batch(
                    "PRAGMA journal_mode=WAL;
                     PRAGMA synchronous=NORMAL;",
                )?;
                conn
            }
            SqliteConfig::Memory => Connection::open_in_memory()?,
        };

        conn.execute_batch(
            "PRAGMA cache_size=-64000;
             PRAGMA temp_store=MEMORY;",
        )?;

        Ok(conn)
    }
}

/// One database handle checked out of the pool.
///
/// A batch insert, an `EXPLAIN QUERY PLAN` plus timed execution, or a truncate runs as a
/// single closure on the blocking pool while holding the handle, so its transaction never
/// spans an `.await`.
pub struct PooledConnection {
    inner: Arc<Mutex<Connection>>,
}

impl PooledConnection {
    pub fn new(conn: Connection) -> Self { Self { inner: Arc::new(Mutex::new(conn)) } }

    /// Read-only work: plan inspection, timed query execution, counts.
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.inner.clone();
        run_blocking(move || f(&conn.blocking_lock())).await
    }

    /// Work that opens a rusqlite `Transaction`: one batch insert, or a truncate with its sequence reset.
    ///
    /// The transaction commits or rolls back before the closure returns, so a failed batch leaves
    /// nothing behind on the connection that goes back to the pool.
    pub async fn with_connection_mut<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&mut Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.inner.clone();
        run_blocking(move || f(&mut conn.blocking_lock())).await
    }
}

impl Clone for PooledConnection {
    fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

async fn run_blocking<F, T>(f: F) -> Result<T, SqliteError>
where
    F: FnOnce() -> Result<T, SqliteError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| SqliteError::TaskJoin(e.to_string()))?
}

/// Connections are opened off the async runtime with the PRAGMAs above applied; a checkout is
/// validated with `SELECT 1` before the engine starts a batch on it.
impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = PooledConnection;
    type Error = SqliteError;

    fn connect(&self) -> impl std::future::Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let manager = SqliteConnectionManager::new(self.config.clone());
        run_blocking(move || manager.create_connection().map(PooledConnection::new))
    }

    #[allow(refining_impl_trait)]
    fn is_valid<'a, 'b>(&'a self, conn: &'b mut Self::Connection) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send {
        let conn = conn.clone();
        async move {
            conn.with_connection(|c| Ok(c.execute_batch("SELECT 1")?)).await
        }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool { false }
}
