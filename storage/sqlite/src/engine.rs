//! SQLite storage engine implementation

use std::path::Path;
use std::time::Instant;

use async_trait::async_trait;
use rusqlite::StatementStatus;
use seedbench_core::{
    AccessPath, BulkSink, IndexSpec, PlanError, PlanMetric, PlanTarget, QueryTemplate, StorageError, SyntheticRecord, TableAdmin,
    TableSchema,
};
use tracing::debug;

use crate::connection::SqliteConnectionManager;
use crate::error::SqliteError;
use crate::plan::access_step;
use crate::sql_builder;

/// Default connection pool size
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// SQLite storage engine bound to one target table
pub struct SqliteStorageEngine {
    pool: bb8::Pool<SqliteConnectionManager>,
    table: TableSchema,
}

impl SqliteStorageEngine {
    /// Create a new storage engine with an existing pool
    pub fn new(pool: bb8::Pool<SqliteConnectionManager>) -> Self { Self { pool, table: TableSchema::default() } }

    /// Target a table other than `users`
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.table = table;
        self
    }

    /// Open a file-based SQLite database
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> { Self::open_with_pool_size(path, DEFAULT_POOL_SIZE).await }

    pub async fn open_with_pool_size(path: impl AsRef<Path>, pool_size: u32) -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = bb8::Pool::builder().max_size(pool_size.max(1)).build(manager).await?;
        Ok(Self::new(pool))
    }

    /// Open an in-memory SQLite database (for testing)
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::memory();
        // For in-memory, we use a single connection to keep the database alive
        let pool = bb8::Pool::builder().max_size(1).build(manager).await?;
        Ok(Self::new(pool))
    }

    /// Get a reference to the connection pool (for testing/diagnostics)
    pub fn pool(&self) -> &bb8::Pool<SqliteConnectionManager> { &self.pool }

    async fn connection(&self) -> Result<bb8::PooledConnection<'_, SqliteConnectionManager>, SqliteError> {
        self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))
    }

    async fn execute(&self, sql: String) -> Result<(), SqliteError> {
        debug!("SqliteStorageEngine({}): {}", self.table.name(), sql);
        let conn = self.connection().await?;
        conn.with_connection(move |c| {
            c.execute(&sql, [])?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl BulkSink for SqliteStorageEngine {
    async fn insert_batch(&self, records: &[SyntheticRecord]) -> Result<u64, StorageError> {
        let payload = serde_json::to_string(records).map_err(SqliteError::from)?;
        let sql = sql_builder::insert_batch(&self.table);
        let conn = self.connection().await?;

        let inserted = conn
            .with_connection_mut(move |c| {
                // Rolled back on drop if anything below fails.
                let tx = c.transaction()?;
                let inserted = tx.execute(&sql, [&payload])?;
                tx.commit()?;
                Ok(inserted as u64)
            })
            .await?;

        debug!("SqliteStorageEngine({}).insert_batch: {} rows", self.table.name(), inserted);
        Ok(inserted)
    }
}

#[async_trait]
impl PlanTarget for SqliteStorageEngine {
    fn table(&self) -> &TableSchema { &self.table }

    async fn create_index(&self, index: &IndexSpec) -> Result<(), StorageError> {
        Ok(self.execute(sql_builder::create_index(&self.table, index)).await?)
    }

    async fn drop_index(&self, index: &IndexSpec) -> Result<(), StorageError> { Ok(self.execute(sql_builder::drop_index(index)).await?) }

    async fn explain(&self, query: &QueryTemplate) -> Result<PlanMetric, PlanError> {
        let sql = query.to_sql();
        let table = query.table.clone();
        let conn = self.connection().await?;

        let (details, actual_rows, fullscan_steps, elapsed) = conn
            .with_connection(move |c| {
                let mut plan = c.prepare(&sql_builder::explain_query_plan(&sql))?;
                let details: Vec<String> = plan.query_map([], |row| row.get::<_, String>(3))?.collect::<Result<_, _>>()?;

                let mut stmt = c.prepare(&sql)?;
                stmt.reset_status(StatementStatus::FullscanStep);
                let started = Instant::now();
                let mut actual_rows = 0u64;
                let mut rows = stmt.query([])?;
                while rows.next()?.is_some() {
                    actual_rows += 1;
                }
                drop(rows);
                let elapsed = started.elapsed();
                let fullscan_steps = stmt.get_status(StatementStatus::FullscanStep);
                Ok((details, actual_rows, fullscan_steps, elapsed))
            })
            .await?;

        let step = access_step(details.iter().map(String::as_str), &table)
            .ok_or_else(|| PlanError::parse(format!("no plan row reads table {:?}: {:?}", table, details)))?;
        debug!("SqliteStorageEngine({}).explain: {:?} via {:?}", table, step.access_path, step.index_name);

        // SQLite only counts table steps for full scans; index lookups report nothing.
        let rows_examined = match step.access_path {
            AccessPath::FullScan => Some(fullscan_steps.max(0) as u64),
            _ => None,
        };

        Ok(PlanMetric {
            index_name: step.index_name,
            actual_rows,
            rows_examined,
            plan: details.join("\n"),
            ..PlanMetric::new(step.access_path, elapsed)
        })
    }
}

#[async_trait]
impl TableAdmin for SqliteStorageEngine {
    async fn create_table(&self) -> Result<(), StorageError> { Ok(self.execute(sql_builder::create_table(&self.table)).await?) }

    async fn truncate(&self) -> Result<(), StorageError> {
        let table = self.table.clone();
        let conn = self.connection().await?;
        conn.with_connection_mut(move |c| {
            let tx = c.transaction()?;
            tx.execute(&sql_builder::truncate(&table), [])?;
            tx.execute(sql_builder::RESET_SEQUENCE, [table.name()])?;
            tx.commit()?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    async fn row_count(&self) -> Result<u64, StorageError> {
        let sql = sql_builder::row_count(&self.table);
        let conn = self.connection().await?;
        let count: i64 = conn.with_connection(move |c| Ok(c.query_row(&sql, [], |row| row.get(0))?)).await?;
        Ok(count as u64)
    }
}
