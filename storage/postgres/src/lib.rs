//! Postgres backend for seedbench.
//!
//! Batches are bound as a single JSON parameter and expanded with `json_populate_recordset`,
//! one transaction per batch. Plans come from `EXPLAIN (ANALYZE, FORMAT JSON)`, which also runs
//! the query, so every metric carries the planner's cost next to the actual row counts.

use async_trait::async_trait;
use bb8_postgres::{tokio_postgres::NoTls, PostgresConnectionManager};
use seedbench_core::{
    BulkSink, IndexSpec, PlanError, PlanMetric, PlanTarget, QueryTemplate, StorageError, SyntheticRecord, TableAdmin, TableSchema,
};
use tracing::{debug, warn};

pub mod error;
pub mod plan;
pub mod sql_builder;

pub use error::{error_kind, ErrorKind, PostgresError};

/// Default connection pool size
pub const DEFAULT_POOL_SIZE: u32 = 4;

pub struct Postgres {
    pool: bb8::Pool<PostgresConnectionManager<NoTls>>,
    table: TableSchema,
}

impl Postgres {
    pub fn new(pool: bb8::Pool<PostgresConnectionManager<NoTls>>) -> Self { Self { pool, table: TableSchema::default() } }

    /// Connects with a libpq-style connection string or `postgres://` URL.
    pub async fn open(connection_string: &str, pool_size: u32) -> anyhow::Result<Self> {
        let manager = PostgresConnectionManager::new_from_stringlike(connection_string, NoTls)?;
        let pool = bb8::Pool::builder().max_size(pool_size.max(1)).build(manager).await?;
        Ok(Self::new(pool))
    }

    /// Target a table other than `users`
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.table = table;
        self
    }

    pub fn pool(&self) -> &bb8::Pool<PostgresConnectionManager<NoTls>> { &self.pool }

    async fn batch_execute(&self, sql: &str) -> Result<(), PostgresError> {
        debug!("Postgres({}): {}", self.table.name(), sql);
        let client = self.pool.get().await?;
        client.batch_execute(sql).await?;
        Ok(())
    }
}

#[async_trait]
impl BulkSink for Postgres {
    async fn insert_batch(&self, records: &[SyntheticRecord]) -> Result<u64, StorageError> {
        let payload = serde_json::to_value(records).map_err(PostgresError::from)?;
        let sql = sql_builder::insert_batch(&self.table);

        let mut client = self.pool.get().await.map_err(PostgresError::from)?;
        // Rolled back on drop unless committed.
        let tx = client.transaction().await.map_err(PostgresError::from)?;
        let inserted = match tx.execute(&sql, &[&payload]).await {
            Ok(inserted) => inserted,
            Err(err) => {
                if let ErrorKind::UndefinedTable { table } = error_kind(&err) {
                    warn!("Postgres({}).insert_batch: table {} does not exist, run init first", self.table.name(), table);
                }
                return Err(PostgresError::from(err).into());
            }
        };
        tx.commit().await.map_err(PostgresError::from)?;

        debug!("Postgres({}).insert_batch: {} rows", self.table.name(), inserted);
        Ok(inserted)
    }
}

#[async_trait]
impl PlanTarget for Postgres {
    fn table(&self) -> &TableSchema { &self.table }

    async fn create_index(&self, index: &IndexSpec) -> Result<(), StorageError> {
        match self.batch_execute(&sql_builder::create_index(&self.table, index)).await {
            Err(PostgresError::Postgres(err)) if matches!(error_kind(&err), ErrorKind::DuplicateRelation { .. }) => {
                warn!("Postgres({}).create_index: {} already exists", self.table.name(), index.name);
                Err(PostgresError::Postgres(err).into())
            }
            result => Ok(result?),
        }
    }

    async fn drop_index(&self, index: &IndexSpec) -> Result<(), StorageError> { Ok(self.batch_execute(&sql_builder::drop_index(index)).await?) }

    async fn refresh_statistics(&self) -> Result<(), StorageError> { Ok(self.batch_execute(&sql_builder::vacuum_analyze(&self.table)).await?) }

    async fn explain(&self, query: &QueryTemplate) -> Result<PlanMetric, PlanError> {
        let sql = sql_builder::explain_analyze(&query.to_sql());
        debug!("Postgres({}).explain: {}", self.table.name(), sql);

        let client = self.pool.get().await.map_err(PostgresError::from)?;
        let row = client.query_one(&sql, &[]).await.map_err(PostgresError::from)?;
        let document: serde_json::Value = row.try_get(0).map_err(PostgresError::from)?;

        let metric = plan::parse_explain(&document, &query.table)?;
        debug!("Postgres({}).explain: {} via {:?}", self.table.name(), metric.access_path, metric.index_name);
        Ok(metric)
    }
}

#[async_trait]
impl TableAdmin for Postgres {
    async fn create_table(&self) -> Result<(), StorageError> { Ok(self.batch_execute(&sql_builder::create_table(&self.table)).await?) }

    async fn truncate(&self) -> Result<(), StorageError> { Ok(self.batch_execute(&sql_builder::truncate(&self.table)).await?) }

    async fn row_count(&self) -> Result<u64, StorageError> {
        let client = self.pool.get().await.map_err(PostgresError::from)?;
        let row = client.query_one(&sql_builder::row_count(&self.table), &[]).await.map_err(PostgresError::from)?;
        let count: i64 = row.try_get(0).map_err(PostgresError::from)?;
        Ok(count as u64)
    }
}
