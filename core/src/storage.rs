//! Seams between the core and a concrete database.

use async_trait::async_trait;

use crate::error::{PlanError, StorageError};
use crate::index::IndexSpec;
use crate::plan::PlanMetric;
use crate::query::QueryTemplate;
use crate::record::SyntheticRecord;
use crate::schema::TableSchema;

/// Destination for generated batches.
#[async_trait]
pub trait BulkSink: Send + Sync {
    /// Inserts all `records` with one set-based statement inside a transaction of its own,
    /// committing before returning. On error nothing from this call is visible.
    async fn insert_batch(&self, records: &[SyntheticRecord]) -> Result<u64, StorageError>;
}

/// Index state and plan introspection on the target table.
#[async_trait]
pub trait PlanTarget: Send + Sync {
    fn table(&self) -> &TableSchema;

    /// Must fail if an index with the same name already exists.
    async fn create_index(&self, index: &IndexSpec) -> Result<(), StorageError>;

    async fn drop_index(&self, index: &IndexSpec) -> Result<(), StorageError>;

    /// Brings planner statistics up to date after an index change.
    async fn refresh_statistics(&self) -> Result<(), StorageError> { Ok(()) }

    /// Runs `query` and reports the plan the engine actually chose.
    async fn explain(&self, query: &QueryTemplate) -> Result<PlanMetric, PlanError>;
}

/// Table lifecycle, owned by the caller rather than the generator.
#[async_trait]
pub trait TableAdmin: Send + Sync {
    async fn create_table(&self) -> Result<(), StorageError>;

    async fn truncate(&self) -> Result<(), StorageError>;

    async fn row_count(&self) -> Result<u64, StorageError>;
}

/// Everything a backend provides.
pub trait StorageEngine: BulkSink + PlanTarget + TableAdmin {}

impl<T: BulkSink + PlanTarget + TableAdmin> StorageEngine for T {}
