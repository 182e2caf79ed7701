use thiserror::Error;

use crate::index::IndexSpec;

/// Malformed caller input. Always raised before any side effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("total_rows must be positive, got {0}")]
    TotalRows(i64),
    #[error("batch_size must be within [1, 10000], got {0}")]
    BatchSize(i64),
    #[error("offset range starting at {start} with {total} rows overflows")]
    OffsetOverflow { start: u64, total: u64 },
    #[error("invalid identifier {0:?}")]
    Identifier(String),
    #[error("index {0:?} has no columns")]
    EmptyIndex(String),
    #[error("query template has no {0}")]
    EmptyQuery(&'static str),
    #[error("cannot parse index configuration {input:?}: {reason}")]
    Configuration { input: String, reason: String },
}

/// Failure reported by a storage engine.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Storage error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StorageError {
    pub fn backend(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self { StorageError::Backend(err.into()) }

    pub fn is_constraint(&self) -> bool { matches!(self, StorageError::Constraint(_)) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOperation {
    Create,
    Drop,
}

impl std::fmt::Display for IndexOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexOperation::Create => write!(f, "create"),
            IndexOperation::Drop => write!(f, "drop"),
        }
    }
}

/// An index could not be created or dropped for one configuration.
#[derive(Error, Debug)]
#[error("failed to {operation} index {index:?}: {source}")]
pub struct IndexMutationError {
    pub index: String,
    pub operation: IndexOperation,
    #[source]
    pub source: StorageError,
}

impl IndexMutationError {
    pub fn create(index: &IndexSpec, source: StorageError) -> Self {
        Self { index: index.name.clone(), operation: IndexOperation::Create, source }
    }

    pub fn drop(index: &IndexSpec, source: StorageError) -> Self { Self { index: index.name.clone(), operation: IndexOperation::Drop, source } }
}

#[derive(Error, Debug)]
pub enum PlanError {
    /// The engine answered, but its plan output did not have the expected shape.
    #[error("Plan parse error: {0}")]
    Parse(String),
    #[error("Query execution failed: {0}")]
    Execution(#[from] StorageError),
}

impl PlanError {
    pub fn parse(reason: impl Into<String>) -> Self { PlanError::Parse(reason.into()) }
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A batch failed. Batches before it stay committed.
    #[error("batch starting at offset {offset} failed after {committed} committed rows: {source}")]
    Insertion {
        committed: u64,
        offset: u64,
        #[source]
        source: StorageError,
    },
    #[error("batch starting at offset {offset} wrote {written} of {expected} rows")]
    ShortBatch { committed: u64, offset: u64, expected: u64, written: u64 },
}

impl GenerateError {
    /// Rows durably committed before the failure.
    pub fn committed(&self) -> u64 {
        match self {
            GenerateError::Validation(_) => 0,
            GenerateError::Insertion { committed, .. } => *committed,
            GenerateError::ShortBatch { committed, written, .. } => committed + written,
        }
    }
}

/// Why a single configuration produced no measurement.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    IndexMutation(#[from] IndexMutationError),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

impl BenchError {
    pub fn kind(&self) -> &'static str {
        match self {
            BenchError::Validation(_) => "validation",
            BenchError::IndexMutation(_) => "index_mutation",
            BenchError::Plan(PlanError::Parse(_)) => "plan_parse",
            BenchError::Plan(PlanError::Execution(_)) => "execution",
        }
    }
}
