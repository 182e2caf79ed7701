//! Core of seedbench: deterministic synthetic user rows and index-impact measurement.
//!
//! Two components run one after the other against a single target table:
//!
//! - [`Generator`] fills the table with [`SyntheticRecord`]s derived purely from
//!   their offset, one committed batch at a time.
//! - [`BenchmarkRunner`] applies each [`IndexConfiguration`] in turn, runs the fixed
//!   [`QueryTemplate`] and collects a [`PlanMetric`] per configuration into a
//!   [`BenchmarkReport`].
//!
//! The database itself sits behind the traits in [`storage`]; the Postgres and SQLite
//! engines live in their own crates.
//!
//! ```rust,ignore
//! use seedbench_core::{standard_configurations, BenchmarkRunner, Generator, QueryTemplate};
//!
//! let inserted = Generator::new(&engine).generate(5_000_000, 10_000).await?;
//! let query = QueryTemplate::workload(engine.table());
//! let report = BenchmarkRunner::new(&engine).run(&query, &standard_configurations(engine.table())).await;
//! report.print_summary();
//! ```

pub mod batch;
pub mod error;
pub mod generator;
pub mod index;
pub mod plan;
pub mod query;
pub mod record;
pub mod report;
pub mod runner;
pub mod schema;
pub mod storage;

pub use batch::{BatchPlan, BatchRequest, MAX_BATCH_SIZE};
pub use error::{BenchError, GenerateError, IndexMutationError, IndexOperation, PlanError, StorageError, ValidationError};
pub use generator::{GenerateSummary, Generator};
pub use index::{parse_configuration, standard_configurations, IndexConfiguration, IndexSpec};
pub use plan::{AccessPath, PlanMetric};
pub use query::{Literal, QueryTemplate};
pub use record::SyntheticRecord;
pub use report::{BenchEntry, BenchmarkReport};
pub use runner::BenchmarkRunner;
pub use schema::TableSchema;
pub use storage::{BulkSink, PlanTarget, StorageEngine, TableAdmin};
