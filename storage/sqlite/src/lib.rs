//! SQLite backend for seedbench
//!
//! An embedded target for the generator and the index benchmark. Useful when no database
//! server is around, and as the in-process engine the integration tests run against.
//!
//! - Batches are inserted with a single `INSERT ... SELECT ... FROM json_each(?)` per
//!   transaction.
//! - Plans come from `EXPLAIN QUERY PLAN`; the query is then executed and timed.
//!   SQLite reports no planner costs, so `estimated_cost` and `estimated_rows` stay empty,
//!   and rows examined are only known for full scans.
//!
//! # Example
//!
//! ```rust,ignore
//! use seedbench_core::{Generator, TableAdmin};
//! use seedbench_storage_sqlite::SqliteStorageEngine;
//!
//! let engine = SqliteStorageEngine::open("seedbench.db").await?;
//! engine.create_table().await?;
//! Generator::new(&engine).generate(100_000, 10_000).await?;
//! ```

mod connection;
mod engine;
mod error;
pub mod plan;
pub mod sql_builder;

pub use connection::{PooledConnection, SqliteConfig, SqliteConnectionManager};
pub use engine::{SqliteStorageEngine, DEFAULT_POOL_SIZE};
pub use error::SqliteError;
