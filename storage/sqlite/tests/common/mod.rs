//! Common utilities for SQLite storage tests

use anyhow::Result;
use seedbench_core::{Generator, TableAdmin};
use seedbench_storage_sqlite::SqliteStorageEngine;
use std::str::FromStr;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// In-memory engine with the `users` table created and empty.
pub async fn empty_engine() -> Result<SqliteStorageEngine> {
    let engine = SqliteStorageEngine::open_in_memory().await?;
    engine.create_table().await?;
    Ok(engine)
}

/// In-memory engine holding offsets `[0, rows)`.
#[allow(unused)]
pub async fn populated_engine(rows: i64) -> Result<SqliteStorageEngine> {
    let engine = empty_engine().await?;
    Generator::new(&engine).generate(rows, 1_000).await?;
    Ok(engine)
}

/// Names of the secondary indexes currently defined, excluding SQLite's own.
#[allow(unused)]
pub async fn user_indexes(engine: &SqliteStorageEngine) -> Result<Vec<String>> {
    let conn = engine.pool().get().await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let names = conn
        .with_connection(|c| {
            let mut stmt = c.prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND name NOT LIKE 'sqlite_%' ORDER BY name")?;
            let names = stmt.query_map([], |row| row.get::<_, String>(0))?.collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
        .await?;
    Ok(names)
}
