//! Common utilities for Postgres storage tests

use anyhow::Result;
use bb8_postgres::PostgresConnectionManager;
use seedbench_core::{TableAdmin, TableSchema};
use seedbench_storage_postgres::Postgres;
use std::str::FromStr;
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tracing::{info, warn, Level};

/// Connection string of an existing server to test against instead of a container
pub const DATABASE_URL_ENV: &str = "SEEDBENCH_TEST_DATABASE_URL";

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// An engine bound to a freshly created table. Holds the container, if one was started.
pub struct TestDatabase {
    pub engine: Postgres,
    _container: Option<ContainerAsync<postgres::Postgres>>,
}

/// Connects to `SEEDBENCH_TEST_DATABASE_URL` when set, otherwise starts a throwaway container.
///
/// Each test passes its own `table` so tests sharing one server do not collide. Returns `None`
/// when neither a server nor a container runtime is available, so the calling test can skip.
pub async fn test_database(table: &str) -> Result<Option<TestDatabase>> {
    let (container, connection_string) = match std::env::var(DATABASE_URL_ENV) {
        Ok(url) => {
            info!("Using Postgres from {}", DATABASE_URL_ENV);
            (None, url)
        }
        Err(_) => {
            let container = match postgres::Postgres::default()
                .with_db_name("seedbench")
                .with_user("postgres")
                .with_password("postgres")
                .start()
                .await
            {
                Ok(container) => container,
                Err(err) => {
                    warn!("Skipping Postgres test, set {} or start a container runtime: {}", DATABASE_URL_ENV, err);
                    return Ok(None);
                }
            };
            let host = container.get_host().await?;
            let port = container.get_host_port_ipv4(5432).await?;
            (Some(container), format!("host={host} port={port} user=postgres password=postgres dbname=seedbench"))
        }
    };

    let manager = PostgresConnectionManager::new_from_stringlike(connection_string, tokio_postgres::NoTls)?;
    let pool = bb8::Pool::builder().build(manager).await?;

    // a table left over from an earlier run against the same server
    pool.get().await?.batch_execute(&format!(r#"DROP TABLE IF EXISTS "{}""#, table)).await?;

    let engine = Postgres::new(pool).with_table(TableSchema::new(table)?);
    engine.create_table().await?;

    Ok(Some(TestDatabase { engine, _container: container }))
}

/// Names of the indexes on the engine's table other than the primary key and the email constraint.
#[allow(unused)]
pub async fn user_indexes(engine: &Postgres) -> Result<Vec<String>> {
    use seedbench_core::PlanTarget;

    let table = engine.table().name().to_owned();
    let client = engine.pool().get().await?;
    let rows = client
        .query(
            "SELECT indexname FROM pg_indexes WHERE tablename = $1 AND indexname NOT IN ($2, $3) ORDER BY indexname",
            &[&table, &format!("{}_pkey", table), &format!("{}_email_key", table)],
        )
        .await?;
    Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
}
