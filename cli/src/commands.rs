use std::path::PathBuf;

use anyhow::{bail, Result};
use seedbench_core::storage::StorageEngine;
use seedbench_core::{parse_configuration, standard_configurations, BatchRequest, BenchmarkRunner, Generator, QueryTemplate, TableSchema};
use seedbench_storage_postgres::Postgres;
use seedbench_storage_sqlite::{SqliteConfig, SqliteStorageEngine};
use tracing::{info, warn};

use crate::config::{Args, Backend, Command, OutputFormat};

pub async fn open_engine(args: &Args) -> Result<Box<dyn StorageEngine>> {
    let table = TableSchema::new(args.table.as_str())?;
    let url = args.database_url();

    let engine: Box<dyn StorageEngine> = match args.backend {
        Backend::Postgres => {
            info!("Connecting to Postgres, table {}", table.name());
            Box::new(Postgres::open(url, args.pool_size).await?.with_table(table))
        }
        Backend::Sqlite => {
            info!("Opening SQLite database {}, table {}", url, table.name());
            let engine = SqliteStorageEngine::open_with_pool_size(sqlite_path(url)?, args.pool_size).await?;
            Box::new(engine.with_table(table))
        }
    };
    Ok(engine)
}

/// Each invocation is its own process, so an in-memory database would be gone before the next command.
fn sqlite_path(url: &str) -> Result<PathBuf> {
    match SqliteConfig::parse(url) {
        SqliteConfig::File(path) => Ok(path),
        SqliteConfig::Memory => bail!("--database-url :memory: does not outlive one command; pass a file path"),
    }
}

pub async fn execute(engine: &dyn StorageEngine, command: &Command) -> Result<()> {
    match command {
        Command::Init => {
            engine.create_table().await?;
            info!("Table {} ready", engine.table().name());
        }
        Command::Generate { total_rows, batch_size, start_offset, truncate } => {
            let request = BatchRequest::new(*total_rows, *batch_size)?.starting_at(*start_offset)?;
            if *truncate {
                engine.truncate().await?;
            }

            let summary = match Generator::new(engine).run(&request).await {
                Ok(summary) => summary,
                Err(err) => {
                    let committed = err.committed();
                    if committed > 0 {
                        warn!("{} rows are committed; resume with --start-offset {}", committed, request.start_offset() + committed);
                    }
                    return Err(err.into());
                }
            };
            println!(
                "Inserted {} rows in {} batches ({:.2}s, {:.0} rows/s)",
                summary.inserted,
                summary.batches,
                summary.elapsed.as_secs_f64(),
                summary.rows_per_sec()
            );
        }
        Command::Bench { configs, name, state_id, format } => {
            let table = engine.table();
            let configurations = if configs.is_empty() {
                standard_configurations(table)
            } else {
                configs.iter().map(|config| parse_configuration(config, table)).collect::<Result<Vec<_>, _>>()?
            };
            let rows = engine.row_count().await?;
            if rows == 0 {
                warn!("Table {} is empty, run generate first", table.name());
            }

            let query = QueryTemplate::equality(table, name.as_str(), *state_id);
            let report = BenchmarkRunner::new(engine).run(&query, &configurations).await;
            match format {
                OutputFormat::Table => report.print_summary(),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.to_json())?),
            }

            if !report.is_empty() && report.failures().count() == report.len() {
                bail!("no configuration could be measured");
            }
        }
        Command::Truncate => {
            engine.truncate().await?;
            info!("Table {} truncated", engine.table().name());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_path() {
        assert_eq!(sqlite_path("data/bench.db").unwrap(), PathBuf::from("data/bench.db"));

        let err = sqlite_path(":memory:").unwrap_err();
        assert!(err.to_string().contains(":memory:"), "{err}");
    }
}
