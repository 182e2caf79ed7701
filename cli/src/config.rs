//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use seedbench_core::schema::DEFAULT_TABLE;
use seedbench_core::MAX_BATCH_SIZE;

const DEFAULT_SQLITE_PATH: &str = "seedbench.db";
const DEFAULT_POSTGRES_URL: &str = "host=localhost user=postgres dbname=seedbench";

/// Populate a users table with deterministic rows and measure how indexes change one query's plan
#[derive(Parser, Debug)]
#[command(name = "seedbench", version, about)]
pub struct Args {
    /// Database backend
    #[arg(short, long, value_enum, default_value = "sqlite", env = "SEEDBENCH_BACKEND", global = true)]
    pub backend: Backend,

    /// Connection string for Postgres, database file path for SQLite
    #[arg(long, env = "SEEDBENCH_DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE, global = true)]
    pub table: String,

    /// Maximum pooled connections
    #[arg(long, default_value_t = 4, global = true)]
    pub pool_size: u32,

    /// Log filter, e.g. `info` or `seedbench_core=debug`
    #[arg(long, default_value = "info", env = "LOG_LEVEL", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn database_url(&self) -> &str {
        match (&self.database_url, self.backend) {
            (Some(url), _) => url,
            (None, Backend::Sqlite) => DEFAULT_SQLITE_PATH,
            (None, Backend::Postgres) => DEFAULT_POSTGRES_URL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Postgres => write!(f, "postgres"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// One JSON document
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the target table
    Init,

    /// Insert synthetic rows in committed batches
    Generate {
        /// Rows to insert
        #[arg(long, allow_negative_numbers = true)]
        total_rows: i64,

        /// Rows per batch, at most 10,000
        #[arg(long, default_value_t = MAX_BATCH_SIZE as i64, allow_negative_numbers = true)]
        batch_size: i64,

        /// First offset to generate, for resuming after a failure
        #[arg(long, default_value_t = 0)]
        start_offset: u64,

        /// Clear the table first
        #[arg(long)]
        truncate: bool,
    },

    /// Measure the query under each index configuration
    Bench {
        /// `label=[index_name:]col+col,...`; repeatable. Defaults to the four standard configurations
        #[arg(long = "config", value_name = "LABEL=INDEXES")]
        configs: Vec<String>,

        /// Value matched against `name`
        #[arg(long, default_value = "User_1000")]
        name: String,

        /// Value matched against `state_id`
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        state_id: i64,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Delete every row and restart ids at 1
    Truncate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["seedbench", "init"]).unwrap();
        assert_eq!(args.backend, Backend::Sqlite);
        assert_eq!(args.table, "users");
        assert_eq!(args.pool_size, 4);
        assert!(matches!(args.command, Command::Init));
    }

    #[test]
    fn test_database_url_follows_backend() {
        let args = Args::try_parse_from(["seedbench", "--backend", "postgres", "--database-url", "host=db user=bench", "truncate"]).unwrap();
        assert_eq!(args.database_url(), "host=db user=bench");

        let args = Args::try_parse_from(["seedbench", "truncate", "--backend", "postgres"]).unwrap();
        assert_eq!(args.database_url(), DEFAULT_POSTGRES_URL);
    }

    #[test]
    fn test_generate_args() {
        let args = Args::try_parse_from(["seedbench", "generate", "--total-rows", "5000000"]).unwrap();
        match args.command {
            Command::Generate { total_rows, batch_size, start_offset, truncate } => {
                assert_eq!(total_rows, 5_000_000);
                assert_eq!(batch_size, 10_000);
                assert_eq!(start_offset, 0);
                assert!(!truncate);
            }
            other => panic!("unexpected command {other:?}"),
        }

        // negative values reach the generator, which rejects them
        let args = Args::try_parse_from(["seedbench", "generate", "--total-rows", "-5", "--batch-size", "100"]).unwrap();
        assert!(matches!(args.command, Command::Generate { total_rows: -5, .. }));

        assert!(Args::try_parse_from(["seedbench", "generate"]).is_err());
    }

    #[test]
    fn test_bench_args() {
        let args = Args::try_parse_from([
            "seedbench",
            "bench",
            "--config",
            "baseline=",
            "--config",
            "composite=name+state_id",
            "--format",
            "json",
        ])
        .unwrap();
        match args.command {
            Command::Bench { configs, name, state_id, format } => {
                assert_eq!(configs, vec!["baseline=", "composite=name+state_id"]);
                assert_eq!(name, "User_1000");
                assert_eq!(state_id, 0);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Args::try_parse_from(["seedbench", "--backend", "mysql", "bench"]).is_err());
    }
}
