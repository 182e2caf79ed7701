//! seedbench command-line interface
//!
//! ```bash
//! seedbench --backend postgres --database-url "host=localhost user=postgres dbname=bench" init
//! seedbench --backend postgres generate --total-rows 5000000 --batch-size 10000
//! seedbench --backend postgres bench --format json
//! seedbench bench --config baseline= --config composite=name+state_id
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::Args;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let engine = commands::open_engine(&args).await?;
    commands::execute(engine.as_ref(), &args.command).await
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the report
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}
