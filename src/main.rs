//! `students-api` entry point.
//!
//! Loads configuration, installs logging, opens storage, serves until
//! SIGTERM/Ctrl-C. Any startup failure is logged and exits with status 1.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use students_api::config::Cli;
use students_api::{app, logging, Config, Error, Server, SqliteStore};

#[tokio::main]
async fn main() {
    let config = match Config::from_cli(&Cli::parse()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logging::init_logging(&config.env) {
        eprintln!("{err}");
        std::process::exit(1);
    }

    if let Err(err) = run(config).await {
        error!("{err}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Error> {
    let store = Arc::new(SqliteStore::open(&config.storage_path)?);
    info!(env = %config.env, version = env!("CARGO_PKG_VERSION"), "storage initialized");

    let server = Server::bind(&config.address).await?;
    server.serve(app(store)).await
}
