//! REST server for the franchise record store.
//!
//! Wires configuration, the optional seed snapshot, the snapshot store and
//! the HTTP router together, and shuts down on Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use franchise_db_api::{router::Router, server::Server};
use franchise_db_core::{config::DbConfig, Database, DbError};
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the franchise server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// JSON seed snapshot loaded at startup
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Position title that qualifies an employee to manage a location
    #[arg(long, default_value = "Manager")]
    manager_title: String,

    /// Maximum length of text fields, in characters
    #[arg(long, default_value_t = 50)]
    max_text_len: usize,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Response timeout in milliseconds
    #[arg(long, default_value_t = 10000)]
    response_timeout_ms: u64,
}

impl Args {
    fn config(&self) -> DbConfig {
        DbConfig {
            max_text_len: self.max_text_len,
            manager_position_title: self.manager_title.clone(),
            request_timeout_ms: self.request_timeout_ms,
            response_timeout_ms: self.response_timeout_ms,
            seed_path: self.seed.clone(),
            ..DbConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = args.config();
    let db = match &config.seed_path {
        Some(path) => match Database::load_seed(path, config.clone()) {
            Ok(db) => db,
            Err(DbError::DataCorruption(msg)) => {
                tracing::error!("Seed snapshot failed the integrity audit: {}", msg);
                tracing::error!("Server cannot start. Fix or remove the seed snapshot.");
                std::process::exit(1);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to load seed {}", path.display()))
            }
        },
        None => Database::new(config.clone()),
    };

    let router = Router::new(Arc::new(db)).context("Failed to build router")?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid host or port")?;
    let server = Server::new(addr, router);

    tracing::info!(
        "Starting franchise server on {} (manager title '{}', max text length {}, request timeout {} ms, response timeout {} ms)",
        addr,
        config.manager_position_title,
        config.max_text_len,
        config.request_timeout_ms,
        config.response_timeout_ms
    );

    server
        .serve(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
