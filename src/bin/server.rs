//! Authorizr Server
//!
//! Authorization worker backed by the in-memory repository

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use authorizr::api::Apis;
use authorizr::config::Config;
use authorizr::http::{serve, WorkerHandler};
use authorizr::store::Repo;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "authorizr-server")]
#[command(about = "Authorization worker for users, groups and policies")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the configuration
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number, overrides the configuration
    #[arg(short = 'P', long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logger.level))
        .context("invalid logger level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Authorizr Server");
    if let Some(path) = &args.config {
        info!("Configuration: {:?}", path);
    }

    let apis = Apis::new(Repo::in_memory());
    if !config.seed.is_empty() {
        config.seed.apply(&apis).context("failed to apply seed data")?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Ready to accept authorization requests");

    serve(listener, WorkerHandler::new(apis.authz)).await?;

    info!("Shutting down gracefully...");
    Ok(())
}
