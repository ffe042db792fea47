//! fitrack server binary

use anyhow::Context;
use clap::{Arg, Command};
use fitrack_core::AuthConfig;
use fitrack_engine::Storage;
use fitrack_server::config::{DEFAULT_BIND, DEFAULT_DATA_DIR};
use fitrack_server::{AppState, FitrackServer, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = Command::new("fitrack-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fitness tracking API server")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("PATH")
                .help("Data directory path")
                .default_value(DEFAULT_DATA_DIR),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR")
                .help("Bind address")
                .default_value(DEFAULT_BIND),
        )
        .get_matches();

    let data_dir: PathBuf = matches
        .get_one::<String>("data-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let bind_raw = matches
        .get_one::<String>("bind")
        .map(String::as_str)
        .unwrap_or(DEFAULT_BIND);
    let bind: SocketAddr = bind_raw
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind_raw))?;

    let auth = AuthConfig::from_env().context("loading authentication config")?;
    let config = ServerConfig {
        bind,
        data_dir,
        auth,
    };

    info!("Starting fitrack server");
    info!("Data directory: {}", config.data_dir.display());
    info!("Bind address: {}", config.bind);
    info!("Auth config: {:?}", config.auth);

    if !config.data_dir.exists() {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("creating data directory {}", config.data_dir.display())
        })?;
        info!("Created data directory: {}", config.data_dir.display());
    }

    let storage = Storage::open(&config.data_dir).context("initializing storage")?;
    info!("Storage initialized");

    let state = AppState::new(storage, &config.auth).context("initializing auth components")?;
    let server = FitrackServer::new(state);

    if let Err(e) = server.serve(config.bind).await {
        warn!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
