use anyhow::Context;
use clap::{Parser, Subcommand};
use nasa_core::{Config, NasaClient};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::http::{AppState, create_router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nasa-server", version, about = "NASA explorer API server")]
pub struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the API (default).
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port; overrides `PORT` and the config file.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write a config file with default values to `--config` or the platform config directory.
    InitConfig,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing();

        match self.command.unwrap_or(Command::Serve {
            host: "0.0.0.0".to_string(),
            port: None,
        }) {
            Command::InitConfig => {
                let path = init_config(self.config.as_deref())?;
                println!("Wrote {}", path.display());
                Ok(())
            }
            Command::Serve { host, port } => {
                let mut config = load_config(self.config.as_deref())?;
                config.apply_env();
                if let Some(port) = port {
                    config.port = port;
                }
                serve(config, &host).await
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Writes the file-level config (no env overrides) back to where it was read from.
fn init_config(path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let config = load_config(path)?;
    match path {
        Some(path) => {
            config.save_to(path)?;
            Ok(path.to_path_buf())
        }
        None => config.save(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn serve(config: Config, host: &str) -> anyhow::Result<()> {
    if config.is_demo_key() {
        warn!("Using NASA DEMO_KEY; set NASA_API_KEY for higher rate limits");
    }

    let api = NasaClient::new(&config).context("Failed to build NASA API client")?;
    let state = AppState::new(Arc::new(api));
    let app = create_router(state, &config.allowed_origins);

    let addr: SocketAddr = format!("{host}:{}", config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{}", config.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{addr}/api");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
