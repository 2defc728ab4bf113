//! Directory file server.
//!
//! Exposes one directory over HTTP with a streamed listing endpoint and a
//! remote shutdown trigger.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   FILE SERVER                    │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐    ┌─────────┐    ┌─────────────┐   │
//!   ──────────────────┼─▶│   net   │───▶│  http   │───▶│  /files/*   │───┼──▶ ServeDir
//!                     │  │listener │    │ router  │    │  /filelist  │───┼──▶ listing walk
//!                     │  └─────────┘    └─────────┘    │  /health    │   │
//!                     │                                │  /shutdown  │   │
//!                     │                                └──────┬──────┘   │
//!                     │                                       │ trigger  │
//!                     │  ┌────────────────────────────────────▼───────┐  │
//!                     │  │ lifecycle: Starting → Running              │  │
//!                     │  │            → ShuttingDown → Stopped        │  │
//!                     │  └────────────────────────────────────────────┘  │
//!                     │  config · observability (tracing, metrics)       │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use fileserver::config::validation::validate_config;
use fileserver::config::{load_config, resolve_served_root, ConfigError, ServerConfig};
use fileserver::lifecycle::signals::spawn_signal_listener;
use fileserver::lifecycle::LifecycleServer;
use fileserver::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "fileserver")]
#[command(about = "Serve a directory over HTTP", long_about = None)]
struct Cli {
    /// Directory to serve (defaults to the current working directory)
    #[arg(long, env = "FILESERVER_SERVED_DIR")]
    served_dir: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "FILESERVER_LISTEN_ADDRESS")]
    listen_address: Option<String>,

    /// Port to listen on
    #[arg(long, env = "FILESERVER_LISTEN_PORT")]
    listen_port: Option<u16>,

    /// Optional TOML config file
    #[arg(long, env = "FILESERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<(ServerConfig, bool), ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(dir) = self.served_dir {
            config.served_dir = Some(dir);
        }
        if let Some(address) = self.listen_address {
            config.listener.address = address;
        }
        if let Some(port) = self.listen_port {
            config.listener.port = port;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok((config, self.verbose))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, verbose) = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level, verbose);

    tracing::info!("fileserver v{} starting", env!("CARGO_PKG_VERSION"));

    let served_root = resolve_served_root(&config)?;

    tracing::info!(
        served_dir = %served_root.display(),
        bind_address = %config.listener.bind_address(),
        drain_timeout_secs = config.shutdown.drain_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = LifecycleServer::new(config, served_root);
    let signals = spawn_signal_listener(server.shutdown_handle());

    let result = server.run().await;
    signals.abort();

    if let Err(e) = result {
        tracing::error!(error = %e, "Server exited with error");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
