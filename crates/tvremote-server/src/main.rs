//! tvremote server binary.
//!
//! Listens for devices and logs every event they send.
//!
//! ```text
//! tvremote-server --config /etc/tvremote/server.toml
//! tvremote-server --port 9600
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tvremote_server::{bind, load_config, serve, LoggingReceiver, RequestReceiver};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Accepts tvremote device connections.
#[derive(Debug, Parser)]
#[command(name = "tvremote-server", version)]
struct Cli {
    /// TOML config file; defaults apply when it does not exist.
    #[arg(long, default_value = "tvremote-server.toml", env = "TVREMOTE_CONFIG")]
    config: PathBuf,

    /// Overrides `network.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Overrides `network.port`.
    #[arg(long, env = "TVREMOTE_PORT")]
    port: Option<u16>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(bind_address) = cli.bind {
        config.network.bind_address = bind_address;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let listener = bind(&config.network).await?;
    serve(
        listener,
        |_peer| -> Arc<dyn RequestReceiver> { Arc::new(LoggingReceiver) },
        config.transport,
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        },
    )
    .await;

    info!("stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tvremote-server"]);
        assert_eq!(cli.config, PathBuf::from("tvremote-server.toml"));
        assert!(cli.bind.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["tvremote-server", "--bind", "127.0.0.1", "--port", "9600"]);
        assert_eq!(cli.bind.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(9600));
    }
}
