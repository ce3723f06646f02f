//! tvremote device command-line tool.
//!
//! Connects to a server, announces itself, sends one event, and waits briefly
//! for whatever the server sends back.
//!
//! ```text
//! tvremote-device --server 192.168.1.20:9551 key enter
//! tvremote-device fling https://example.com/watch --sequence 7
//! tvremote-device move --dx 40 --dy -10
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tvremote_core::{
    ConnectInfo, FlingResult, KeyAction, KeyCode, SequenceNumber, TransportConfig, TransportError,
};
use tvremote_device::{connect, DeviceAdapter, MessageReceiver};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Sends one remote-control event to a tvremote server.
#[derive(Debug, Parser)]
#[command(name = "tvremote-device", version)]
struct Cli {
    /// Server address as `host:port`.
    #[arg(long, default_value = "127.0.0.1:9551", env = "TVREMOTE_SERVER")]
    server: String,

    /// Device name announced in the Connect request.
    #[arg(long, default_value = "tvremote-cli", env = "TVREMOTE_DEVICE_NAME")]
    name: String,

    /// Application version announced alongside the name.
    #[arg(long)]
    app_version: Option<u32>,

    /// How long to wait for a reply before disconnecting, in milliseconds.
    #[arg(long, default_value_t = 1000, env = "TVREMOTE_REPLY_TIMEOUT_MS")]
    reply_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sends a ping and waits for the ack.
    Ping,
    /// Presses and/or releases a key.
    Key {
        /// Key name (`enter`, `volume_up`, ...) or a numeric key code.
        key: KeyCode,
        /// Send only this action instead of a down/up pair.
        #[arg(long)]
        action: Option<KeyAction>,
    },
    /// Moves the pointer by a relative amount.
    Move {
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        dx: i32,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        dy: i32,
    },
    /// Scrolls the wheel by a relative amount.
    Wheel {
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        dx: i32,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        dy: i32,
    },
    /// Sends typed data.
    Data { data_type: String, value: String },
    /// Asks the server to open a URI.
    Fling {
        uri: String,
        #[arg(long, default_value_t = 1)]
        sequence: SequenceNumber,
    },
}

impl Command {
    fn expects_reply(&self) -> bool {
        matches!(self, Command::Ping | Command::Fling { .. })
    }
}

// ── Receiver ──────────────────────────────────────────────────────────────────

/// Logs every server response and forwards a one-line summary to `main`.
struct ConsoleReceiver {
    replies: mpsc::UnboundedSender<String>,
}

impl MessageReceiver for ConsoleReceiver {
    fn on_ack(&self, sequence_number: SequenceNumber) {
        info!(sequence = sequence_number, "ack");
        let _ = self.replies.send(format!("ack {sequence_number}"));
    }

    fn on_data(&self, data_type: &str, value: &str) {
        info!(data_type, value, "data");
        let _ = self.replies.send(format!("data {data_type}={value}"));
    }

    fn on_fling_result(&self, result: FlingResult, sequence_number: Option<SequenceNumber>) {
        info!(?result, sequence = ?sequence_number, "fling result");
        let _ = self.replies.send(format!("fling {result:?}"));
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (replies_tx, mut replies) = mpsc::unbounded_channel();
    let (errors_tx, mut errors) = mpsc::unbounded_channel::<TransportError>();
    let receiver = Arc::new(ConsoleReceiver {
        replies: replies_tx,
    });

    let adapter = connect(
        cli.server.as_str(),
        receiver,
        Arc::new(errors_tx),
        TransportConfig::default(),
    )
    .await
    .with_context(|| format!("failed to reach server at {}", cli.server))?;

    let info = match cli.app_version {
        Some(version) => ConnectInfo::with_version(&cli.name, version),
        None => ConnectInfo::new(&cli.name),
    };
    adapter.send_connect(info).await;

    let expects_reply = cli.command.expects_reply();
    match cli.command {
        Command::Ping => {
            let sequence = adapter.send_ping().await;
            info!(sequence, "ping sent");
        }
        Command::Key { key, action } => match action {
            Some(action) => adapter.send_key_event(key, action).await,
            None => {
                adapter.send_key_event(key, KeyAction::Down).await;
                adapter.send_key_event(key, KeyAction::Up).await;
            }
        },
        Command::Move { dx, dy } => adapter.send_mouse_move(dx, dy).await,
        Command::Wheel { dx, dy } => adapter.send_mouse_wheel(dx, dy).await,
        Command::Data { data_type, value } => adapter.send_data(&data_type, &value).await,
        Command::Fling { uri, sequence } => adapter.send_fling(&uri, sequence).await,
    }

    let timeout = Duration::from_millis(cli.reply_timeout_ms);
    if expects_reply {
        tokio::select! {
            reply = replies.recv() => match reply {
                Some(reply) => println!("{reply}"),
                None => warn!("receiver dropped before a reply arrived"),
            },
            Some(error) = errors.recv() => warn!(%error, "connection failed"),
            _ = tokio::time::sleep(timeout) => warn!(timeout_ms = cli.reply_timeout_ms, "no reply"),
        }
    } else if let Ok(Some(error)) = tokio::time::timeout(timeout, errors.recv()).await {
        warn!(%error, "connection failed");
    }

    adapter.close().await;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
