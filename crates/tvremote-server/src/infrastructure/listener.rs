//! TCP accept loop: one [`ServerMessageAdapter`] per device connection.
//!
//! Each accepted socket gets its own task that owns the adapter and waits for
//! the first transport error or server shutdown, then closes the connection.
//! The receive loop holds the adapter alive, so connections are always ended
//! with an explicit `close()` rather than by dropping the task.

use std::future::Future;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use tvremote_core::{TransportConfig, TransportError};

use crate::application::factory::start_server_adapter;
use crate::application::request_receiver::RequestReceiver;
use crate::application::server_adapter::ServerAdapter;
use crate::infrastructure::storage::config::NetworkConfig;

/// Error type for setting up the listening socket.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("bind failed on {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Binds the listening socket described by `network`.
///
/// # Errors
///
/// Returns [`ListenerError::BindFailed`] if the address is unusable or taken.
pub async fn bind(network: &NetworkConfig) -> Result<TcpListener, ListenerError> {
    let address = network.listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ListenerError::BindFailed {
            address: address.clone(),
            source,
        })?;
    info!("listening for devices on {address}");
    Ok(listener)
}

/// Accepts device connections until `shutdown` resolves.
///
/// `make_receiver` is called once per connection with the peer address.  On
/// shutdown every open connection is closed before this returns.
pub async fn serve<F, S>(
    listener: TcpListener,
    make_receiver: F,
    config: TransportConfig,
    shutdown: S,
) where
    F: Fn(SocketAddr) -> Arc<dyn RequestReceiver>,
    S: Future<Output = ()>,
{
    let mut connections = JoinSet::new();
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let receiver = make_receiver(peer);
                    connections.spawn(serve_connection(
                        stream,
                        peer,
                        receiver,
                        config.clone(),
                        stop_rx.clone(),
                    ));
                }
                Err(e) => {
                    // Usually fd exhaustion; back off instead of spinning.
                    warn!("accept failed: {e}");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    info!(open_connections = connections.len(), "server shutting down");
    let _ = stop_tx.send(true);
    while connections.join_next().await.is_some() {}
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    receiver: Arc<dyn RequestReceiver>,
    config: TransportConfig,
    stop: watch::Receiver<bool>,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(%peer, "could not disable Nagle: {e}");
    }
    let (reader, writer) = stream.into_split();
    let (errors_tx, mut errors) = mpsc::unbounded_channel::<TransportError>();
    let adapter = start_server_adapter(receiver, reader, writer, Arc::new(errors_tx), config).await;
    let id = adapter.transport().id();
    info!(connection = %id, %peer, "device connected");

    tokio::select! {
        error = errors.recv() => match error {
            Some(TransportError::Read(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                info!(connection = %id, %peer, "device disconnected");
            }
            Some(error) => warn!(connection = %id, %peer, %error, "connection failed"),
            None => {}
        },
        _ = stop_requested(stop) => {
            debug!(connection = %id, %peer, "closing for shutdown");
        }
    }
    adapter.close().await;
}

/// Resolves once shutdown is signalled or the server is gone.
async fn stop_requested(mut stop: watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}
