//! TCP connection to a tvremote server.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{info, warn};
use tvremote_core::{ErrorListener, TransportConfig};

use crate::application::device_adapter::DeviceMessageAdapter;
use crate::application::factory::start_device_adapter;
use crate::application::message_receiver::MessageReceiver;

/// Error type for establishing a device connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Connects to `address` over TCP and returns a receiving device adapter.
///
/// No retry is attempted; reconnecting is up to the caller.
///
/// # Errors
///
/// Returns [`ConnectionError::Connect`] if the TCP connection fails.
pub async fn connect<A>(
    address: A,
    receiver: Arc<dyn MessageReceiver>,
    error_listener: Arc<dyn ErrorListener>,
    config: TransportConfig,
) -> Result<Arc<DeviceMessageAdapter>, ConnectionError>
where
    A: ToSocketAddrs + std::fmt::Display,
{
    let stream = TcpStream::connect(&address)
        .await
        .map_err(|source| ConnectionError::Connect {
            address: address.to_string(),
            source,
        })?;
    // Key and pointer events are tiny; do not let Nagle batch them.
    if let Err(e) = stream.set_nodelay(true) {
        warn!("could not disable Nagle on device socket: {e}");
    }

    let peer = stream.peer_addr().ok();
    let (reader, writer) = stream.into_split();
    let adapter = start_device_adapter(receiver, reader, writer, error_listener, config).await;

    info!(
        connection = %adapter.transport().id(),
        peer = ?peer,
        "connected to server at {address}"
    );
    Ok(adapter)
}
