//! Constructors for server adapters over an accepted stream.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tvremote_core::{ErrorListener, FrameTransport, MessageListener, TransportConfig};

use crate::application::request_receiver::RequestReceiver;
use crate::application::server_adapter::ServerMessageAdapter;

/// Builds a server adapter and starts its background receive loop.
pub async fn start_server_adapter<R, W>(
    receiver: Arc<dyn RequestReceiver>,
    reader: R,
    writer: W,
    error_listener: Arc<dyn ErrorListener>,
    config: TransportConfig,
) -> Arc<ServerMessageAdapter>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let adapter = server_adapter_without_receiving(receiver, reader, writer, error_listener, config);
    let listener: Arc<dyn MessageListener> = Arc::clone(&adapter) as _;
    adapter.transport().start_receiving(listener).await;
    adapter
}

/// Builds a server adapter with no receive loop; drive it with
/// [`ServerMessageAdapter::receive_next`].
pub fn server_adapter_without_receiving<R, W>(
    receiver: Arc<dyn RequestReceiver>,
    reader: R,
    writer: W,
    error_listener: Arc<dyn ErrorListener>,
    config: TransportConfig,
) -> Arc<ServerMessageAdapter>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let transport = FrameTransport::new(reader, writer)
        .with_config(config)
        .with_error_listener(error_listener);
    Arc::new(ServerMessageAdapter::new(Arc::new(transport), receiver))
}
