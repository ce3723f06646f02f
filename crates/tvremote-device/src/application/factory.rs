//! Constructors for device adapters over an already-established stream.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tvremote_core::{ErrorListener, FrameTransport, MessageListener, TransportConfig};

use crate::application::device_adapter::DeviceMessageAdapter;
use crate::application::message_receiver::MessageReceiver;

/// Builds a device adapter and starts its background receive loop.
pub async fn start_device_adapter<R, W>(
    receiver: Arc<dyn MessageReceiver>,
    reader: R,
    writer: W,
    error_listener: Arc<dyn ErrorListener>,
    config: TransportConfig,
) -> Arc<DeviceMessageAdapter>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let adapter = device_adapter_without_receiving(receiver, reader, writer, error_listener, config);
    let listener: Arc<dyn MessageListener> = Arc::clone(&adapter) as _;
    adapter.transport().start_receiving(listener).await;
    adapter
}

/// Builds a device adapter with no receive loop.  The caller drives inbound
/// traffic with [`DeviceMessageAdapter::receive_next`].
pub fn device_adapter_without_receiving<R, W>(
    receiver: Arc<dyn MessageReceiver>,
    reader: R,
    writer: W,
    error_listener: Arc<dyn ErrorListener>,
    config: TransportConfig,
) -> Arc<DeviceMessageAdapter>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let transport = FrameTransport::new(reader, writer)
        .with_config(config)
        .with_error_listener(error_listener);
    Arc::new(DeviceMessageAdapter::new(Arc::new(transport), receiver))
}
