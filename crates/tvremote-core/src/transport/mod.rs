//! Framed duplex transport and its background receive loop.
//!
//! [`FrameTransport`] owns both halves of an established byte stream.  Sends
//! and receives each hold their own lock, so a send never waits for a pending
//! read and two sends never interleave bytes on the wire.
//!
//! Failures on either path are handed to an [`ErrorListener`] instead of being
//! returned to whichever caller happened to trigger them.

pub mod frame_transport;
pub mod receive_loop;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::protocol::codec::CodecError;
use crate::protocol::messages::Envelope;

pub use frame_transport::FrameTransport;
pub use receive_loop::{LoopState, ReceiveLoop};

/// Errors raised while moving frames over the stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The read half failed or ended before a whole frame arrived.
    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    /// The write half failed.  A partially written frame is not rolled back.
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The transport was closed; no further frames can be sent or received.
    #[error("transport closed")]
    Closed,
}

/// Receives transport failures.
///
/// Called from whichever task hit the failure (a sender, or the receive
/// loop), so implementations must not block.
pub trait ErrorListener: Send + Sync {
    fn on_error(&self, error: TransportError);
}

impl ErrorListener for mpsc::UnboundedSender<TransportError> {
    fn on_error(&self, error: TransportError) {
        // The receiving side may already be gone during shutdown.
        let _ = self.send(error);
    }
}

/// Receives every envelope decoded by a transport.
#[async_trait]
pub trait MessageListener: Send + Sync {
    /// Runs on the receive loop's task; the next frame is not read until
    /// this returns.
    async fn on_message(&self, envelope: Envelope);
}
