//! Device-side correlator: turns domain calls into request envelopes and
//! server envelopes into [`MessageReceiver`] callbacks.
//!
//! # Sequence numbers (for beginners)
//!
//! Only two requests carry a sequence number:
//!
//! - **Ping** draws one from the adapter's own counter, starting at 1.  The
//!   server echoes it back on an empty response, which arrives here as an ack.
//! - **Fling** uses a number chosen by the caller, so the application can
//!   match the later [`FlingResult`](tvremote_core::FlingResult) to the URI it
//!   asked for.
//!
//! Everything else is fire-and-forget.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use tvremote_core::protocol::messages::{FlingMessage, KeyEventMessage, MouseMotion};
use tvremote_core::{
    Body, ConnectInfo, DataMessage, Envelope, FrameTransport, KeyAction, KeyCode,
    MessageListener, Request, Response, SequenceCounter, SequenceNumber,
};

use crate::application::message_receiver::MessageReceiver;

/// What the device application can ask of the server.
#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    /// Sends a ping and returns the sequence number it carries.
    async fn send_ping(&self) -> SequenceNumber;
    async fn send_key_event(&self, code: KeyCode, action: KeyAction);
    async fn send_mouse_move(&self, dx: i32, dy: i32);
    async fn send_mouse_wheel(&self, dx: i32, dy: i32);
    async fn send_data(&self, data_type: &str, value: &str);
    async fn send_connect(&self, info: ConnectInfo);
    /// Asks the server to open `uri`.  The result arrives later through
    /// [`MessageReceiver::on_fling_result`].
    async fn send_fling(&self, uri: &str, sequence_number: SequenceNumber);
    /// Stops receiving; the connection stays open.
    async fn stop(&self);
    /// Stops receiving and closes the connection.
    async fn close(&self);
}

/// The device end of one connection.
pub struct DeviceMessageAdapter {
    transport: Arc<FrameTransport>,
    receiver: Arc<dyn MessageReceiver>,
    ping_counter: SequenceCounter,
}

impl DeviceMessageAdapter {
    pub fn new(transport: Arc<FrameTransport>, receiver: Arc<dyn MessageReceiver>) -> Self {
        Self {
            transport,
            receiver,
            ping_counter: SequenceCounter::new(),
        }
    }

    pub fn transport(&self) -> &Arc<FrameTransport> {
        &self.transport
    }

    /// Reads and dispatches one server envelope on the caller's task.
    ///
    /// For adapters built without a receive loop.  Returns `false` once the
    /// connection has failed.
    pub async fn receive_next(&self) -> bool {
        self.transport.receive_next(self).await
    }

    async fn send_request(&self, request: Request, sequence_number: Option<SequenceNumber>) {
        self.transport
            .send(&Envelope::request(request, sequence_number))
            .await;
    }
}

#[async_trait]
impl DeviceAdapter for DeviceMessageAdapter {
    async fn send_ping(&self) -> SequenceNumber {
        let sequence_number = self.ping_counter.next();
        self.send_request(Request::Ping, Some(sequence_number)).await;
        sequence_number
    }

    async fn send_key_event(&self, code: KeyCode, action: KeyAction) {
        self.send_request(Request::KeyEvent(KeyEventMessage { code, action }), None)
            .await;
    }

    async fn send_mouse_move(&self, dx: i32, dy: i32) {
        self.send_request(Request::MouseMove(MouseMotion { dx, dy }), None)
            .await;
    }

    async fn send_mouse_wheel(&self, dx: i32, dy: i32) {
        self.send_request(Request::MouseWheel(MouseMotion { dx, dy }), None)
            .await;
    }

    async fn send_data(&self, data_type: &str, value: &str) {
        self.send_request(Request::Data(DataMessage::new(data_type, value)), None)
            .await;
    }

    async fn send_connect(&self, info: ConnectInfo) {
        debug!(connection = %self.transport.id(), device = %info, "announcing device");
        self.send_request(Request::Connect(info), None).await;
    }

    async fn send_fling(&self, uri: &str, sequence_number: SequenceNumber) {
        let fling = FlingMessage {
            uri: uri.to_string(),
        };
        self.send_request(Request::Fling(fling), Some(sequence_number))
            .await;
    }

    async fn stop(&self) {
        self.transport.stop().await;
    }

    async fn close(&self) {
        self.transport.close().await;
    }
}

#[async_trait]
impl MessageListener for DeviceMessageAdapter {
    async fn on_message(&self, envelope: Envelope) {
        let sequence_number = envelope.sequence_number;
        let response = match envelope.body {
            Body::Response(body) => body.into_response(),
            Body::Request(_) => {
                warn!(
                    connection = %self.transport.id(),
                    "device received a request envelope; ignoring"
                );
                return;
            }
        };

        match response {
            Response::FlingResult(result) => self.receiver.on_fling_result(result, sequence_number),
            Response::Data(data) => self.receiver.on_data(&data.data_type, &data.value),
            Response::Empty => match sequence_number {
                Some(seq) => self.receiver.on_ack(seq),
                None => debug!(
                    connection = %self.transport.id(),
                    "empty response without sequence number dropped"
                ),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
