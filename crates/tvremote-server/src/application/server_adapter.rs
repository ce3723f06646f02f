//! Server-side correlator: dispatches device requests to a
//! [`RequestReceiver`] and decides which of them get a reply.
//!
//! # Reply rules (for beginners)
//!
//! A request with a sequence number is answered by default, which is how a
//! ping gets its ack.  Each request kind then overrides that default:
//!
//! | Request     | Reply?                     |
//! |-------------|----------------------------|
//! | KeyEvent    | never                      |
//! | MouseMove   | never                      |
//! | MouseWheel  | never                      |
//! | Data        | never                      |
//! | Connect     | never                      |
//! | Fling       | always, with a FlingResult |
//!
//! Input events are high frequency and must not generate reply traffic,
//! while a fling always reports its outcome.  When one body carries several
//! requests they are handled in the table's order and the last override
//! decides, so only a fling can cause a reply there.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use tvremote_core::{
    Body, DataMessage, Envelope, FlingResult, FrameTransport, MessageListener, Request, Response,
    ResponseMessage,
};

use crate::application::request_receiver::RequestReceiver;

/// What the host application can push to a device.
#[async_trait]
pub trait ServerAdapter: Send + Sync {
    /// Sends unsolicited data, without a sequence number.
    async fn send_data(&self, data_type: &str, value: &str);
    /// Stops receiving; the connection stays open.
    async fn stop(&self);
    /// Stops receiving and closes the connection.
    async fn close(&self);
}

/// The server end of one connection.
pub struct ServerMessageAdapter {
    transport: Arc<FrameTransport>,
    receiver: Arc<dyn RequestReceiver>,
}

impl ServerMessageAdapter {
    pub fn new(transport: Arc<FrameTransport>, receiver: Arc<dyn RequestReceiver>) -> Self {
        Self {
            transport,
            receiver,
        }
    }

    pub fn transport(&self) -> &Arc<FrameTransport> {
        &self.transport
    }

    /// Reads and dispatches one device envelope on the caller's task.
    ///
    /// For adapters built without a receive loop.  Returns `false` once the
    /// connection has failed.
    pub async fn receive_next(&self) -> bool {
        self.transport.receive_next(self).await
    }

    /// Runs every request in `requests` and returns the reply body, if one
    /// is due.
    fn dispatch(&self, requests: Vec<Request>, mut reply_intent: bool) -> Option<ResponseMessage> {
        let mut reply = ResponseMessage::ack();

        for request in requests {
            match request {
                Request::Ping => {}
                Request::KeyEvent(m) => {
                    self.receiver.on_key_event(m.code, m.action);
                    reply_intent = false;
                }
                Request::MouseMove(m) => {
                    self.receiver.on_mouse_event(m.dx, m.dy);
                    reply_intent = false;
                }
                Request::MouseWheel(m) => {
                    self.receiver.on_mouse_wheel(m.dx, m.dy);
                    reply_intent = false;
                }
                Request::Data(m) => {
                    self.receiver.on_data(&m.data_type, &m.value);
                    reply_intent = false;
                }
                Request::Connect(info) => {
                    debug!(connection = %self.transport.id(), device = %info, "device connected");
                    self.receiver.on_connect(&info);
                    reply_intent = false;
                }
                Request::Fling(m) => {
                    let result = FlingResult::from_success(self.receiver.on_fling(&m.uri));
                    reply = ResponseMessage::from(Response::FlingResult(result));
                    reply_intent = true;
                }
            }
        }

        reply_intent.then_some(reply)
    }
}

#[async_trait]
impl ServerAdapter for ServerMessageAdapter {
    async fn send_data(&self, data_type: &str, value: &str) {
        let body = ResponseMessage::from(Response::Data(DataMessage::new(data_type, value)));
        self.transport.send(&Envelope::response(body, None)).await;
    }

    async fn stop(&self) {
        self.transport.stop().await;
    }

    async fn close(&self) {
        self.transport.close().await;
    }
}

#[async_trait]
impl MessageListener for ServerMessageAdapter {
    async fn on_message(&self, envelope: Envelope) {
        let sequence_number = envelope.sequence_number;
        let body = match envelope.body {
            Body::Request(body) => body,
            Body::Response(_) => {
                warn!(
                    connection = %self.transport.id(),
                    "server received a response envelope; ignoring"
                );
                return;
            }
        };

        if body.is_ping() {
            debug!(connection = %self.transport.id(), sequence = ?sequence_number, "ping");
        }

        if let Some(reply) = self.dispatch(body.into_requests(), sequence_number.is_some()) {
            self.transport
                .send(&Envelope::response(reply, sequence_number))
                .await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
