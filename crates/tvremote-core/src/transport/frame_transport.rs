//! Whole-frame send and receive over one established byte stream.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::TransportConfig;
use crate::protocol::codec::{
    declared_body_len, encode_frame, BincodeCodec, WireCodec, FRAME_PREFIX_SIZE,
};
use crate::protocol::messages::Envelope;
use crate::transport::receive_loop::{LoopState, ReceiveLoop};
use crate::transport::{ErrorListener, MessageListener, TransportError};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Read half plus the bytes of any frame that has not fully arrived.
///
/// Bytes are moved from the stream into `pending` by `read_buf`, which is
/// cancel safe.  A receive dropped mid-frame (the receive loop being stopped,
/// say) therefore leaves the stream position intact and the next receive
/// resumes the same frame.
struct FrameReader {
    inner: BoxedReader,
    pending: Vec<u8>,
}

impl FrameReader {
    fn new(inner: BoxedReader) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    async fn next_frame(
        &mut self,
        codec: &dyn WireCodec,
        max_frame_len: usize,
    ) -> Result<Envelope, TransportError> {
        loop {
            if let Some(frame_len) = self.buffered_frame_len(max_frame_len)? {
                let decoded = codec.decode(&self.pending[FRAME_PREFIX_SIZE..frame_len]);
                self.pending.drain(..frame_len);
                return Ok(decoded?);
            }

            let read = self
                .inner
                .read_buf(&mut self.pending)
                .await
                .map_err(TransportError::Read)?;
            if read == 0 {
                return Err(TransportError::Read(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!("stream ended with {} bytes of an unfinished frame", self.pending.len()),
                )));
            }
        }
    }

    /// Total length (prefix included) of the first buffered frame, once all
    /// of it is in `pending`.
    fn buffered_frame_len(&mut self, max_frame_len: usize) -> Result<Option<usize>, TransportError> {
        if self.pending.len() < FRAME_PREFIX_SIZE {
            return Ok(None);
        }
        let mut prefix = [0u8; FRAME_PREFIX_SIZE];
        prefix.copy_from_slice(&self.pending[..FRAME_PREFIX_SIZE]);
        let frame_len = FRAME_PREFIX_SIZE + declared_body_len(prefix, max_frame_len)?;

        if self.pending.len() < frame_len {
            self.pending.reserve(frame_len - self.pending.len());
            return Ok(None);
        }
        Ok(Some(frame_len))
    }
}

/// Exclusive owner of a stream's read and write halves.
///
/// The input lock and the output lock are independent: a pending receive
/// never delays a send.  Each half becomes `None` once the transport is
/// closed.
pub struct FrameTransport {
    id: Uuid,
    reader: Mutex<Option<FrameReader>>,
    writer: Mutex<Option<BoxedWriter>>,
    codec: Arc<dyn WireCodec>,
    error_listener: Option<Arc<dyn ErrorListener>>,
    config: TransportConfig,
    receive_loop: ReceiveLoop,
}

impl FrameTransport {
    /// Wraps the two halves of a stream using [`BincodeCodec`] and the
    /// default [`TransportConfig`].
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let config = TransportConfig::default();
        Self {
            id: Uuid::new_v4(),
            reader: Mutex::new(Some(FrameReader::new(Box::new(reader)))),
            writer: Mutex::new(Some(Box::new(writer))),
            codec: Arc::new(BincodeCodec),
            error_listener: None,
            receive_loop: ReceiveLoop::new(config.stop_grace_period()),
            config,
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn WireCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_error_listener(mut self, listener: Arc<dyn ErrorListener>) -> Self {
        self.error_listener = Some(listener);
        self
    }

    pub fn with_config(mut self, config: TransportConfig) -> Self {
        self.receive_loop = ReceiveLoop::new(config.stop_grace_period());
        self.config = config;
        self
    }

    /// Connection id used in log fields.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn loop_state(&self) -> LoopState {
        self.receive_loop.state()
    }

    /// Encodes and writes one complete frame.
    ///
    /// Concurrent callers queue on the output lock, so frames never
    /// interleave.  Failures are reported to the error listener.
    pub async fn send(&self, envelope: &Envelope) {
        if let Err(error) = self.write_envelope(envelope).await {
            self.report_error(error);
        }
    }

    async fn write_envelope(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let frame = encode_frame(self.codec.as_ref(), envelope, self.config.max_frame_len)?;

        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(TransportError::Closed)?;
        writer.write_all(&frame).await.map_err(TransportError::Write)?;
        writer.flush().await.map_err(TransportError::Write)?;

        debug!(
            connection = %self.id,
            kind = envelope.kind(),
            sequence = ?envelope.sequence_number,
            bytes = frame.len(),
            "sent frame"
        );
        Ok(())
    }

    /// Waits for exactly one frame and decodes it.
    ///
    /// Cancel safe: bytes of a partly received frame stay buffered in the
    /// transport if the returned future is dropped.
    pub async fn receive_one(&self) -> Result<Envelope, TransportError> {
        let mut guard = self.reader.lock().await;
        let reader = guard.as_mut().ok_or(TransportError::Closed)?;
        let envelope = reader
            .next_frame(self.codec.as_ref(), self.config.max_frame_len)
            .await?;

        debug!(
            connection = %self.id,
            kind = envelope.kind(),
            sequence = ?envelope.sequence_number,
            "received frame"
        );
        Ok(envelope)
    }

    /// Reads one frame and dispatches it to `listener` on the caller's task.
    ///
    /// Returns `false` once the stream has failed; the failure has then been
    /// reported to the error listener.
    pub async fn receive_next(&self, listener: &dyn MessageListener) -> bool {
        match self.receive_one().await {
            Ok(envelope) => {
                listener.on_message(envelope).await;
                true
            }
            Err(error) => {
                self.report_error(error);
                false
            }
        }
    }

    /// Starts (or restarts) the background receive loop.
    pub async fn start_receiving(self: &Arc<Self>, listener: Arc<dyn MessageListener>) {
        self.receive_loop.start(Arc::clone(self), listener).await;
    }

    /// Stops the receive loop.  The stream itself stays open.
    pub async fn stop(&self) {
        self.receive_loop.stop().await;
    }

    /// Stops the receive loop, drops the read half and shuts the write half
    /// down.  Later sends report [`TransportError::Closed`].
    pub async fn close(&self) {
        self.stop().await;

        self.reader.lock().await.take();
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                debug!(connection = %self.id, error = %e, "shutdown of write half failed");
            }
        }
        debug!(connection = %self.id, "transport closed");
    }

    /// Hands `error` to the registered error listener, or logs it when none
    /// is registered.
    pub fn report_error(&self, error: TransportError) {
        match &self.error_listener {
            Some(listener) => listener.on_error(error),
            None => warn!(connection = %self.id, %error, "transport error"),
        }
    }
}

impl std::fmt::Debug for FrameTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameTransport")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("loop_state", &self.loop_state())
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
