//! Reads and writes length-prefixed pairing frames on an async stream pair.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::config::TransportConfig;
use crate::pairing::codec::PairingOuterEnvelope;
use crate::pairing::error::PairingError;
use crate::pairing::messages::{PairingMessage, PairingType, StatusCode};

/// Frames pairing messages as `[len:4 BE][outer envelope]`.
///
/// Holds no handshake state of its own; each call reads or writes exactly
/// one frame.
#[derive(Debug)]
pub struct PairingFramer<R, W> {
    reader: R,
    writer: W,
    max_frame_len: usize,
}

impl<R, W> PairingFramer<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            max_frame_len: TransportConfig::default().max_frame_len,
        }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Reads one frame and decodes its outer envelope without looking at the
    /// status or the inner payload.
    pub async fn read_outer(&mut self) -> Result<PairingOuterEnvelope, PairingError> {
        let mut prefix = [0u8; 4];
        self.reader.read_exact(&mut prefix).await?;

        let len = u32::from_be_bytes(prefix) as usize;
        if len > self.max_frame_len {
            return Err(PairingError::FrameTooLarge {
                size: len,
                max: self.max_frame_len,
            });
        }

        let mut body = vec![0u8; len];
        self.reader.read_exact(&mut body).await?;
        PairingOuterEnvelope::decode(&body)
    }

    /// Reads one frame and returns its inner message.
    ///
    /// A non-OK status fails with [`PairingError::Protocol`] and no message is
    /// produced.
    pub async fn read_next(&mut self) -> Result<PairingMessage, PairingError> {
        let outer = self.read_outer().await?;
        let message = outer.into_message()?;
        debug!(message_type = %message.message_type(), "read pairing message");
        Ok(message)
    }

    /// Reads one message and fails unless it is of type `expected`.
    pub async fn get_next_message(
        &mut self,
        expected: PairingType,
    ) -> Result<PairingMessage, PairingError> {
        let message = self.read_next().await?;
        let actual = message.message_type();
        if actual != expected {
            return Err(PairingError::UnexpectedMessage { expected, actual });
        }
        Ok(message)
    }

    /// Wraps `message` in an OK envelope and writes it.  Nothing is written
    /// if the message cannot be encoded.
    pub async fn write_next(&mut self, message: &PairingMessage) -> Result<(), PairingError> {
        let outer = PairingOuterEnvelope::for_message(message)?;
        self.write_outer(&outer).await?;
        debug!(message_type = %message.message_type(), "wrote pairing message");
        Ok(())
    }

    /// Tells the peer the handshake failed, choosing the status from `error`.
    pub async fn write_error(&mut self, error: &PairingError) -> Result<(), PairingError> {
        let status = StatusCode::from(error);
        self.write_outer(&PairingOuterEnvelope::error(status)).await?;
        debug!(%status, %error, "wrote pairing error");
        Ok(())
    }

    async fn write_outer(&mut self, outer: &PairingOuterEnvelope) -> Result<(), PairingError> {
        let body = outer.encode();
        if body.len() > self.max_frame_len {
            return Err(PairingError::FrameTooLarge {
                size: body.len(),
                max: self.max_frame_len,
            });
        }

        // Prefix and body go out as two writes on the same stream.
        self.writer
            .write_all(&(body.len() as u32).to_be_bytes())
            .await?;
        self.writer.write_all(&body).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Returns the underlying stream halves, e.g. to hand them to the event
    /// transport once pairing succeeds.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
