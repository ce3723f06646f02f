//! Event body codec and frame helpers.
//!
//! Wire format of one frame:
//! ```text
//! [body_len:4][body:N]
//! ```
//! `body_len` is big-endian.  The body is whatever the active [`WireCodec`]
//! produces for one [`Envelope`]; the default is [`BincodeCodec`].

use bincode::Options;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::protocol::messages::Envelope;
use crate::transport::TransportError;

/// Size of the big-endian length prefix in front of every frame body.
pub const FRAME_PREFIX_SIZE: usize = 4;

/// Errors that can occur while turning envelopes into bytes and back.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode envelope: {0}")]
    Decode(#[source] bincode::Error),

    /// The declared or produced body length exceeds the configured ceiling.
    #[error("frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge { size: usize, max: usize },
}

/// Serializes envelopes to and from a frame body.
///
/// Implementations must be stateless with respect to individual frames: the
/// transport may call `encode` and `decode` concurrently from different tasks.
pub trait WireCodec: Send + Sync {
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, body: &[u8]) -> Result<Envelope, CodecError>;
}

/// Default [`WireCodec`] backed by serde + bincode.
///
/// Fixed-width little-endian integers.  A body must decode to exactly one
/// envelope: trailing bytes are a decode error.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

impl WireCodec for BincodeCodec {
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
        bincode_options()
            .serialize(envelope)
            .map_err(CodecError::Encode)
    }

    fn decode(&self, body: &[u8]) -> Result<Envelope, CodecError> {
        bincode_options()
            .deserialize(body)
            .map_err(CodecError::Decode)
    }
}

// ── Frame helpers ─────────────────────────────────────────────────────────────

/// Encodes `envelope` and prepends the 4-byte length prefix.
///
/// # Errors
///
/// Returns [`CodecError::FrameTooLarge`] if the body is longer than
/// `max_frame_len`, or the codec's own error if serialization fails.
pub fn encode_frame(
    codec: &dyn WireCodec,
    envelope: &Envelope,
    max_frame_len: usize,
) -> Result<Vec<u8>, CodecError> {
    let body = codec.encode(envelope)?;
    if body.len() > max_frame_len {
        return Err(CodecError::FrameTooLarge {
            size: body.len(),
            max: max_frame_len,
        });
    }

    let mut frame = Vec::with_capacity(FRAME_PREFIX_SIZE + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Body length declared by a frame prefix, checked against `max_frame_len`.
pub(crate) fn declared_body_len(
    prefix: [u8; FRAME_PREFIX_SIZE],
    max_frame_len: usize,
) -> Result<usize, CodecError> {
    let body_len = u32::from_be_bytes(prefix) as usize;
    if body_len > max_frame_len {
        return Err(CodecError::FrameTooLarge {
            size: body_len,
            max: max_frame_len,
        });
    }
    Ok(body_len)
}

/// Reads exactly one frame from `reader` and decodes its body.
///
/// Blocks (asynchronously) until the whole frame has arrived; short reads
/// from the underlying stream are retried by `read_exact`.  The declared
/// length is checked against `max_frame_len` before the body buffer is
/// allocated.
///
/// Not cancel safe: dropping the future mid-frame discards the bytes already
/// consumed.  [`FrameTransport`](crate::FrameTransport) keeps its own
/// partial-frame buffer for that reason.
///
/// # Errors
///
/// - [`TransportError::Read`] if the stream fails or ends mid-frame.
/// - [`TransportError::Codec`] if the length is too large or the body does
///   not decode.
pub async fn read_frame<R>(
    reader: &mut R,
    codec: &dyn WireCodec,
    max_frame_len: usize,
) -> Result<Envelope, TransportError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut prefix = [0u8; FRAME_PREFIX_SIZE];
    reader
        .read_exact(&mut prefix)
        .await
        .map_err(TransportError::Read)?;

    let body_len = declared_body_len(prefix, max_frame_len)?;

    let mut body = vec![0u8; body_len];
    reader
        .read_exact(&mut body)
        .await
        .map_err(TransportError::Read)?;

    Ok(codec.decode(&body)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::connect_info::ConnectInfo;
    use crate::protocol::messages::{FlingResult, Request, Response, ResponseMessage};

    const MAX: usize = 1024 * 1024;

    #[test]
    fn test_encode_frame_prefix_matches_body_length() {
        // Arrange
        let envelope = Envelope::request(Request::Connect(ConnectInfo::new("tablet")), None);

        // Act
        let frame = encode_frame(&BincodeCodec, &envelope, MAX).unwrap();

        // Assert
        let declared = u32::from_be_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(declared, frame.len() - FRAME_PREFIX_SIZE);
    }

    #[test]
    fn test_encode_frame_rejects_oversized_body() {
        let envelope = Envelope::request(Request::Ping, Some(1));

        let result = encode_frame(&BincodeCodec, &envelope, 2);

        assert!(matches!(result, Err(CodecError::FrameTooLarge { max: 2, .. })));
    }

    #[tokio::test]
    async fn test_read_frame_decodes_what_encode_frame_wrote() {
        // Arrange
        let envelope = Envelope::response(
            ResponseMessage::from(Response::FlingResult(FlingResult::Success)),
            Some(9),
        );
        let frame = encode_frame(&BincodeCodec, &envelope, MAX).unwrap();

        // Act
        let mut reader: &[u8] = &frame;
        let decoded = read_frame(&mut reader, &BincodeCodec, MAX).await.unwrap();

        // Assert
        assert_eq!(decoded, envelope);
        assert!(reader.is_empty(), "exactly one frame must be consumed");
    }

    #[tokio::test]
    async fn test_read_frame_rejects_declared_length_above_max() {
        let bytes = [0x7F, 0xFF, 0xFF, 0xFF];
        let mut reader: &[u8] = &bytes;

        let result = read_frame(&mut reader, &BincodeCodec, MAX).await;

        assert!(matches!(
            result,
            Err(TransportError::Codec(CodecError::FrameTooLarge { .. }))
        ));
    }

    #[tokio::test]
    async fn test_read_frame_truncated_body_is_read_error() {
        let envelope = Envelope::request(Request::Ping, Some(3));
        let frame = encode_frame(&BincodeCodec, &envelope, MAX).unwrap();
        let mut reader: &[u8] = &frame[..frame.len() - 1];

        let result = read_frame(&mut reader, &BincodeCodec, MAX).await;

        assert!(matches!(result, Err(TransportError::Read(_))));
    }

    #[tokio::test]
    async fn test_read_frame_garbage_body_is_codec_error() {
        // A body whose first byte is not a valid Option tag.
        let bytes = [0, 0, 0, 1, 0xEE];
        let mut reader: &[u8] = &bytes;

        let result = read_frame(&mut reader, &BincodeCodec, MAX).await;

        assert!(matches!(
            result,
            Err(TransportError::Codec(CodecError::Decode(_)))
        ));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_body_longer_than_envelope() {
        // Arrange – a valid ping body followed by three stray bytes, with the
        // prefix covering all of them
        let mut body = BincodeCodec
            .encode(&Envelope::request(Request::Ping, Some(1)))
            .unwrap();
        body.extend_from_slice(&[0xDE, 0xAD, 0xBE]);
        let mut frame = (body.len() as u32).to_be_bytes().to_vec();
        frame.extend_from_slice(&body);

        // Act
        let result = read_frame(&mut frame.as_slice(), &BincodeCodec, MAX).await;

        // Assert
        assert!(matches!(
            result,
            Err(TransportError::Codec(CodecError::Decode(_)))
        ));
    }

    #[test]
    fn test_bincode_body_layout_is_fixint() {
        // Some(7) as [tag:1][u32 LE], then the Request variant index as u32 LE
        let body = BincodeCodec
            .encode(&Envelope::request(Request::Ping, Some(7)))
            .unwrap();

        assert_eq!(&body[..9], &[1, 7, 0, 0, 0, 0, 0, 0, 0]);
    }
}
