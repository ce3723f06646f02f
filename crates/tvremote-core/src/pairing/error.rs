use thiserror::Error;

use crate::pairing::messages::{PairingType, StatusCode};

/// Everything that can go wrong while reading or writing pairing frames, plus
/// the two semantic handshake failures the peer is told about by status code.
#[derive(Debug, Error)]
pub enum PairingError {
    /// The stream failed or closed before a whole frame arrived.
    #[error("pairing I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer sent a frame whose status is not OK.
    #[error("peer reported status {status}")]
    Protocol { status: StatusCode },

    /// The outer envelope's payload length disagrees with the bytes present.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },

    #[error("pairing frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge { size: usize, max: usize },

    #[error("unsupported pairing protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("unknown pairing message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    #[error("malformed pairing payload: {0}")]
    MalformedPayload(String),

    /// A field is longer than its length prefix can express.
    #[error("{field} is {len} long, limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A handshake step expected one message and got another.
    #[error("expected {expected} message, got {actual}")]
    UnexpectedMessage {
        expected: PairingType,
        actual: PairingType,
    },

    /// No configuration acceptable to both peers exists.
    #[error("no compatible pairing configuration")]
    NoConfiguration,

    /// The secret did not verify.
    #[error("pairing secret rejected")]
    BadSecret,
}

impl From<&PairingError> for StatusCode {
    fn from(error: &PairingError) -> Self {
        match error {
            PairingError::NoConfiguration => StatusCode::BadConfiguration,
            PairingError::BadSecret => StatusCode::BadSecret,
            _ => StatusCode::Error,
        }
    }
}
