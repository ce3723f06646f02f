//! Bit-exact binary codec for pairing frames.
//!
//! Outer envelope (the body of one length-prefixed frame):
//! ```text
//! [version:1][status:2][type_tag:1][payload_len:4][payload:N]
//! ```
//! Total header size: 8 bytes.  All multi-byte integers are big-endian.
//!
//! Inner payloads:
//! ```text
//! PairingRequest      [service_name:str][client_name:opt str]
//! PairingRequestAck   [server_name:opt str]
//! Options             [preferred_role:1][input:set][output:set]
//! Configuration       [encoding:option][client_role:1]
//! ConfigurationAck    (empty)
//! Secret / SecretAck  [secret:bytes]
//!
//! str     = [len:2][utf8]
//! opt str = [present:1] then str if present == 1
//! bytes   = [len:4][raw]
//! option  = [encoding_type:1][symbol_length:4]
//! set     = [count:1] option*count
//! ```

use std::collections::BTreeSet;

use crate::pairing::error::PairingError;
use crate::pairing::messages::{
    ConfigurationAckMessage, ConfigurationMessage, EncodingOption, EncodingType, OptionsMessage,
    PairingMessage, PairingRequestAckMessage, PairingRequestMessage, PairingType, ProtocolRole,
    SecretAckMessage, SecretMessage, StatusCode, NO_MESSAGE_TAG, PAIRING_PROTOCOL_VERSION,
};

/// Size of the outer envelope header.
pub const OUTER_HEADER_SIZE: usize = 8;

/// One decoded outer envelope whose inner payload has not been interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingOuterEnvelope {
    pub protocol_version: u8,
    pub status: StatusCode,
    pub type_tag: u8,
    pub payload: Vec<u8>,
}

impl PairingOuterEnvelope {
    /// Wraps `message` in an OK envelope.
    ///
    /// # Errors
    ///
    /// [`PairingError::FieldTooLong`] if a field does not fit its prefix.
    pub fn for_message(message: &PairingMessage) -> Result<Self, PairingError> {
        Ok(Self {
            protocol_version: PAIRING_PROTOCOL_VERSION,
            status: StatusCode::Ok,
            type_tag: message.message_type().tag(),
            payload: encode_inner(message)?,
        })
    }

    /// An envelope that carries only a status.
    pub fn error(status: StatusCode) -> Self {
        Self {
            protocol_version: PAIRING_PROTOCOL_VERSION,
            status,
            type_tag: NO_MESSAGE_TAG,
            payload: Vec::new(),
        }
    }

    /// The inner message kind named by the tag, if any.
    pub fn message_type(&self) -> Option<PairingType> {
        PairingType::from_tag(self.type_tag)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(OUTER_HEADER_SIZE + self.payload.len());
        buf.push(self.protocol_version);
        buf.extend_from_slice(&(self.status as u16).to_be_bytes());
        buf.push(self.type_tag);
        buf.extend_from_slice(&(self.payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Parses the header and checks that the declared payload length matches
    /// the bytes present.  The version and tag are not validated here; see
    /// [`into_message`](Self::into_message).
    pub fn decode(bytes: &[u8]) -> Result<Self, PairingError> {
        if bytes.len() < OUTER_HEADER_SIZE {
            return Err(PairingError::PayloadLengthMismatch {
                declared: OUTER_HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let declared = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let available = bytes.len() - OUTER_HEADER_SIZE;
        if declared != available {
            return Err(PairingError::PayloadLengthMismatch {
                declared,
                available,
            });
        }

        let raw_status = u16::from_be_bytes([bytes[1], bytes[2]]);
        let status = StatusCode::from_u16(raw_status).ok_or_else(|| {
            PairingError::MalformedPayload(format!("unknown status code {raw_status}"))
        })?;

        Ok(Self {
            protocol_version: bytes[0],
            status,
            type_tag: bytes[3],
            payload: bytes[OUTER_HEADER_SIZE..].to_vec(),
        })
    }

    /// Checks status, then version, then tag, and decodes the inner message.
    ///
    /// # Errors
    ///
    /// - [`PairingError::Protocol`] when the status is not OK.
    /// - [`PairingError::UnsupportedVersion`] for any version other than 1.
    /// - [`PairingError::UnknownMessageType`] for an unmapped tag.
    /// - [`PairingError::MalformedPayload`] if the payload does not match the
    ///   layout of the tagged type.
    pub fn into_message(self) -> Result<PairingMessage, PairingError> {
        if self.status != StatusCode::Ok {
            return Err(PairingError::Protocol {
                status: self.status,
            });
        }
        if self.protocol_version != PAIRING_PROTOCOL_VERSION {
            return Err(PairingError::UnsupportedVersion(self.protocol_version));
        }
        let message_type = self
            .message_type()
            .ok_or(PairingError::UnknownMessageType(self.type_tag))?;
        decode_inner(message_type, &self.payload)
    }
}

// ── Inner encoding ────────────────────────────────────────────────────────────

/// Encodes the inner payload of `message` (no outer header).
///
/// Strings longer than `u16::MAX` bytes, byte strings longer than
/// `u32::MAX` bytes and encoding sets of more than 255 options are rejected
/// with [`PairingError::FieldTooLong`].
pub fn encode_inner(message: &PairingMessage) -> Result<Vec<u8>, PairingError> {
    let mut buf = Vec::new();
    match message {
        PairingMessage::PairingRequest(m) => {
            write_string(&mut buf, "service_name", &m.service_name)?;
            write_optional_string(&mut buf, "client_name", m.client_name.as_deref())?;
        }
        PairingMessage::PairingRequestAck(m) => {
            write_optional_string(&mut buf, "server_name", m.server_name.as_deref())?;
        }
        PairingMessage::Options(m) => {
            buf.push(m.preferred_role as u8);
            write_encoding_set(&mut buf, "input_encodings", &m.input_encodings)?;
            write_encoding_set(&mut buf, "output_encodings", &m.output_encodings)?;
        }
        PairingMessage::Configuration(m) => {
            write_encoding_option(&mut buf, &m.encoding);
            buf.push(m.client_role as u8);
        }
        PairingMessage::ConfigurationAck(_) => {}
        PairingMessage::Secret(m) => write_bytes(&mut buf, &m.secret)?,
        PairingMessage::SecretAck(m) => write_bytes(&mut buf, &m.secret)?,
    }
    Ok(buf)
}

/// Decodes an inner payload as `message_type`.  Every byte must be consumed.
pub fn decode_inner(message_type: PairingType, payload: &[u8]) -> Result<PairingMessage, PairingError> {
    let mut cursor = PayloadCursor::new(payload, message_type);
    let message = match message_type {
        PairingType::PairingRequest => PairingMessage::PairingRequest(PairingRequestMessage {
            service_name: cursor.string()?,
            client_name: cursor.optional_string()?,
        }),
        PairingType::PairingRequestAck => {
            PairingMessage::PairingRequestAck(PairingRequestAckMessage {
                server_name: cursor.optional_string()?,
            })
        }
        PairingType::Options => PairingMessage::Options(OptionsMessage {
            preferred_role: ProtocolRole::from(cursor.u8()?),
            input_encodings: cursor.encoding_set()?,
            output_encodings: cursor.encoding_set()?,
        }),
        PairingType::Configuration => PairingMessage::Configuration(ConfigurationMessage {
            encoding: cursor.encoding_option()?,
            client_role: ProtocolRole::from(cursor.u8()?),
        }),
        PairingType::ConfigurationAck => PairingMessage::ConfigurationAck(ConfigurationAckMessage),
        PairingType::Secret => PairingMessage::Secret(SecretMessage {
            secret: cursor.bytes()?,
        }),
        PairingType::SecretAck => PairingMessage::SecretAck(SecretAckMessage {
            secret: cursor.bytes()?,
        }),
    };
    cursor.finish()?;
    Ok(message)
}

// ── Write helpers ─────────────────────────────────────────────────────────────

fn checked_len(field: &'static str, len: usize, max: usize) -> Result<usize, PairingError> {
    if len > max {
        return Err(PairingError::FieldTooLong { field, len, max });
    }
    Ok(len)
}

/// Writes a 2-byte length prefix followed by the UTF-8 bytes.
fn write_string(buf: &mut Vec<u8>, field: &'static str, s: &str) -> Result<(), PairingError> {
    let len = checked_len(field, s.len(), u16::MAX as usize)?;
    buf.extend_from_slice(&(len as u16).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn write_optional_string(
    buf: &mut Vec<u8>,
    field: &'static str,
    s: Option<&str>,
) -> Result<(), PairingError> {
    match s {
        Some(s) => {
            buf.push(1);
            write_string(buf, field, s)
        }
        None => {
            buf.push(0);
            Ok(())
        }
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), PairingError> {
    let len = checked_len("secret", bytes.len(), u32::MAX as usize)?;
    buf.extend_from_slice(&(len as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn write_encoding_option(buf: &mut Vec<u8>, option: &EncodingOption) {
    buf.push(option.encoding_type as u8);
    buf.extend_from_slice(&option.symbol_length.to_be_bytes());
}

/// The count byte bounds a set at 255 options.
fn write_encoding_set(
    buf: &mut Vec<u8>,
    field: &'static str,
    set: &BTreeSet<EncodingOption>,
) -> Result<(), PairingError> {
    let count = checked_len(field, set.len(), u8::MAX as usize)?;
    buf.push(count as u8);
    for option in set {
        write_encoding_option(buf, option);
    }
    Ok(())
}

// ── Read helpers ──────────────────────────────────────────────────────────────

struct PayloadCursor<'a> {
    buf: &'a [u8],
    offset: usize,
    context: PairingType,
}

impl<'a> PayloadCursor<'a> {
    fn new(buf: &'a [u8], context: PairingType) -> Self {
        Self {
            buf,
            offset: 0,
            context,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], PairingError> {
        let end = self.offset + n;
        if self.buf.len() < end {
            return Err(PairingError::MalformedPayload(format!(
                "{}: need {n} bytes at offset {}, got {}",
                self.context,
                self.offset,
                self.buf.len() - self.offset
            )));
        }
        let slice = &self.buf[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, PairingError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, PairingError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, PairingError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn string(&mut self) -> Result<String, PairingError> {
        let len = self.u16()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| PairingError::MalformedPayload(format!("{}: invalid UTF-8: {e}", self.context)))
    }

    fn optional_string(&mut self) -> Result<Option<String>, PairingError> {
        match self.u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.string()?)),
            other => Err(PairingError::MalformedPayload(format!(
                "{}: invalid presence byte {other}",
                self.context
            ))),
        }
    }

    fn bytes(&mut self) -> Result<Vec<u8>, PairingError> {
        let len = self.u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn encoding_option(&mut self) -> Result<EncodingOption, PairingError> {
        let encoding_type = EncodingType::from(self.u8()?);
        let symbol_length = self.u32()?;
        Ok(EncodingOption::new(encoding_type, symbol_length))
    }

    fn encoding_set(&mut self) -> Result<BTreeSet<EncodingOption>, PairingError> {
        let count = self.u8()?;
        (0..count).map(|_| self.encoding_option()).collect()
    }

    fn finish(self) -> Result<(), PairingError> {
        if self.offset != self.buf.len() {
            return Err(PairingError::MalformedPayload(format!(
                "{}: {} trailing bytes",
                self.context,
                self.buf.len() - self.offset
            )));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_options() -> OptionsMessage {
        OptionsMessage {
            preferred_role: ProtocolRole::InputDevice,
            input_encodings: [EncodingOption::new(EncodingType::Hexadecimal, 4)]
                .into_iter()
                .collect(),
            output_encodings: [
                EncodingOption::new(EncodingType::Numeric, 6),
                EncodingOption::new(EncodingType::QrCode, 32),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn test_outer_header_layout_is_bit_exact() {
        // Arrange
        let message = PairingMessage::Secret(SecretMessage {
            secret: vec![0xAB, 0xCD],
        });

        // Act
        let bytes = PairingOuterEnvelope::for_message(&message).unwrap().encode();

        // Assert
        assert_eq!(
            bytes,
            vec![
                1, // version
                0x00, 0xC8, // status 200
                40,   // SECRET tag
                0, 0, 0, 6, // payload length
                0, 0, 0, 2, 0xAB, 0xCD, // bytes field
            ]
        );
    }

    #[test]
    fn test_error_envelope_has_no_payload() {
        let bytes = PairingOuterEnvelope::error(StatusCode::BadSecret).encode();
        assert_eq!(bytes, vec![1, 0x01, 0x92, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_rejects_payload_length_mismatch() {
        // Header claims 5 payload bytes, only 2 present.
        let bytes = [1, 0x00, 0xC8, 40, 0, 0, 0, 5, 0xAA, 0xBB];

        let result = PairingOuterEnvelope::decode(&bytes);

        assert!(matches!(
            result,
            Err(PairingError::PayloadLengthMismatch {
                declared: 5,
                available: 2
            })
        ));
    }

    #[test]
    fn test_decode_rejects_short_header() {
        let result = PairingOuterEnvelope::decode(&[1, 0]);
        assert!(matches!(result, Err(PairingError::PayloadLengthMismatch { .. })));
    }

    #[test]
    fn test_non_ok_status_wins_over_bad_version_and_tag() {
        // Arrange – every later check would also fail
        let bytes = [9, 0x01, 0x91, 0xEE, 0, 0, 0, 0];

        // Act
        let result = PairingOuterEnvelope::decode(&bytes).and_then(|e| e.into_message());

        // Assert
        assert!(matches!(
            result,
            Err(PairingError::Protocol {
                status: StatusCode::BadConfiguration
            })
        ));
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let bytes = [2, 0x00, 0xC8, 31, 0, 0, 0, 0];
        let result = PairingOuterEnvelope::decode(&bytes).and_then(|e| e.into_message());
        assert!(matches!(result, Err(PairingError::UnsupportedVersion(2))));
    }

    #[test]
    fn test_unknown_status_value_is_malformed() {
        let bytes = [1, 0x01, 0xF4, 31, 0, 0, 0, 0];
        let result = PairingOuterEnvelope::decode(&bytes);
        assert!(matches!(result, Err(PairingError::MalformedPayload(_))));
    }

    #[test]
    fn test_options_round_trip() {
        let message = PairingMessage::Options(sample_options());

        let payload = encode_inner(&message).unwrap();
        let decoded = decode_inner(PairingType::Options, &payload).unwrap();

        assert_eq!(decoded, message);
    }

    #[test]
    fn test_pairing_request_without_client_name_round_trips() {
        let message = PairingMessage::PairingRequest(PairingRequestMessage {
            service_name: "tvremote".to_string(),
            client_name: None,
        });

        let payload = encode_inner(&message).unwrap();

        assert_eq!(payload, vec![0, 8, b't', b'v', b'r', b'e', b'm', b'o', b't', b'e', 0]);
        assert_eq!(decode_inner(PairingType::PairingRequest, &payload).unwrap(), message);
    }

    #[test]
    fn test_unknown_encoding_byte_decodes_as_unknown() {
        // Configuration with encoding type 0x7F
        let payload = [0x7F, 0, 0, 0, 4, 2];

        let decoded = decode_inner(PairingType::Configuration, &payload).unwrap();

        assert_eq!(
            decoded,
            PairingMessage::Configuration(ConfigurationMessage {
                encoding: EncodingOption::new(EncodingType::Unknown, 4),
                client_role: ProtocolRole::DisplayDevice,
            })
        );
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let result = decode_inner(PairingType::ConfigurationAck, &[0]);
        assert!(matches!(result, Err(PairingError::MalformedPayload(_))));
    }

    #[test]
    fn test_truncated_inner_payload_is_malformed() {
        // Secret declares 10 bytes, carries 1.
        let result = decode_inner(PairingType::Secret, &[0, 0, 0, 10, 1]);
        assert!(matches!(result, Err(PairingError::MalformedPayload(_))));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let result = decode_inner(PairingType::PairingRequestAck, &[1, 0, 1, 0xFF]);
        assert!(matches!(result, Err(PairingError::MalformedPayload(_))));
    }

    #[test]
    fn test_string_over_length_prefix_is_rejected_not_truncated() {
        // Arrange – 80 000 bytes of two-byte characters
        let message = PairingMessage::PairingRequest(PairingRequestMessage {
            service_name: "é".repeat(40_000),
            client_name: None,
        });

        // Act
        let result = encode_inner(&message);

        // Assert
        assert!(matches!(
            result,
            Err(PairingError::FieldTooLong {
                field: "service_name",
                len: 80_000,
                max: 65_535
            })
        ));
        assert!(PairingOuterEnvelope::for_message(&message).is_err());
    }

    #[test]
    fn test_string_at_length_limit_round_trips() {
        let message = PairingMessage::PairingRequestAck(PairingRequestAckMessage {
            server_name: Some("x".repeat(u16::MAX as usize)),
        });

        let payload = encode_inner(&message).unwrap();

        assert_eq!(decode_inner(PairingType::PairingRequestAck, &payload).unwrap(), message);
    }

    #[test]
    fn test_encoding_set_over_count_byte_is_rejected() {
        // Arrange – 256 distinct options
        let mut options = sample_options();
        options.output_encodings = (0..256)
            .map(|n| EncodingOption::new(EncodingType::Numeric, n))
            .collect();

        // Act
        let result = encode_inner(&PairingMessage::Options(options));

        // Assert
        assert!(matches!(
            result,
            Err(PairingError::FieldTooLong {
                field: "output_encodings",
                len: 256,
                max: 255
            })
        ));
    }
}
