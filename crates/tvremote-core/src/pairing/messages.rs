//! Pairing handshake message types.
//!
//! The handshake runs before the event protocol on a separate stream:
//!
//! ```text
//! Client                                   Server
//!   │ ── PairingRequest ──────────────────────▶ │
//!   │ ◀────────────────────── PairingRequestAck │
//!   │ ── Options ─────────────────────────────▶ │
//!   │ ◀──────────────────────────────── Options │
//!   │ ── Configuration ───────────────────────▶ │
//!   │ ◀────────────────────── ConfigurationAck │
//!   │ ── Secret ──────────────────────────────▶ │
//!   │ ◀──────────────────────────── SecretAck │
//! ```
//!
//! Each message is wrapped in an outer envelope carrying a [`StatusCode`] and
//! the one-byte tag of its [`PairingType`].

use std::collections::BTreeSet;
use std::fmt;

/// Value written into every outer envelope's version byte.
pub const PAIRING_PROTOCOL_VERSION: u8 = 1;

// ── Type tags ─────────────────────────────────────────────────────────────────

/// The seven inner message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairingType {
    PairingRequest,
    PairingRequestAck,
    Options,
    Configuration,
    ConfigurationAck,
    Secret,
    SecretAck,
}

/// Single table driving both tag directions.
const TYPE_TAGS: [(PairingType, u8); 7] = [
    (PairingType::PairingRequest, 10),
    (PairingType::PairingRequestAck, 11),
    (PairingType::Options, 20),
    (PairingType::Configuration, 30),
    (PairingType::ConfigurationAck, 31),
    (PairingType::Secret, 40),
    (PairingType::SecretAck, 41),
];

/// Tag byte meaning "no inner message" (error frames).
pub const NO_MESSAGE_TAG: u8 = 0;

impl PairingType {
    pub const ALL: [PairingType; 7] = [
        PairingType::PairingRequest,
        PairingType::PairingRequestAck,
        PairingType::Options,
        PairingType::Configuration,
        PairingType::ConfigurationAck,
        PairingType::Secret,
        PairingType::SecretAck,
    ];

    pub fn tag(self) -> u8 {
        TYPE_TAGS
            .iter()
            .find(|(t, _)| *t == self)
            .map(|(_, tag)| *tag)
            .unwrap_or(NO_MESSAGE_TAG)
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        TYPE_TAGS
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(ty, _)| *ty)
    }
}

impl fmt::Display for PairingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairingType::PairingRequest => "PAIRING_REQUEST",
            PairingType::PairingRequestAck => "PAIRING_REQUEST_ACK",
            PairingType::Options => "OPTIONS",
            PairingType::Configuration => "CONFIGURATION",
            PairingType::ConfigurationAck => "CONFIGURATION_ACK",
            PairingType::Secret => "SECRET",
            PairingType::SecretAck => "SECRET_ACK",
        };
        f.write_str(name)
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Outcome carried by every outer envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    Error = 400,
    BadConfiguration = 401,
    BadSecret = 402,
}

impl StatusCode {
    /// Maps a wire value back to a status, or `None` if it is not one of ours.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            200 => Some(StatusCode::Ok),
            400 => Some(StatusCode::Error),
            401 => Some(StatusCode::BadConfiguration),
            402 => Some(StatusCode::BadSecret),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::Error => "ERROR",
            StatusCode::BadConfiguration => "BAD_CONFIGURATION",
            StatusCode::BadSecret => "BAD_SECRET",
        };
        write!(f, "{name} ({})", *self as u16)
    }
}

// ── Options vocabulary ────────────────────────────────────────────────────────

/// Which side of the secret exchange a peer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ProtocolRole {
    Unknown = 0,
    /// The peer that types the secret in.
    InputDevice = 1,
    /// The peer that displays the secret.
    DisplayDevice = 2,
}

impl From<u8> for ProtocolRole {
    fn from(value: u8) -> Self {
        match value {
            1 => ProtocolRole::InputDevice,
            2 => ProtocolRole::DisplayDevice,
            _ => ProtocolRole::Unknown,
        }
    }
}

/// How the secret is rendered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum EncodingType {
    Unknown = 0,
    Alphanumeric = 1,
    Numeric = 2,
    Hexadecimal = 3,
    QrCode = 4,
}

impl From<u8> for EncodingType {
    fn from(value: u8) -> Self {
        match value {
            1 => EncodingType::Alphanumeric,
            2 => EncodingType::Numeric,
            3 => EncodingType::Hexadecimal,
            4 => EncodingType::QrCode,
            _ => EncodingType::Unknown,
        }
    }
}

/// One supported secret encoding and its length in symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodingOption {
    pub encoding_type: EncodingType,
    pub symbol_length: u32,
}

impl EncodingOption {
    pub fn new(encoding_type: EncodingType, symbol_length: u32) -> Self {
        Self {
            encoding_type,
            symbol_length,
        }
    }
}

// ── Inner messages ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRequestMessage {
    pub service_name: String,
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PairingRequestAckMessage {
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsMessage {
    pub preferred_role: ProtocolRole,
    pub input_encodings: BTreeSet<EncodingOption>,
    pub output_encodings: BTreeSet<EncodingOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationMessage {
    pub encoding: EncodingOption,
    pub client_role: ProtocolRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigurationAckMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMessage {
    pub secret: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretAckMessage {
    pub secret: Vec<u8>,
}

/// Any one of the seven handshake messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingMessage {
    PairingRequest(PairingRequestMessage),
    PairingRequestAck(PairingRequestAckMessage),
    Options(OptionsMessage),
    Configuration(ConfigurationMessage),
    ConfigurationAck(ConfigurationAckMessage),
    Secret(SecretMessage),
    SecretAck(SecretAckMessage),
}

impl PairingMessage {
    pub fn message_type(&self) -> PairingType {
        match self {
            PairingMessage::PairingRequest(_) => PairingType::PairingRequest,
            PairingMessage::PairingRequestAck(_) => PairingType::PairingRequestAck,
            PairingMessage::Options(_) => PairingType::Options,
            PairingMessage::Configuration(_) => PairingType::Configuration,
            PairingMessage::ConfigurationAck(_) => PairingType::ConfigurationAck,
            PairingMessage::Secret(_) => PairingType::Secret,
            PairingMessage::SecretAck(_) => PairingType::SecretAck,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_are_bijective() {
        for ty in PairingType::ALL {
            assert_eq!(PairingType::from_tag(ty.tag()), Some(ty));
        }
        let mut tags: Vec<u8> = PairingType::ALL.iter().map(|t| t.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 7, "tags must not overlap");
    }

    #[test]
    fn test_unmapped_tags_have_no_type() {
        assert_eq!(PairingType::from_tag(NO_MESSAGE_TAG), None);
        assert_eq!(PairingType::from_tag(12), None);
        assert_eq!(PairingType::from_tag(0xFF), None);
    }

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok as u16, 200);
        assert_eq!(StatusCode::from_u16(402), Some(StatusCode::BadSecret));
        assert_eq!(StatusCode::from_u16(500), None);
    }

    #[test]
    fn test_unknown_bytes_map_to_unknown_variants() {
        assert_eq!(EncodingType::from(9), EncodingType::Unknown);
        assert_eq!(ProtocolRole::from(7), ProtocolRole::Unknown);
        assert_eq!(EncodingType::from(4), EncodingType::QrCode);
    }
}
