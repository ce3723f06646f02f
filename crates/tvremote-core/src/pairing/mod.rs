//! Pairing handshake framing: a status-carrying outer envelope around one of
//! seven typed messages, sent as 4-byte length-prefixed frames.
//!
//! Secret derivation and the choice of encoding are left to the caller; this
//! module only moves the messages.

pub mod codec;
pub mod error;
pub mod framer;
pub mod messages;

pub use codec::{decode_inner, encode_inner, PairingOuterEnvelope, OUTER_HEADER_SIZE};
pub use error::PairingError;
pub use framer::PairingFramer;
pub use messages::{
    ConfigurationAckMessage, ConfigurationMessage, EncodingOption, EncodingType, OptionsMessage,
    PairingMessage, PairingRequestAckMessage, PairingRequestMessage, PairingType, ProtocolRole,
    SecretAckMessage, SecretMessage, StatusCode, NO_MESSAGE_TAG, PAIRING_PROTOCOL_VERSION,
};
