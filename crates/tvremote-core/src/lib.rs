//! # tvremote-core
//!
//! Shared library for tvremote containing the event envelope protocol, the
//! framed duplex transport that carries it, and the pairing handshake codec.
//!
//! This crate is used by both the device and the server applications.
//! It never opens sockets itself: every transport is built from an
//! already-established byte stream handed in by the caller.
//!
//! # Architecture overview (for beginners)
//!
//! A *device* (a phone, a remote control app) drives a *server* (the TV or
//! set-top box) by sending it small events: key presses, pointer motion,
//! generic data, and "fling" requests that ask the server to open a URI.
//!
//! - **`protocol`** – The event data model ([`Envelope`], [`Request`],
//!   [`Response`]), the pluggable body codec, and the 4-byte length-prefixed
//!   frame helpers.
//!
//! - **`transport`** – [`FrameTransport`] wraps the byte stream: whole-frame
//!   sends under an output lock, whole-frame receives under an input lock, and
//!   a background [`ReceiveLoop`] that hands every decoded envelope to a
//!   listener.
//!
//! - **`pairing`** – A separate, bit-exact codec for the pairing handshake:
//!   a status-carrying outer envelope wrapping one of seven typed messages.
//!
//! - **`config`** – Tunables for the transport, loadable from TOML.

pub mod config;
pub mod pairing;
pub mod protocol;
pub mod transport;

// Re-export the most-used types at the crate root so callers can write
// `tvremote_core::Envelope` instead of `tvremote_core::protocol::messages::Envelope`.
pub use config::{ConfigError, TransportConfig};
pub use pairing::{PairingError, PairingFramer, PairingMessage, PairingType, StatusCode};
pub use protocol::codec::{BincodeCodec, CodecError, WireCodec};
pub use protocol::connect_info::ConnectInfo;
pub use protocol::messages::{
    Body, DataMessage, Envelope, FlingResult, KeyAction, KeyCode, Request, RequestMessage,
    Response, ResponseMessage, SequenceNumber,
};
pub use protocol::sequence::SequenceCounter;
pub use transport::{
    ErrorListener, FrameTransport, LoopState, MessageListener, ReceiveLoop, TransportError,
};
