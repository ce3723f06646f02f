//! tvremote-device library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tvremote-device do? (for beginners)
//!
//! The *device* is the remote control: a phone app, a keyboard dongle, a
//! command-line tool.  It connects to the *server* (the TV or set-top box)
//! and sends it input events.
//!
//! 1. Connects to the server and announces itself with `Connect`.
//! 2. Sends key, pointer, wheel, and data events as fire-and-forget frames.
//! 3. Sends pings and flings with sequence numbers, then hears back through
//!    a [`MessageReceiver`](application::message_receiver::MessageReceiver):
//!    an ack for a ping, a success/failure result for a fling.

/// Application layer: the device facade, correlator, and factories.
pub mod application;

/// Infrastructure layer: TCP connection setup.
pub mod infrastructure;

pub use application::device_adapter::{DeviceAdapter, DeviceMessageAdapter};
pub use application::factory::{device_adapter_without_receiving, start_device_adapter};
pub use application::message_receiver::MessageReceiver;
pub use infrastructure::connection::{connect, ConnectionError};
