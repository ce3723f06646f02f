//! tvremote-server library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does tvremote-server do? (for beginners)
//!
//! The *server* is the TV or set-top box.  Devices connect to it and send
//! input events; it hands each one to a
//! [`RequestReceiver`](application::request_receiver::RequestReceiver).
//!
//! 1. Accepts TCP connections from devices.
//! 2. Decodes each framed envelope and dispatches the requests inside it.
//! 3. Acks pings and reports fling outcomes; input events get no reply.
//! 4. Can push data to a device at any time.

/// Application layer: request dispatch, reply rules, and factories.
pub mod application;

/// Infrastructure layer: TCP accept loop and config file.
pub mod infrastructure;

pub use application::factory::{server_adapter_without_receiving, start_server_adapter};
pub use application::logging_receiver::LoggingReceiver;
pub use application::request_receiver::RequestReceiver;
pub use application::server_adapter::{ServerAdapter, ServerMessageAdapter};
pub use infrastructure::listener::{bind, serve, ListenerError};
pub use infrastructure::storage::config::{load_config, NetworkConfig, ServerConfig};
