//! Application layer for the server.
//!
//! Holds the request-dispatch logic and the reply rules.  Nothing here knows
//! about sockets; the adapters work over any `AsyncRead`/`AsyncWrite` pair.

pub mod factory;
pub mod logging_receiver;
pub mod request_receiver;
pub mod server_adapter;
