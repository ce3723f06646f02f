//! Infrastructure layer for the device application.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tvremote_core`, but MUST NOT be imported by the `application` layer.
//!
//! - **`connection`** – Opens the TCP stream to the server and wraps it in a
//!   receiving device adapter.

pub mod connection;
