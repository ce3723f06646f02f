//! Infrastructure layer for the server.
//!
//! Contains the TCP accept loop and configuration file loading.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `tvremote_core`, but MUST NOT be imported by the `application` layer.

pub mod listener;
pub mod storage;
