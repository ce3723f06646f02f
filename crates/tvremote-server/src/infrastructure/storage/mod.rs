//! Storage infrastructure: the server's configuration file.

pub mod config;
