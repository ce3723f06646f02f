//! The receiver the `tvremote-server` binary runs with.
//!
//! It has no display to drive, so every event is logged.  A fling succeeds
//! when the URI parses.

use tracing::info;
use tvremote_core::{ConnectInfo, KeyAction, KeyCode};

use crate::application::request_receiver::RequestReceiver;

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReceiver;

impl RequestReceiver for LoggingReceiver {
    fn on_key_event(&self, code: KeyCode, action: KeyAction) {
        info!(key = %code, ?action, "key event");
    }

    fn on_mouse_event(&self, dx: i32, dy: i32) {
        info!(dx, dy, "pointer moved");
    }

    fn on_mouse_wheel(&self, dx: i32, dy: i32) {
        info!(dx, dy, "wheel scrolled");
    }

    fn on_data(&self, data_type: &str, value: &str) {
        info!(data_type, value, "data");
    }

    fn on_connect(&self, info: &ConnectInfo) {
        info!(device = %info, "device announced");
    }

    fn on_fling(&self, uri: &str) -> bool {
        match url::Url::parse(uri) {
            Ok(url) => {
                info!(%url, "fling");
                true
            }
            Err(e) => {
                info!(uri, error = %e, "rejecting fling");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
