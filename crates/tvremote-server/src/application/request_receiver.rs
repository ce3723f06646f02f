//! Callbacks the host application implements to act on device requests.

use tvremote_core::{ConnectInfo, KeyAction, KeyCode};

/// Receives device requests.
///
/// Invoked on the connection's receive task: implementations must return
/// promptly or further frames are held up.
#[cfg_attr(test, mockall::automock)]
pub trait RequestReceiver: Send + Sync {
    fn on_key_event(&self, code: KeyCode, action: KeyAction);

    /// Relative pointer motion.
    fn on_mouse_event(&self, dx: i32, dy: i32);

    fn on_mouse_wheel(&self, dx: i32, dy: i32);

    fn on_data(&self, data_type: &str, value: &str);

    /// The device announced itself.
    fn on_connect(&self, info: &ConnectInfo);

    /// Opens `uri`; the return value becomes the fling result sent back.
    fn on_fling(&self, uri: &str) -> bool;
}
