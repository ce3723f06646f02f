//! Callbacks the device application implements to hear back from the server.

use tvremote_core::{FlingResult, SequenceNumber};

/// Receives server responses, one callback per inbound envelope at most.
///
/// Invoked on the transport's receive task: implementations must return
/// promptly or further frames are held up.
#[cfg_attr(test, mockall::automock)]
pub trait MessageReceiver: Send + Sync {
    /// A request carrying `sequence_number` was acknowledged without data.
    fn on_ack(&self, sequence_number: SequenceNumber);

    /// The server pushed or returned typed data.
    fn on_data(&self, data_type: &str, value: &str);

    /// Outcome of a fling.  `sequence_number` is whatever the server echoed.
    fn on_fling_result(&self, result: FlingResult, sequence_number: Option<SequenceNumber>);
}
