//! Thread-safe sequence counter for correlating requests with replies.
//!
//! # How correlation works (for beginners)
//!
//! A device stamps requests that need an answer (pings, flings) with a
//! *sequence number*.  The server copies that number onto its reply, so when
//! the reply arrives the device can tell which request it belongs to even if
//! several are in flight.
//!
//! The counter is lock-free: `next()` is a single atomic read-modify-write, so
//! concurrent senders never observe the same value.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::protocol::messages::SequenceNumber;

/// A thread-safe, monotonically increasing source of [`SequenceNumber`]s.
///
/// The first call to [`next`](Self::next) returns 1.  The counter wraps
/// silently at `u32::MAX`.
///
/// # Examples
///
/// ```rust
/// use tvremote_core::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 1);
/// assert_eq!(counter.next(), 2);
/// ```
#[derive(Debug)]
pub struct SequenceCounter {
    /// The most recently issued value (0 before the first call).
    last: AtomicU32,
}

impl SequenceCounter {
    /// Creates a counter whose first issued value is 1.
    pub fn new() -> Self {
        Self {
            last: AtomicU32::new(0),
        }
    }

    /// Increments the counter and returns the new value.
    pub fn next(&self) -> SequenceNumber {
        // Relaxed: the value orders nothing but itself.
        self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Returns the most recently issued value without incrementing.
    pub fn current(&self) -> SequenceNumber {
        self.last.load(Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
